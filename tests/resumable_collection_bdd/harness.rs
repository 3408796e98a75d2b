//! Mock GitHub responses and gateway construction for the resumable
//! collection BDD tests.

use prism::IntakeError;
use prism::github::{OctocrabPullRequestGateway, OctocrabSearchGateway, PersonalAccessToken};
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use super::support::MockGitHub;

const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";

fn token() -> PersonalAccessToken {
    PersonalAccessToken::new("test-token")
        .unwrap_or_else(|error| panic!("test token rejected: {error}"))
}

/// Builds a search gateway pointed at the mock server.
pub(crate) fn search_gateway(github: &MockGitHub) -> Result<OctocrabSearchGateway, IntakeError> {
    let api_base = github.api_base();
    github.block_on(async { OctocrabSearchGateway::for_token(&token(), &api_base) })
}

/// Builds a pull request gateway pointed at the mock server.
pub(crate) fn pull_request_gateway(
    github: &MockGitHub,
) -> Result<OctocrabPullRequestGateway, IntakeError> {
    let api_base = github.api_base();
    github.block_on(async { OctocrabPullRequestGateway::for_token(&token(), &api_base) })
}

fn search_node(slug: &str, number: u64) -> Value {
    json!({
        "number": number,
        "title": format!("PR {number}"),
        "url": format!("https://github.com/{slug}/pull/{number}"),
        "state": "MERGED",
        "createdAt": "2025-01-01T00:00:00Z",
        "mergedAt": "2025-01-02T00:00:00Z",
        "additions": 3,
        "deletions": 1,
        "changedFiles": 1,
        "baseRefName": "main",
        "headRefName": format!("topic-{number}"),
        "labels": { "nodes": [] }
    })
}

/// Serves `total` search results for `slug` split over `pages` pages, one
/// cursor per page.
pub(crate) fn mount_search_pages(github: &MockGitHub, slug: &str, total: u64, pages: u64) {
    let numbers: Vec<u64> = (1..=total).collect();
    let per_page = usize::try_from(total.div_ceil(pages.max(1)))
        .unwrap_or_else(|error| panic!("page size overflow: {error}"));
    let chunks: Vec<&[u64]> = numbers.chunks(per_page.max(1)).collect();
    let last = chunks.len();

    for (position, chunk) in chunks.into_iter().enumerate() {
        let page = position + 1;
        let after = (page > 1).then(|| format!("cursor-{}", page - 1));
        let has_next = page < last;
        let body = json!({
            "data": {
                "search": {
                    "issueCount": total,
                    "pageInfo": {
                        "hasNextPage": has_next,
                        "endCursor": has_next.then(|| format!("cursor-{page}")),
                    },
                    "nodes": chunk
                        .iter()
                        .map(|number| search_node(slug, *number))
                        .collect::<Vec<_>>(),
                }
            }
        });
        github.mount(
            Mock::given(method("POST"))
                .and(path("/graphql"))
                .and(body_partial_json(json!({ "variables": { "after": after } })))
                .respond_with(ResponseTemplate::new(200).set_body_json(body)),
        );
    }
}

fn mount_json(github: &MockGitHub, route: String, body: Value) {
    github.mount(
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body)),
    );
}

/// Serves detail documents and their sub-resources for pull requests
/// `1..=count` in `slug`.
pub(crate) fn mount_details(github: &MockGitHub, slug: &str, count: u64) {
    for number in 1..=count {
        let base = format!("/repos/{slug}/pulls/{number}");
        mount_json(
            github,
            base.clone(),
            json!({
                "number": number,
                "title": format!("PR {number}"),
                "body": format!("Body of PR {number}"),
                "state": "closed",
                "user": { "login": "alice" },
                "created_at": "2025-01-01T00:00:00Z",
                "merged_at": "2025-01-02T00:00:00Z"
            }),
        );
        mount_json(github, format!("{base}/commits"), json!([]));
        mount_json(github, format!("{base}/files"), json!([]));
        mount_json(github, format!("{base}/reviews"), json!([]));
    }
}

/// Serves diffs for pull requests `1..=count` in `slug`, answering 404 for
/// `failing`.
pub(crate) fn mount_diffs(github: &MockGitHub, slug: &str, count: u64, failing: u64) {
    for number in 1..=count {
        let response = if number == failing {
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" }))
        } else {
            ResponseTemplate::new(200)
                .set_body_string(format!("diff --git a/f{number} b/f{number}\n"))
        };
        github.mount(
            Mock::given(method("GET"))
                .and(path(format!("/repos/{slug}/pulls/{number}")))
                .and(header("accept", DIFF_MEDIA_TYPE))
                .respond_with(response),
        );
    }
}
