//! Builders for artifact fixtures shared by unit and behavioural tests.
//!
//! # Examples
//!
//! ```
//! use prism::github::models::test_support::index_entry;
//!
//! let entry = index_entry("octo", "widgets", 7);
//! assert_eq!(entry.number.get(), 7);
//! assert_eq!(entry.title, "PR 7");
//! ```

use chrono::{TimeZone, Utc};
use serde_json::json;

use super::{PullRequestDetail, PullRequestIndexEntry, PullRequestSearchNode, PullRequestState};
use crate::github::locator::{PullRequestNumber, RepositoryName, RepositoryOwner};

/// Builds a merged index entry titled `PR {number}`.
///
/// # Panics
///
/// Panics when `owner` or `repo` is not a valid path segment, or when
/// `number` is zero.
#[must_use]
pub fn index_entry(owner: &str, repo: &str, number: u64) -> PullRequestIndexEntry {
    let created_at = Utc
        .with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_else(|| panic!("fixture timestamp must be valid"));
    PullRequestIndexEntry {
        owner: RepositoryOwner::new(owner)
            .unwrap_or_else(|error| panic!("fixture owner invalid: {error}")),
        repo: RepositoryName::new(repo)
            .unwrap_or_else(|error| panic!("fixture repo invalid: {error}")),
        number: PullRequestNumber::new(number)
            .unwrap_or_else(|error| panic!("fixture number invalid: {error}")),
        title: format!("PR {number}"),
        url: format!("https://github.com/{owner}/{repo}/pull/{number}"),
        state: PullRequestState::Merged,
        created_at,
        merged_at: Some(created_at),
        additions: 10,
        deletions: 2,
        changed_files: 1,
        base_ref_name: "main".to_owned(),
        head_ref_name: format!("topic-{number}"),
        labels: vec!["enhancement".to_owned()],
    }
}

/// Builds a detail document with a body and no sub-resources.
///
/// # Panics
///
/// Panics when `number` is zero.
#[must_use]
pub fn detail(number: u64) -> PullRequestDetail {
    PullRequestDetail {
        number: PullRequestNumber::new(number)
            .unwrap_or_else(|error| panic!("fixture number invalid: {error}")),
        title: format!("PR {number}"),
        body: Some(format!("Body of PR {number}")),
        state: "closed".to_owned(),
        author: Some("octocat".to_owned()),
        created_at: None,
        merged_at: None,
        commits: Vec::new(),
        files: Vec::new(),
        reviews: Vec::new(),
    }
}

/// Builds a merged search node as returned by the GraphQL search query.
///
/// # Panics
///
/// Panics if the fixture document no longer matches the node shape.
#[must_use]
pub fn search_node(number: u64) -> PullRequestSearchNode {
    serde_json::from_value(json!({
        "number": number,
        "title": format!("PR {number}"),
        "url": format!("https://github.com/octo/x/pull/{number}"),
        "state": "MERGED",
        "createdAt": "2025-01-01T00:00:00Z",
        "mergedAt": null,
        "additions": 1,
        "deletions": 0,
        "changedFiles": 1,
        "baseRefName": "main",
        "headRefName": "topic",
        "labels": { "nodes": [{ "name": "docs" }] }
    }))
    .unwrap_or_else(|error| panic!("fixture node invalid: {error}"))
}
