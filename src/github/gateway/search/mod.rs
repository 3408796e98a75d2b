//! GraphQL search gateway for pull requests.

use async_trait::async_trait;
use octocrab::Octocrab;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::github::error::IntakeError;
use crate::github::locator::PersonalAccessToken;
use crate::github::models::PullRequestSearchNode;
use crate::github::pagination::{PageInfo, SearchPage, SearchQuery};

use super::SearchGateway;
use super::client::build_octocrab_client;
use super::error_mapping::map_octocrab_error;

const SEARCH_PULL_REQUESTS: &str = r"
query($searchQuery: String!, $first: Int!, $after: String) {
  search(query: $searchQuery, type: ISSUE, first: $first, after: $after) {
    issueCount
    pageInfo { hasNextPage endCursor }
    nodes {
      ... on PullRequest {
        number
        title
        url
        state
        createdAt
        mergedAt
        additions
        deletions
        changedFiles
        baseRefName
        headRefName
        labels(first: 20) { nodes { name } }
      }
    }
  }
}
";

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<SearchData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    search: SearchConnection,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchConnection {
    issue_count: u64,
    page_info: PageInfo,
    #[serde(default)]
    nodes: Vec<PullRequestSearchNode>,
}

/// Octocrab-backed search gateway using GitHub's GraphQL API.
pub struct OctocrabSearchGateway {
    client: Octocrab,
}

impl OctocrabSearchGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds a gateway authenticated with `token` against `api_base`.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidUrl` when the base URI cannot be parsed or
    /// `IntakeError::Api` when Octocrab fails to construct a client.
    pub fn for_token(token: &PersonalAccessToken, api_base: &Url) -> Result<Self, IntakeError> {
        Ok(Self::new(build_octocrab_client(token, api_base)?))
    }
}

fn into_search_page(
    response: GraphQlResponse,
) -> Result<SearchPage<PullRequestSearchNode>, IntakeError> {
    if !response.errors.is_empty() {
        let message = response
            .errors
            .iter()
            .map(|error| error.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        let rate_limited = response
            .errors
            .iter()
            .any(|error| error.kind.as_deref() == Some("RATE_LIMITED"));
        return Err(if rate_limited {
            IntakeError::RateLimitExceeded { message }
        } else {
            IntakeError::GraphQl { message }
        });
    }

    let Some(data) = response.data else {
        return Err(IntakeError::GraphQl {
            message: "response carried neither data nor errors".to_owned(),
        });
    };

    Ok(SearchPage {
        nodes: data.search.nodes,
        page_info: data.search.page_info,
        total_count: data.search.issue_count,
    })
}

#[async_trait]
impl SearchGateway for OctocrabSearchGateway {
    async fn search_pull_requests(
        &self,
        query: &SearchQuery,
    ) -> Result<SearchPage<PullRequestSearchNode>, IntakeError> {
        debug!(
            predicate = query.predicate(),
            cursor = query.cursor(),
            "searching pull requests"
        );
        let payload = json!({
            "query": SEARCH_PULL_REQUESTS,
            "variables": {
                "searchQuery": query.predicate(),
                "first": query.page_size(),
                "after": query.cursor(),
            },
        });

        let response = self
            .client
            .graphql::<GraphQlResponse>(&payload)
            .await
            .map_err(|error| map_octocrab_error("pull request search", &error))?;
        into_search_page(response)
    }
}
