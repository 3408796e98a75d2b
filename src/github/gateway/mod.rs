//! Gateways for loading pull request data through Octocrab.
//!
//! Collectors depend on the traits defined here so that paging and
//! skip-if-exists behaviour can be tested with mocks, while the Octocrab
//! implementations talk to GitHub's GraphQL search and REST endpoints.

mod client;
mod error_mapping;
mod http_utils;
mod pull_request;
mod search;

pub use client::build_octocrab_client;
pub use pull_request::OctocrabPullRequestGateway;
pub use search::OctocrabSearchGateway;

use async_trait::async_trait;

use crate::github::error::IntakeError;
use crate::github::locator::PullRequestId;
use crate::github::models::{PullRequestDetail, PullRequestSearchNode};
use crate::github::pagination::{SearchPage, SearchQuery};

/// Gateway that pages through pull request search results.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SearchGateway: Send + Sync {
    /// Fetch one page of pull requests matching the query predicate.
    async fn search_pull_requests(
        &self,
        query: &SearchQuery,
    ) -> Result<SearchPage<PullRequestSearchNode>, IntakeError>;
}

/// Gateway that loads per-pull-request artifacts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PullRequestGateway: Send + Sync {
    /// Fetch the pull request with its commits, changed files and reviews.
    async fn pull_request_detail(
        &self,
        id: &PullRequestId,
    ) -> Result<PullRequestDetail, IntakeError>;

    /// Fetch the unified diff text for the pull request.
    async fn pull_request_diff(&self, id: &PullRequestId) -> Result<String, IntakeError>;
}
