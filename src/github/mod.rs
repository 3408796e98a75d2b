//! GitHub access for the collection pipeline.
//!
//! This module wraps Octocrab to page through pull request search results and
//! to fetch per-pull-request detail and diff text. Errors are mapped into
//! [`IntakeError`] variants so that callers can surface precise failures
//! without exposing Octocrab internals.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod pagination;

pub use error::IntakeError;
pub use gateway::{
    OctocrabPullRequestGateway, OctocrabSearchGateway, PullRequestGateway, SearchGateway,
};
pub use locator::{
    PersonalAccessToken, PullRequestId, PullRequestNumber, RepositoryName, RepositoryOwner,
    RepositorySlug,
};
pub use models::{PullRequestDetail, PullRequestIndexEntry, PullRequestState};
pub use pagination::{PageInfo, SearchPage, SearchQuery};

#[cfg(test)]
pub use gateway::{MockPullRequestGateway, MockSearchGateway};
