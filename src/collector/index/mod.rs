//! Pull request index collection across repositories.

use clap::ValueEnum;
use tracing::info;

use crate::github::error::IntakeError;
use crate::github::gateway::SearchGateway;
use crate::github::locator::RepositorySlug;
use crate::github::models::{PullRequestIndexEntry, PullRequestSearchNode};
use crate::github::pagination::SearchQuery;

use super::{IndexProgress, PaginatedFetcher};

/// Lifecycle filter applied to the search predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StateFilter {
    /// Open pull requests only.
    Open,
    /// Closed pull requests, merged or not.
    Closed,
    /// Merged pull requests only.
    #[default]
    Merged,
    /// Every pull request regardless of state.
    All,
}

impl StateFilter {
    /// Parses a configured state name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Configuration`] for unknown names.
    pub fn parse(value: &str) -> Result<Self, IntakeError> {
        <Self as ValueEnum>::from_str(value.trim(), true).map_err(|_| IntakeError::Configuration {
            message: format!("state must be one of open, closed, merged, all (got '{value}')"),
        })
    }

    const fn qualifier(self) -> Option<&'static str> {
        match self {
            Self::Open => Some("is:open"),
            Self::Closed => Some("is:closed"),
            Self::Merged => Some("is:merged"),
            Self::All => None,
        }
    }
}

/// Builds the search predicate selecting one author's pull requests in one
/// repository.
///
/// # Example
///
/// ```
/// use prism::collector::{StateFilter, search_predicate};
/// use prism::github::RepositorySlug;
///
/// let slug: RepositorySlug = "octo/widgets".parse().expect("valid slug");
/// assert_eq!(
///     search_predicate(&slug, "alice", StateFilter::Merged),
///     "repo:octo/widgets type:pr author:alice is:merged"
/// );
/// ```
#[must_use]
pub fn search_predicate(slug: &RepositorySlug, author: &str, state: StateFilter) -> String {
    let base = format!("{} type:pr author:{author}", slug.search_qualifier());
    match state.qualifier() {
        Some(qualifier) => format!("{base} {qualifier}"),
        None => base,
    }
}

/// Enumerates every matching pull request across a list of repositories.
pub struct IndexCollector<'client, Gateway>
where
    Gateway: SearchGateway,
{
    client: &'client Gateway,
    page_size: u8,
    max_pages: u32,
}

impl<'client, Gateway> IndexCollector<'client, Gateway>
where
    Gateway: SearchGateway,
{
    /// Creates a collector that requests `page_size` nodes per page and at
    /// most `max_pages` pages per repository.
    #[must_use]
    pub const fn new(client: &'client Gateway, page_size: u8, max_pages: u32) -> Self {
        Self {
            client,
            page_size,
            max_pages,
        }
    }

    /// Collects index entries for `author` in every repository, in
    /// repository order and then search order.
    ///
    /// The entries are returned, not persisted, so a selection step can sit
    /// between collection and writing the index.
    ///
    /// # Errors
    ///
    /// Returns the first gateway or projection error; nothing is returned
    /// for repositories collected before the failure.
    pub async fn collect<P>(
        &self,
        repositories: &[RepositorySlug],
        author: &str,
        state: StateFilter,
        mut on_progress: P,
    ) -> Result<Vec<PullRequestIndexEntry>, IntakeError>
    where
        P: FnMut(IndexProgress),
    {
        let mut fetcher = PaginatedFetcher::new(self.max_pages);
        let mut entries = Vec::new();

        for slug in repositories {
            let query = SearchQuery::new(search_predicate(slug, author, state), self.page_size)?;
            let nodes: Vec<PullRequestSearchNode> = fetcher
                .fetch_all(
                    query,
                    |page_query: SearchQuery| async move {
                        self.client.search_pull_requests(&page_query).await
                    },
                    &mut on_progress,
                )
                .await?;
            info!(repository = %slug, found = nodes.len(), "collected pull request index");

            for node in nodes {
                entries.push(node.into_index_entry(slug)?);
            }
        }

        Ok(entries)
    }
}
