//! Collection stages built on the GitHub gateways and the artifact store.
//!
//! [`PaginatedFetcher`] walks cursor-paged search results, [`IndexCollector`]
//! turns them into index entries for a set of repositories, and the
//! per-pull-request collectors enrich indexed identities while skipping any
//! whose artifact is already on disk.

mod artifact;
mod index;
mod paginator;

pub use artifact::{
    ArtifactOutcome, ArtifactProgress, ArtifactRun, DetailCollector, DiffCollector,
    collect_missing,
};
pub use index::{IndexCollector, StateFilter, search_predicate};
pub use paginator::PaginatedFetcher;

/// Progress reported after every search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexProgress {
    /// Items collected so far across every repository.
    pub collected: u64,
    /// Running estimate of the total, never decreasing.
    pub estimated_total: u64,
}
