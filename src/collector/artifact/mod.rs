//! Per-pull-request enrichment with skip-if-exists resume.

use std::future::Future;

use tracing::{debug, info};

use crate::github::error::IntakeError;
use crate::github::gateway::PullRequestGateway;
use crate::github::locator::{PullRequestId, RepositorySlug};
use crate::github::models::{PullRequestDetail, PullRequestIndexEntry};
use crate::store::{Artifact, ArtifactStore, PullRequestDiff};

/// What happened to one identity during an artifact pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactOutcome {
    /// The artifact was already on disk.
    Skipped,
    /// The artifact was fetched and written.
    Collected,
}

/// Progress reported after every identity, skipped or collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactProgress<'a> {
    /// Identities handled so far, including this one.
    pub processed: usize,
    /// Identities in the pass.
    pub total: usize,
    /// Identity just handled.
    pub current: &'a PullRequestId,
    /// Whether it was skipped or collected.
    pub outcome: ArtifactOutcome,
}

/// Counts from a completed artifact pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArtifactRun {
    /// Artifacts fetched and written by this pass.
    pub collected: usize,
    /// Identities whose artifact already existed.
    pub skipped: usize,
}

/// Fetches and writes the artifact of every identity that lacks one.
///
/// Identities are visited in order. Each newly written artifact is handed
/// to `on_collected` with its identity after it is on disk. The first error
/// aborts the pass; artifacts written before it stay on disk and are skipped
/// next time.
///
/// # Errors
///
/// Returns the first error from `fetch` or from writing to the store.
pub async fn collect_missing<A, F, Fut, C, P>(
    store: &ArtifactStore,
    ids: &[PullRequestId],
    mut fetch: F,
    mut on_collected: C,
    mut on_progress: P,
) -> Result<ArtifactRun, IntakeError>
where
    A: Artifact<Key = PullRequestId>,
    F: FnMut(PullRequestId) -> Fut,
    Fut: Future<Output = Result<A, IntakeError>>,
    C: FnMut(PullRequestId, A),
    P: FnMut(ArtifactProgress<'_>),
{
    let mut run = ArtifactRun::default();

    for (position, id) in ids.iter().enumerate() {
        let outcome = if store.exists::<A>(id) {
            debug!(pull_request = %id, "artifact exists; skipping");
            run.skipped = run.skipped.saturating_add(1);
            ArtifactOutcome::Skipped
        } else {
            let artifact = fetch(id.clone()).await?;
            store.write(id, &artifact)?;
            debug!(pull_request = %id, "artifact written");
            on_collected(id.clone(), artifact);
            run.collected = run.collected.saturating_add(1);
            ArtifactOutcome::Collected
        };

        on_progress(ArtifactProgress {
            processed: position.saturating_add(1),
            total: ids.len(),
            current: id,
            outcome,
        });
    }

    Ok(run)
}

fn repository_ids(
    store: &ArtifactStore,
    slug: &RepositorySlug,
) -> Result<Vec<PullRequestId>, IntakeError> {
    Ok(store
        .index_entries_for(slug.owner(), slug.repository())?
        .iter()
        .map(PullRequestIndexEntry::id)
        .collect())
}

/// Collects detail documents for a repository's indexed pull requests.
pub struct DetailCollector<'client, Gateway>
where
    Gateway: PullRequestGateway,
{
    client: &'client Gateway,
    store: &'client ArtifactStore,
}

impl<'client, Gateway> DetailCollector<'client, Gateway>
where
    Gateway: PullRequestGateway,
{
    /// Creates a collector writing into `store`.
    #[must_use]
    pub const fn new(client: &'client Gateway, store: &'client ArtifactStore) -> Self {
        Self { client, store }
    }

    /// Fetches the detail of every indexed pull request in `slug` that has
    /// none yet, returning the newly collected documents.
    ///
    /// # Errors
    ///
    /// Returns the first gateway or storage error.
    pub async fn collect<P>(
        &self,
        slug: &RepositorySlug,
        on_progress: P,
    ) -> Result<Vec<PullRequestDetail>, IntakeError>
    where
        P: FnMut(ArtifactProgress<'_>),
    {
        let ids = repository_ids(self.store, slug)?;
        let mut details = Vec::new();
        let run = collect_missing(
            self.store,
            &ids,
            |id: PullRequestId| async move { self.client.pull_request_detail(&id).await },
            |_id: PullRequestId, detail: PullRequestDetail| details.push(detail),
            on_progress,
        )
        .await?;
        info!(
            repository = %slug,
            collected = run.collected,
            skipped = run.skipped,
            "collected pull request details"
        );
        Ok(details)
    }
}

/// Collects unified diffs for a repository's indexed pull requests.
pub struct DiffCollector<'client, Gateway>
where
    Gateway: PullRequestGateway,
{
    client: &'client Gateway,
    store: &'client ArtifactStore,
}

impl<'client, Gateway> DiffCollector<'client, Gateway>
where
    Gateway: PullRequestGateway,
{
    /// Creates a collector writing into `store`.
    #[must_use]
    pub const fn new(client: &'client Gateway, store: &'client ArtifactStore) -> Self {
        Self { client, store }
    }

    /// Fetches the diff of every indexed pull request in `slug` that has none
    /// yet, returning how many were collected.
    ///
    /// # Errors
    ///
    /// Returns the first gateway or storage error.
    pub async fn collect<P>(
        &self,
        slug: &RepositorySlug,
        on_progress: P,
    ) -> Result<usize, IntakeError>
    where
        P: FnMut(ArtifactProgress<'_>),
    {
        let ids = repository_ids(self.store, slug)?;
        let run = collect_missing(
            self.store,
            &ids,
            |id: PullRequestId| async move {
                self.client
                    .pull_request_diff(&id)
                    .await
                    .map(PullRequestDiff::new)
            },
            |_id: PullRequestId, _diff: PullRequestDiff| {},
            on_progress,
        )
        .await?;
        info!(
            repository = %slug,
            collected = run.collected,
            skipped = run.skipped,
            "collected pull request diffs"
        );
        Ok(run.collected)
    }
}
