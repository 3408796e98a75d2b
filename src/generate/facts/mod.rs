//! Fact card generation.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::collector::{ArtifactProgress, collect_missing};
use crate::github::error::IntakeError;
use crate::github::locator::PullRequestId;
use crate::github::models::{PullRequestDetail, PullRequestIndexEntry};
use crate::store::{ArtifactStore, FactCard, PullRequestDiff, StoredFactCard};

use super::prompts::PromptRenderer;
use super::provider::LlmProvider;
use super::reply::parse_json_reply;

/// Generates a fact card for every collected pull request that lacks one.
pub struct FactGenerator<'client, Provider>
where
    Provider: LlmProvider,
{
    provider: &'client Provider,
    store: &'client ArtifactStore,
    prompts: &'client PromptRenderer,
}

impl<'client, Provider> FactGenerator<'client, Provider>
where
    Provider: LlmProvider,
{
    /// Creates a generator reading and writing through `store`.
    #[must_use]
    pub const fn new(
        provider: &'client Provider,
        store: &'client ArtifactStore,
        prompts: &'client PromptRenderer,
    ) -> Self {
        Self {
            provider,
            store,
            prompts,
        }
    }

    /// Generates missing fact cards in index order and returns the new ones.
    ///
    /// Duplicate index identities are visited once. Identities without a
    /// detail document are left for a later run.
    ///
    /// # Errors
    ///
    /// Returns the first provider, parsing or storage error; cards written
    /// before it are kept.
    pub async fn generate<P>(&self, on_progress: P) -> Result<Vec<StoredFactCard>, IntakeError>
    where
        P: FnMut(ArtifactProgress<'_>),
    {
        let entries = self.ready_entries()?;
        let ids: Vec<PullRequestId> = entries.iter().map(PullRequestIndexEntry::id).collect();
        let by_id: HashMap<&PullRequestId, &PullRequestIndexEntry> =
            ids.iter().zip(entries.iter()).collect();
        let mut cards = Vec::new();

        let run = collect_missing(
            self.store,
            &ids,
            |id: PullRequestId| {
                let entry = by_id.get(&id).copied();
                async move { self.fact_card(entry, &id).await }
            },
            |id: PullRequestId, card: FactCard| cards.push(StoredFactCard { id, card }),
            on_progress,
        )
        .await?;
        info!(
            generated = run.collected,
            skipped = run.skipped,
            "generated fact cards"
        );

        Ok(cards)
    }

    /// Unique index entries whose detail document has been collected.
    fn ready_entries(&self) -> Result<Vec<PullRequestIndexEntry>, IntakeError> {
        let mut seen = HashSet::new();
        let mut ready = Vec::new();
        for entry in self.store.read_index()? {
            let id = entry.id();
            if !seen.insert(id.clone()) {
                continue;
            }
            if self.store.exists::<PullRequestDetail>(&id) {
                ready.push(entry);
            } else {
                warn!(pull_request = %id, "no detail collected; skipping fact card");
            }
        }
        Ok(ready)
    }

    async fn fact_card(
        &self,
        entry: Option<&PullRequestIndexEntry>,
        id: &PullRequestId,
    ) -> Result<FactCard, IntakeError> {
        let Some(found_entry) = entry else {
            return Err(IntakeError::Validation {
                message: format!("{id} is not in the pull request index"),
            });
        };
        let Some(detail) = self.store.read::<PullRequestDetail>(id)? else {
            return Err(IntakeError::Validation {
                message: format!("detail for {id} disappeared while generating facts"),
            });
        };
        let diff = self.store.read::<PullRequestDiff>(id)?;

        let prompt = self.prompts.fact_prompt(found_entry, &detail, diff.as_ref())?;
        let reply = self
            .provider
            .complete(self.prompts.fact_system(), &prompt)
            .await?;
        parse_json_reply(&reply).map(FactCard::new)
    }
}
