//! STAR and CARE narrative generation.

use tracing::info;

use crate::github::error::IntakeError;
use crate::store::{ArtifactStore, Narrative, NarrativeKind, StoredFactCard};

use super::prompts::PromptRenderer;
use super::provider::LlmProvider;
use super::reply::parse_json_reply;

/// Progress reported before each narrative kind is generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrativeProgress {
    /// Kind about to be generated.
    pub kind: NarrativeKind,
    /// One-based position of `kind`.
    pub current: usize,
    /// Number of kinds in the run.
    pub total: usize,
}

/// Narratives produced by one run.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeSet {
    /// STAR narratives.
    pub star: Narrative,
    /// CARE narratives.
    pub care: Narrative,
}

/// Folds every fact card into one narrative document per kind.
pub struct NarrativeGenerator<'client, Provider>
where
    Provider: LlmProvider,
{
    provider: &'client Provider,
    store: &'client ArtifactStore,
    prompts: &'client PromptRenderer,
}

impl<'client, Provider> NarrativeGenerator<'client, Provider>
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

    /// Generates and writes the STAR and CARE narratives.
    ///
    /// Narratives are always regenerated from the current fact cards.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Validation`] when no fact cards exist, or the
    /// first provider, parsing or storage error.
    pub async fn generate<P>(&self, mut on_progress: P) -> Result<NarrativeSet, IntakeError>
    where
        P: FnMut(NarrativeProgress),
    {
        let cards = self.store.read_all_fact_cards()?;
        if cards.is_empty() {
            return Err(IntakeError::Validation {
                message: "no fact cards found; run generate-facts first".to_owned(),
            });
        }

        let total = NarrativeKind::ALL.len();
        on_progress(NarrativeProgress {
            kind: NarrativeKind::Star,
            current: 1,
            total,
        });
        let star = self.generate_kind(NarrativeKind::Star, &cards).await?;
        on_progress(NarrativeProgress {
            kind: NarrativeKind::Care,
            current: 2,
            total,
        });
        let care = self.generate_kind(NarrativeKind::Care, &cards).await?;

        Ok(NarrativeSet { star, care })
    }

    async fn generate_kind(
        &self,
        kind: NarrativeKind,
        cards: &[StoredFactCard],
    ) -> Result<Narrative, IntakeError> {
        let prompt = self.prompts.narrative_prompt(kind, cards)?;
        let reply = self
            .provider
            .complete(self.prompts.narrative_system(kind), &prompt)
            .await?;
        let narrative = Narrative::new(parse_json_reply(&reply)?);
        self.store.write(&kind, &narrative)?;
        info!(
            kind = %kind,
            narratives = narrative.entry_count(),
            cards = cards.len(),
            "generated narratives"
        );
        Ok(narrative)
    }
}
