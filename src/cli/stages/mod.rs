//! One handler per pipeline stage.
//!
//! Handlers are generic over the gateway and provider traits so tests can
//! drive them without a network.

use std::collections::BTreeSet;
use std::io::Write;

use prism::collector::{DetailCollector, DiffCollector, IndexCollector};
use prism::generate::{FactGenerator, LlmProvider, NarrativeGenerator, PromptRenderer};
use prism::github::{PullRequestGateway, PullRequestId, PullRequestIndexEntry, SearchGateway};
use prism::store::NarrativeKind;
use prism::store::layout::INDEX_FILE;
use prism::{ArtifactStore, IntakeError, PrismConfig};

use super::progress::{
    ProgressTally, write_artifact_progress, write_index_progress, write_narrative_progress,
};
use super::stage::Stage;

/// Configuration and store shared by every stage of one invocation.
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    /// Merged configuration.
    pub config: &'a PrismConfig,
    /// Artifact store under `config.data_dir`.
    pub store: &'a ArtifactStore,
}

/// Counts and a one-line summary for a completed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// Stage that ran.
    pub stage: Stage,
    /// Entities visited.
    pub processed: usize,
    /// Entities fetched, generated, or written.
    pub collected: usize,
    /// Entities skipped.
    pub skipped: usize,
    /// Human-readable summary printed to stdout.
    pub summary: String,
}

/// How a stage ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    /// The stage ran to completion.
    Completed(StageReport),
    /// The selection kept no pull requests; nothing further should run.
    NothingSelected {
        /// Pull requests found before selection.
        found: usize,
    },
}

/// Searches every configured repository and writes the selected entries as
/// the new index.
///
/// # Errors
///
/// Returns configuration errors before any request, then the first search
/// or storage error. The index is left untouched on error.
pub async fn collect_index<S, W>(
    context: StageContext<'_>,
    gateway: &S,
    progress: &mut W,
) -> Result<StageOutcome, IntakeError>
where
    S: SearchGateway,
    W: Write,
{
    let config = context.config;
    let repositories = config.require_repositories()?;
    let author = config.require_author()?;
    let state = config.state_filter()?;
    let selection = config.selection(&repositories)?;

    let collector = IndexCollector::new(gateway, config.page_size, config.max_pages);
    let entries = collector
        .collect(&repositories, author, state, |update| {
            write_index_progress(progress, update);
        })
        .await?;

    let found = entries.len();
    let kept = select_entries(entries, selection.as_ref());
    if selection.is_some() && kept.is_empty() {
        return Ok(StageOutcome::NothingSelected { found });
    }

    context.store.write_index(&kept)?;
    Ok(StageOutcome::Completed(StageReport {
        stage: Stage::CollectIndex,
        processed: found,
        collected: kept.len(),
        skipped: found.saturating_sub(kept.len()),
        summary: format!("saved {}/{found} pull requests to {INDEX_FILE}", kept.len()),
    }))
}

/// Keeps entries whose identity is selected, or every entry without a
/// selection.
#[must_use]
pub fn select_entries(
    entries: Vec<PullRequestIndexEntry>,
    selection: Option<&BTreeSet<PullRequestId>>,
) -> Vec<PullRequestIndexEntry> {
    match selection {
        Some(selected) => entries
            .into_iter()
            .filter(|entry| {
                let id = entry.id();
                selected.iter().any(|wanted| wanted.same_pull_request(&id))
            })
            .collect(),
        None => entries,
    }
}

/// Fetches missing detail documents for every configured repository.
///
/// # Errors
///
/// Returns the first configuration, gateway, or storage error.
pub async fn collect_details<G, W>(
    context: StageContext<'_>,
    gateway: &G,
    progress: &mut W,
) -> Result<StageReport, IntakeError>
where
    G: PullRequestGateway,
    W: Write,
{
    let repositories = context.config.require_repositories()?;
    let collector = DetailCollector::new(gateway, context.store);
    let mut tally = ProgressTally::default();
    for slug in &repositories {
        collector
            .collect(slug, |update| {
                tally.observe(&update);
                write_artifact_progress(progress, Stage::CollectDetail, &update);
            })
            .await?;
    }
    Ok(tally_report(Stage::CollectDetail, tally, "collected", "details"))
}

/// Fetches missing diffs for every configured repository.
///
/// # Errors
///
/// Returns the first configuration, gateway, or storage error.
pub async fn collect_diffs<G, W>(
    context: StageContext<'_>,
    gateway: &G,
    progress: &mut W,
) -> Result<StageReport, IntakeError>
where
    G: PullRequestGateway,
    W: Write,
{
    let repositories = context.config.require_repositories()?;
    let collector = DiffCollector::new(gateway, context.store);
    let mut tally = ProgressTally::default();
    for slug in &repositories {
        collector
            .collect(slug, |update| {
                tally.observe(&update);
                write_artifact_progress(progress, Stage::CollectDiff, &update);
            })
            .await?;
    }
    Ok(tally_report(Stage::CollectDiff, tally, "collected", "diffs"))
}

/// Generates missing fact cards for every indexed pull request.
///
/// # Errors
///
/// Returns the first template, provider, parsing, or storage error.
pub async fn generate_facts<P, W>(
    context: StageContext<'_>,
    provider: &P,
    progress: &mut W,
) -> Result<StageReport, IntakeError>
where
    P: LlmProvider,
    W: Write,
{
    let prompts = PromptRenderer::new(context.config.lang.clone())?;
    let generator = FactGenerator::new(provider, context.store, &prompts);
    let mut tally = ProgressTally::default();
    generator
        .generate(|update| {
            tally.observe(&update);
            write_artifact_progress(progress, Stage::GenerateFacts, &update);
        })
        .await?;
    Ok(tally_report(Stage::GenerateFacts, tally, "generated", "fact cards"))
}

/// Regenerates the STAR and CARE narratives from every fact card.
///
/// # Errors
///
/// Returns [`IntakeError::Validation`] without fact cards, or the first
/// template, provider, parsing, or storage error.
pub async fn generate_narratives<P, W>(
    context: StageContext<'_>,
    provider: &P,
    progress: &mut W,
) -> Result<StageReport, IntakeError>
where
    P: LlmProvider,
    W: Write,
{
    let prompts = PromptRenderer::new(context.config.lang.clone())?;
    let generator = NarrativeGenerator::new(provider, context.store, &prompts);
    let narratives = generator
        .generate(|update| write_narrative_progress(progress, update))
        .await?;
    let star = narratives.star.entry_count();
    let care = narratives.care.entry_count();
    Ok(StageReport {
        stage: Stage::GenerateNarratives,
        processed: NarrativeKind::ALL.len(),
        collected: NarrativeKind::ALL.len(),
        skipped: 0,
        summary: format!("generated {star} STAR + {care} CARE narratives"),
    })
}

fn tally_report(stage: Stage, tally: ProgressTally, verb: &str, noun: &str) -> StageReport {
    StageReport {
        stage,
        processed: tally.processed,
        collected: tally.collected,
        skipped: tally.skipped,
        summary: format!(
            "{verb} {} {noun}, skipped {} of {}",
            tally.collected, tally.skipped, tally.processed
        ),
    }
}
