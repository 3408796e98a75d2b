//! Stage completion handling and the `run-all` pipeline.

use std::io::Write;

use prism::github::{PullRequestGateway, SearchGateway};
use prism::telemetry::{TelemetryEvent, TelemetrySink};
use prism::{IntakeError, LlmProvider};
use thiserror::Error;
use tracing::info;

use super::output::{write_nothing_selected, write_stage_summary};
use super::stage::Stage;
use super::stages::{self, StageContext, StageOutcome, StageReport};

/// A stage failed; later stages were not run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{stage} failed: {error}")]
pub struct StageFailure {
    /// Stage that failed.
    pub stage: Stage,
    /// Underlying error.
    pub error: IntakeError,
}

/// Remote services needed by `run-all`.
pub struct Services<'a, S, G, P> {
    /// GraphQL search transport for index collection.
    pub search: &'a S,
    /// REST transport for details and diffs.
    pub pulls: &'a G,
    /// LLM provider for generation stages.
    pub provider: &'a P,
}

impl<S, G, P> Clone for Services<'_, S, G, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, G, P> Copy for Services<'_, S, G, P> {}

/// How `run-all` ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// Every stage completed.
    Completed(Vec<StageReport>),
    /// Index selection kept nothing; later stages were skipped.
    NothingSelected {
        /// Pull requests found before selection.
        found: usize,
    },
}

/// Runs every stage in order, stopping at the first failure or at an empty
/// selection.
///
/// # Errors
///
/// Returns a [`StageFailure`] naming the first stage that failed.
pub async fn run_all<S, G, P, O, E>(
    context: StageContext<'_>,
    services: Services<'_, S, G, P>,
    stdout: &mut O,
    progress: &mut E,
    telemetry: &dyn TelemetrySink,
) -> Result<PipelineOutcome, StageFailure>
where
    S: SearchGateway,
    G: PullRequestGateway,
    P: LlmProvider,
    O: Write,
    E: Write,
{
    let mut reports = Vec::with_capacity(Stage::PIPELINE.len());
    for stage in Stage::PIPELINE {
        let result = run_pipeline_stage(stage, context, services, progress).await;
        match finish_stage(stage, result, stdout, telemetry)? {
            StageOutcome::Completed(report) => reports.push(report),
            StageOutcome::NothingSelected { found } => {
                info!(found, "selection kept no pull requests; stopping pipeline");
                return Ok(PipelineOutcome::NothingSelected { found });
            }
        }
    }
    Ok(PipelineOutcome::Completed(reports))
}

async fn run_pipeline_stage<S, G, P, E>(
    stage: Stage,
    context: StageContext<'_>,
    services: Services<'_, S, G, P>,
    progress: &mut E,
) -> Result<StageOutcome, IntakeError>
where
    S: SearchGateway,
    G: PullRequestGateway,
    P: LlmProvider,
    E: Write,
{
    match stage {
        Stage::CollectIndex => stages::collect_index(context, services.search, progress).await,
        Stage::CollectDetail => stages::collect_details(context, services.pulls, progress)
            .await
            .map(StageOutcome::Completed),
        Stage::CollectDiff => stages::collect_diffs(context, services.pulls, progress)
            .await
            .map(StageOutcome::Completed),
        Stage::GenerateFacts => stages::generate_facts(context, services.provider, progress)
            .await
            .map(StageOutcome::Completed),
        Stage::GenerateNarratives => {
            stages::generate_narratives(context, services.provider, progress)
                .await
                .map(StageOutcome::Completed)
        }
        Stage::RunAll => Err(IntakeError::Validation {
            message: "run-all is not a pipeline stage".to_owned(),
        }),
    }
}

/// Prints the summary of a stage result and records telemetry.
///
/// # Errors
///
/// Returns a [`StageFailure`] when the stage failed or its summary could
/// not be written.
pub fn finish_stage<O: Write>(
    stage: Stage,
    result: Result<StageOutcome, IntakeError>,
    stdout: &mut O,
    telemetry: &dyn TelemetrySink,
) -> Result<StageOutcome, StageFailure> {
    let outcome = result.map_err(|error| halt(stage, error, telemetry))?;
    let written = match &outcome {
        StageOutcome::Completed(report) => {
            telemetry.record(TelemetryEvent::StageCompleted {
                stage: stage.to_string(),
                processed: count(report.processed),
                collected: count(report.collected),
                skipped: count(report.skipped),
            });
            write_stage_summary(stdout, report)
        }
        StageOutcome::NothingSelected { found } => write_nothing_selected(stdout, *found),
    };
    written.map_err(|error| halt(stage, error, telemetry))?;
    Ok(outcome)
}

fn halt(stage: Stage, error: IntakeError, telemetry: &dyn TelemetrySink) -> StageFailure {
    telemetry.record(TelemetryEvent::PipelineHalted {
        stage: stage.to_string(),
        message: error.to_string(),
    });
    StageFailure { stage, error }
}

fn count(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests;
