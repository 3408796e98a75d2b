//! Progress lines written to stderr while a stage runs.
//!
//! Progress is observational: a failed write is ignored and never stops a
//! stage.

use std::io::Write;

use prism::collector::{ArtifactOutcome, ArtifactProgress, IndexProgress};
use prism::generate::NarrativeProgress;

use super::stage::Stage;

/// Writes one index pagination update.
pub fn write_index_progress<W: Write>(writer: &mut W, update: IndexProgress) {
    let _ignored = writeln!(
        writer,
        "{}: {}/{} pull requests",
        Stage::CollectIndex,
        update.collected,
        update.estimated_total
    );
}

/// Writes one per-pull-request update.
pub fn write_artifact_progress<W: Write>(
    writer: &mut W,
    stage: Stage,
    update: &ArtifactProgress<'_>,
) {
    let verb = match update.outcome {
        ArtifactOutcome::Skipped => "skipped",
        ArtifactOutcome::Collected => "collected",
    };
    let _ignored = writeln!(
        writer,
        "{stage}: {}/{} {} {verb}",
        update.processed, update.total, update.current
    );
}

/// Writes one narrative update.
pub fn write_narrative_progress<W: Write>(writer: &mut W, update: NarrativeProgress) {
    let _ignored = writeln!(
        writer,
        "{} [{}]: {}/{}",
        Stage::GenerateNarratives,
        update.kind,
        update.current,
        update.total
    );
}

/// Skip and collect counts folded from artifact progress updates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressTally {
    /// Identities visited.
    pub processed: usize,
    /// Artifacts written.
    pub collected: usize,
    /// Identities whose artifact already existed.
    pub skipped: usize,
}

impl ProgressTally {
    /// Counts one update.
    pub const fn observe(&mut self, update: &ArtifactProgress<'_>) {
        self.processed = self.processed.saturating_add(1);
        match update.outcome {
            ArtifactOutcome::Skipped => self.skipped = self.skipped.saturating_add(1),
            ArtifactOutcome::Collected => self.collected = self.collected.saturating_add(1),
        }
    }
}
