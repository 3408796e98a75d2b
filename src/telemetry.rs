//! Pipeline telemetry events and sinks.
//!
//! Prism runs locally, but long collections still benefit from a structured
//! record of how each stage ended. Events are opt-in and only ever written to
//! stderr.

use std::io;

use serde::{Deserialize, Serialize};

/// A structured telemetry event emitted by prism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A stage finished successfully.
    StageCompleted {
        /// Stage name as typed on the command line (e.g. `collect-detail`).
        stage: String,
        /// Entities the stage visited.
        processed: u64,
        /// Entities fetched or generated during this run.
        collected: u64,
        /// Entities skipped because their artifact already existed.
        skipped: u64,
    },
    /// A stage failed and the remaining stages were not run.
    PipelineHalted {
        /// Stage that failed.
        stage: String,
        /// Error message reported to the operator.
        message: String,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Records telemetry events to stderr as JSON lines (JSONL).
#[derive(Debug, Default)]
pub struct StderrJsonlTelemetrySink;

impl TelemetrySink for StderrJsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };

        let _ignored = writeln_stderr(&serialised);
    }
}

fn writeln_stderr(message: &str) -> io::Result<()> {
    use io::Write;

    let mut stderr = io::stderr().lock();
    writeln!(stderr, "{message}")
}
