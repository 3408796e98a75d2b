//! CLI stage handlers.
//!
//! This module contains the command-line surface of prism:
//! - [`stage`]: Stage names and positional argument handling
//! - [`stages`]: One handler per pipeline stage
//! - [`pipeline`]: Stage completion and the `run-all` runner
//! - [`progress`]: Progress lines written to stderr
//!
//! Output formatting utilities are in [`output`].

use prism::IntakeError;
use thiserror::Error;

pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stage;
pub mod stages;

#[cfg(test)]
pub mod test_utils;

/// Errors that end the process with a failure status.
#[derive(Debug, Error)]
pub enum CliError {
    /// Arguments, configuration, or service setup failed before any stage ran.
    #[error(transparent)]
    Setup(#[from] IntakeError),
    /// A stage failed.
    #[error(transparent)]
    Stage(#[from] pipeline::StageFailure),
}
