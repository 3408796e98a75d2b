//! Stage names accepted as the first positional argument.

use std::ffi::OsString;
use std::fmt;

use clap::ValueEnum;
use prism::IntakeError;

/// One pipeline stage, or `run-all` for every stage in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Stage {
    /// Search GitHub and write `pr_index.jsonl`.
    CollectIndex,
    /// Fetch detail documents for indexed pull requests.
    CollectDetail,
    /// Fetch unified diffs for indexed pull requests.
    CollectDiff,
    /// Generate fact cards with the LLM provider.
    GenerateFacts,
    /// Generate STAR and CARE narratives from fact cards.
    GenerateNarratives,
    /// Run every stage above in order.
    RunAll,
}

impl Stage {
    /// Stages run by `run-all`, in order.
    pub const PIPELINE: [Self; 5] = [
        Self::CollectIndex,
        Self::CollectDetail,
        Self::CollectDiff,
        Self::GenerateFacts,
        Self::GenerateNarratives,
    ];

    /// Name as typed on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CollectIndex => "collect-index",
            Self::CollectDetail => "collect-detail",
            Self::CollectDiff => "collect-diff",
            Self::GenerateFacts => "generate-facts",
            Self::GenerateNarratives => "generate-narratives",
            Self::RunAll => "run-all",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits the stage off the argument list.
///
/// The stage must directly follow the program name. The returned arguments
/// keep the program name so they can be handed to the configuration loader.
///
/// # Errors
///
/// Returns [`IntakeError::MissingStage`] when no positional stage is given
/// and [`IntakeError::UnknownStage`] when it is not a known stage name.
pub fn split_stage<I>(args: I) -> Result<(Stage, Vec<OsString>), IntakeError>
where
    I: IntoIterator<Item = OsString>,
{
    let mut iter = args.into_iter();
    let program = iter.next().unwrap_or_else(|| OsString::from("prism"));
    let Some(candidate) = iter.next() else {
        return Err(IntakeError::MissingStage);
    };
    let name = candidate.to_string_lossy();
    if name.starts_with('-') {
        return Err(IntakeError::MissingStage);
    }
    let stage = Stage::from_str(&name, true).map_err(|_| IntakeError::UnknownStage {
        stage: name.clone().into_owned(),
    })?;

    let mut remaining = vec![program];
    remaining.extend(iter);
    Ok((stage, remaining))
}
