//! Output formatting utilities for CLI operations.

use std::io::Write;

use prism::IntakeError;

use super::stage::Stage;
use super::stages::StageReport;

/// Writes the one-line summary of a completed stage.
///
/// # Errors
///
/// Returns [`IntakeError::Io`] when the writer fails.
pub fn write_stage_summary<W: Write>(
    writer: &mut W,
    report: &StageReport,
) -> Result<(), IntakeError> {
    writeln!(writer, "{}: {}", report.stage, report.summary).map_err(|error| io_error(&error))
}

/// Writes the notice for a selection that kept nothing.
///
/// # Errors
///
/// Returns [`IntakeError::Io`] when the writer fails.
pub fn write_nothing_selected<W: Write>(writer: &mut W, found: usize) -> Result<(), IntakeError> {
    writeln!(
        writer,
        "{}: no pull requests selected out of {found}; nothing to do",
        Stage::CollectIndex
    )
    .map_err(|error| io_error(&error))
}

fn io_error(error: &std::io::Error) -> IntakeError {
    IntakeError::Io {
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{write_nothing_selected, write_stage_summary};
    use crate::cli::stage::Stage;
    use crate::cli::stages::StageReport;

    #[test]
    fn summary_is_prefixed_with_stage_name() {
        let report = StageReport {
            stage: Stage::CollectDetail,
            processed: 3,
            collected: 2,
            skipped: 1,
            summary: "collected 2 details, skipped 1 of 3".to_owned(),
        };
        let mut buffer = Vec::new();
        write_stage_summary(&mut buffer, &report).expect("summary should be written");

        assert_eq!(
            String::from_utf8(buffer).expect("summary should be UTF-8"),
            "collect-detail: collected 2 details, skipped 1 of 3\n"
        );
    }

    #[test]
    fn nothing_selected_mentions_found_count() {
        let mut buffer = Vec::new();
        write_nothing_selected(&mut buffer, 8).expect("notice should be written");

        let text = String::from_utf8(buffer).expect("notice should be UTF-8");
        assert!(text.contains("out of 8"), "unexpected notice: {text}");
    }
}
