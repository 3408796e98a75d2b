//! JSON Lines persistence for the pull request index.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::OpenOptions;
use cap_std::fs_utf8::File;

use crate::github::models::PullRequestIndexEntry;

use super::error::StoreError;

/// Streaming writer that appends index entries to an open file.
///
/// Every entry is written as one line as soon as it is appended, so entries
/// written before an interruption survive.
pub struct IndexAppender {
    path: Utf8PathBuf,
    file: File,
}

impl IndexAppender {
    pub(super) fn open(
        dir: &cap_std::fs_utf8::Dir,
        relative: &Utf8Path,
        path: Utf8PathBuf,
    ) -> Result<Self, StoreError> {
        let mut options = OpenOptions::new();
        options.create(true).append(true);
        let file = dir
            .open_with(relative, &options)
            .map_err(|error| StoreError::Io {
                path: path.clone(),
                message: error.to_string(),
            })?;
        Ok(Self { path, file })
    }

    /// Appends one entry as a JSON line.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialise`] when the entry cannot be encoded or
    /// [`StoreError::Io`] when the write fails.
    pub fn append(&mut self, entry: &PullRequestIndexEntry) -> Result<(), StoreError> {
        let line = encode_line(&self.path, entry)?;
        writeln!(self.file, "{line}").map_err(|error| StoreError::Io {
            path: self.path.clone(),
            message: error.to_string(),
        })
    }

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when flushing fails.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.file.flush().map_err(|error| StoreError::Io {
            path: self.path.clone(),
            message: error.to_string(),
        })
    }
}

pub(super) fn encode_line(
    path: &Utf8Path,
    entry: &PullRequestIndexEntry,
) -> Result<String, StoreError> {
    serde_json::to_string(entry).map_err(|error| StoreError::Serialise {
        path: path.to_path_buf(),
        message: error.to_string(),
    })
}

pub(super) fn encode_all(
    path: &Utf8Path,
    entries: &[PullRequestIndexEntry],
) -> Result<String, StoreError> {
    entries.iter().try_fold(String::new(), |mut contents, entry| {
        contents.push_str(&encode_line(path, entry)?);
        contents.push('\n');
        Ok(contents)
    })
}

/// Blank lines are ignored; any other undecodable line makes the whole index
/// corrupt.
pub(super) fn decode_all(
    path: &Utf8Path,
    contents: &str,
) -> Result<Vec<PullRequestIndexEntry>, StoreError> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(line_index, line)| {
            serde_json::from_str(line).map_err(|error| StoreError::Corrupt {
                path: path.to_path_buf(),
                message: format!("line {}: {error}", line_index.saturating_add(1)),
            })
        })
        .collect()
}
