//! Error type for the artifact store.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing persisted artifacts.
///
/// A missing artifact is not an error; reads return `Ok(None)` instead.
/// [`StoreError::Corrupt`] is reserved for files that exist but cannot be
/// decoded.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The filesystem operation itself failed.
    #[error("failed to access '{path}': {message}")]
    Io {
        /// Absolute or data-dir-relative path of the artifact.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        message: String,
    },

    /// The artifact exists but its contents do not decode.
    #[error("artifact '{path}' is corrupt: {message}")]
    Corrupt {
        /// Path of the unreadable artifact.
        path: Utf8PathBuf,
        /// Decoder error, including the line for index records.
        message: String,
    },

    /// The in-memory value could not be encoded.
    #[error("failed to serialise '{path}': {message}")]
    Serialise {
        /// Path the value was destined for.
        path: Utf8PathBuf,
        /// Encoder error.
        message: String,
    },

    /// A computed artifact path has no file name component.
    #[error("invalid artifact path '{0}'")]
    InvalidPath(Utf8PathBuf),
}
