//! Artifact classes persisted by the store.
//!
//! Each class knows its key, its location and how it is encoded on disk.
//! The store itself is generic over [`Artifact`] so that existence checks,
//! reads and writes behave identically for every stage.

use std::fmt;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::github::locator::PullRequestId;
use crate::github::models::PullRequestDetail;

use super::layout;

/// A document persisted under a deterministic key.
pub trait Artifact: Sized {
    /// Identity the artifact is stored under.
    type Key;

    /// Path of the artifact relative to the data directory.
    fn relative_path(key: &Self::Key) -> Utf8PathBuf;

    /// Encodes the artifact as file contents.
    ///
    /// # Errors
    ///
    /// Returns the encoder error when the value cannot be serialised.
    fn encode(&self) -> Result<String, serde_json::Error>;

    /// Decodes file contents into the artifact.
    ///
    /// # Errors
    ///
    /// Returns the decoder error when the contents are not a valid artifact.
    fn decode(contents: String) -> Result<Self, serde_json::Error>;
}

impl Artifact for PullRequestDetail {
    type Key = PullRequestId;

    fn relative_path(key: &Self::Key) -> Utf8PathBuf {
        layout::detail_path(key)
    }

    fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn decode(contents: String) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&contents)
    }
}

/// Raw unified diff text for one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestDiff(String);

impl PullRequestDiff {
    /// Wraps diff text.
    #[must_use]
    pub const fn new(text: String) -> Self {
        Self(text)
    }

    /// Borrow the diff text.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Artifact for PullRequestDiff {
    type Key = PullRequestId;

    fn relative_path(key: &Self::Key) -> Utf8PathBuf {
        layout::diff_path(key)
    }

    fn encode(&self) -> Result<String, serde_json::Error> {
        Ok(self.0.clone())
    }

    fn decode(contents: String) -> Result<Self, serde_json::Error> {
        Ok(Self(contents))
    }
}

/// Generated summary of one pull request.
///
/// The document shape is owned by the prompt, so it is kept as free-form
/// JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactCard(Value);

impl FactCard {
    /// Wraps a generated JSON document.
    #[must_use]
    pub const fn new(document: Value) -> Self {
        Self(document)
    }

    /// Borrow the JSON document.
    #[must_use]
    pub const fn document(&self) -> &Value {
        &self.0
    }
}

impl Artifact for FactCard {
    type Key = PullRequestId;

    fn relative_path(key: &Self::Key) -> Utf8PathBuf {
        layout::fact_card_path(key)
    }

    fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn decode(contents: String) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&contents)
    }
}

/// Narrative framework a generated narrative follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NarrativeKind {
    /// Situation, Task, Action, Result.
    Star,
    /// Context, Action, Result, Learning.
    Care,
}

impl NarrativeKind {
    /// Every narrative kind in generation order.
    pub const ALL: [Self; 2] = [Self::Star, Self::Care];

    /// Lowercase name used in file names and prompts.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Star => "star",
            Self::Care => "care",
        }
    }
}

impl fmt::Display for NarrativeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated narrative document for one [`NarrativeKind`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Narrative(Value);

impl Narrative {
    /// Wraps a generated JSON document.
    #[must_use]
    pub const fn new(document: Value) -> Self {
        Self(document)
    }

    /// Borrow the JSON document.
    #[must_use]
    pub const fn document(&self) -> &Value {
        &self.0
    }

    /// Number of entries in the document's `narratives` array, zero when the
    /// array is absent.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.0
            .get("narratives")
            .and_then(Value::as_array)
            .map_or(0, Vec::len)
    }
}

impl Artifact for Narrative {
    type Key = NarrativeKind;

    fn relative_path(key: &Self::Key) -> Utf8PathBuf {
        layout::narrative_path(*key)
    }

    fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    fn decode(contents: String) -> Result<Self, serde_json::Error> {
        serde_json::from_str(&contents)
    }
}
