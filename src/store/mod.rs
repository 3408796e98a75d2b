//! File-backed artifact store.
//!
//! Every artifact lives at a deterministic path under the data directory
//! (see [`layout`]). The presence of a file is the only record that a stage
//! has processed an identity, so reads distinguish "never written"
//! (`Ok(None)`) from "written but unreadable" ([`StoreError::Corrupt`]).
//! Writes go to a staging file that is renamed into place, so a crash never
//! leaves a half-written artifact under its final name.

pub mod artifact;
mod error;
mod index;
pub mod layout;

use std::collections::HashSet;
use std::fmt;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use tracing::debug;

use crate::github::locator::{PullRequestId, RepositoryName, RepositoryOwner};
use crate::github::models::PullRequestIndexEntry;

pub use artifact::{Artifact, FactCard, Narrative, NarrativeKind, PullRequestDiff};
pub use error::StoreError;
pub use index::IndexAppender;

/// Fact card paired with the identity it was generated for.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFactCard {
    /// Identity of the summarised pull request.
    pub id: PullRequestId,
    /// Generated card.
    pub card: FactCard,
}

/// Artifact store rooted at a data directory.
pub struct ArtifactStore {
    root: Utf8PathBuf,
    dir: Dir,
}

impl fmt::Debug for ArtifactStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtifactStore")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl ArtifactStore {
    /// Opens the store, creating the data directory when it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the directory cannot be created or
    /// opened.
    pub fn open(root: &Utf8Path) -> Result<Self, StoreError> {
        let io_error = |error: io::Error| StoreError::Io {
            path: root.to_path_buf(),
            message: error.to_string(),
        };
        Dir::create_ambient_dir_all(root, ambient_authority()).map_err(io_error)?;
        let dir = Dir::open_ambient_dir(root, ambient_authority()).map_err(io_error)?;
        Ok(Self {
            root: root.to_path_buf(),
            dir,
        })
    }

    /// Data directory the store is rooted at.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        self.root.as_path()
    }

    /// Returns true when the artifact for `key` has been written.
    #[must_use]
    pub fn exists<A: Artifact>(&self, key: &A::Key) -> bool {
        self.dir.exists(A::relative_path(key))
    }

    /// Reads the artifact for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when the file exists but does not
    /// decode, or [`StoreError::Io`] when it cannot be read.
    pub fn read<A: Artifact>(&self, key: &A::Key) -> Result<Option<A>, StoreError> {
        let relative = A::relative_path(key);
        let Some(contents) = self.read_text(&relative)? else {
            return Ok(None);
        };
        A::decode(contents)
            .map(Some)
            .map_err(|error| StoreError::Corrupt {
                path: self.root.join(&relative),
                message: error.to_string(),
            })
    }

    /// Writes the artifact for `key`, replacing any previous version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Serialise`] when the artifact cannot be encoded
    /// or [`StoreError::Io`] when it cannot be written.
    pub fn write<A: Artifact>(&self, key: &A::Key, artifact: &A) -> Result<(), StoreError> {
        let relative = A::relative_path(key);
        let contents = artifact.encode().map_err(|error| StoreError::Serialise {
            path: self.root.join(&relative),
            message: error.to_string(),
        })?;
        self.write_text(&relative, &contents)
    }

    /// Opens a streaming appender on the index, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] when the index cannot be opened.
    pub fn index_appender(&self) -> Result<IndexAppender, StoreError> {
        let relative = layout::index_path();
        IndexAppender::open(&self.dir, relative, self.root.join(relative))
    }

    /// Appends a single entry to the index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the index cannot be opened or written.
    pub fn append_index_entry(&self, entry: &PullRequestIndexEntry) -> Result<(), StoreError> {
        let mut appender = self.index_appender()?;
        appender.append(entry)?;
        appender.flush()
    }

    /// Replaces the whole index with `entries`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when an entry cannot be encoded or the index
    /// cannot be written.
    pub fn write_index(&self, entries: &[PullRequestIndexEntry]) -> Result<(), StoreError> {
        let relative = layout::index_path();
        let contents = index::encode_all(&self.root.join(relative), entries)?;
        self.write_text(relative, &contents)?;
        debug!(entries = entries.len(), "wrote pull request index");
        Ok(())
    }

    /// Reads every index entry in file order; empty when nothing has been
    /// collected yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when any line does not decode.
    pub fn read_index(&self) -> Result<Vec<PullRequestIndexEntry>, StoreError> {
        let relative = layout::index_path();
        match self.read_text(relative)? {
            Some(contents) => index::decode_all(&self.root.join(relative), &contents),
            None => Ok(Vec::new()),
        }
    }

    /// Reads the index entries belonging to one repository, in index order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when the index does not decode.
    pub fn index_entries_for(
        &self,
        owner: &RepositoryOwner,
        repo: &RepositoryName,
    ) -> Result<Vec<PullRequestIndexEntry>, StoreError> {
        Ok(self
            .read_index()?
            .into_iter()
            .filter(|entry| entry.belongs_to(owner, repo))
            .collect())
    }

    /// Reads the fact card of every unique index identity that has one.
    ///
    /// Duplicate identities in the index yield a single card; identities
    /// without a card are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when the index or a card does not
    /// decode.
    pub fn read_all_fact_cards(&self) -> Result<Vec<StoredFactCard>, StoreError> {
        let mut seen = HashSet::new();
        let mut cards = Vec::new();
        for entry in self.read_index()? {
            let id = entry.id();
            if !seen.insert(id.clone()) {
                continue;
            }
            if let Some(card) = self.read::<FactCard>(&id)? {
                cards.push(StoredFactCard { id, card });
            }
        }
        Ok(cards)
    }

    fn read_text(&self, relative: &Utf8Path) -> Result<Option<String>, StoreError> {
        match self.dir.read_to_string(relative) {
            Ok(contents) => Ok(Some(contents)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) if error.kind() == io::ErrorKind::InvalidData => {
                Err(StoreError::Corrupt {
                    path: self.root.join(relative),
                    message: error.to_string(),
                })
            }
            Err(error) => Err(StoreError::Io {
                path: self.root.join(relative),
                message: error.to_string(),
            }),
        }
    }

    fn write_text(&self, relative: &Utf8Path, contents: &str) -> Result<(), StoreError> {
        let path = self.root.join(relative);
        let io_error = |error: io::Error| StoreError::Io {
            path: path.clone(),
            message: error.to_string(),
        };
        let file_name = relative
            .file_name()
            .ok_or_else(|| StoreError::InvalidPath(path.clone()))?;
        if let Some(parent) = relative.parent().filter(|parent| !parent.as_str().is_empty()) {
            self.dir.create_dir_all(parent).map_err(io_error)?;
        }

        let staging = relative.with_file_name(format!(".{file_name}.partial"));
        self.dir.write(&staging, contents).map_err(io_error)?;
        self.dir
            .rename(&staging, &self.dir, relative)
            .map_err(io_error)?;
        debug!(path = %path, "wrote artifact");
        Ok(())
    }
}
