//! Scenario state for the resumable collection BDD tests.

use prism::IntakeError;
use prism::github::PullRequestIndexEntry;
use rstest_bdd::Slot;
use rstest_bdd_macros::ScenarioState;

use super::support::{MockGitHub, TempStore, create_temp_store};

#[derive(ScenarioState, Default)]
pub(crate) struct CollectionState {
    pub(crate) github: Slot<MockGitHub>,
    pub(crate) store: Slot<TempStore>,
    pub(crate) entries: Slot<Vec<PullRequestIndexEntry>>,
    pub(crate) estimate: Slot<u64>,
    pub(crate) progress: Slot<Vec<(usize, usize)>>,
    pub(crate) stored_detail: Slot<String>,
    pub(crate) error: Slot<IntakeError>,
}

impl CollectionState {
    /// Starts the mock server on first use.
    pub(crate) fn ensure_github(&self) {
        if self.github.with_ref(|_| ()).is_none() {
            self.github.set(MockGitHub::start());
        }
    }

    /// Opens the temporary store on first use.
    pub(crate) fn ensure_store(&self) {
        if self.store.with_ref(|_| ()).is_none() {
            self.store.set(create_temp_store());
        }
    }

    /// Runs `action` with the mock server.
    pub(crate) fn with_github<R>(&self, action: impl FnOnce(&MockGitHub) -> R) -> R {
        self.ensure_github();
        self.github
            .with_ref(action)
            .unwrap_or_else(|| panic!("mock GitHub not initialised"))
    }

    /// Runs `action` with the store.
    pub(crate) fn with_store<R>(&self, action: impl FnOnce(&TempStore) -> R) -> R {
        self.ensure_store();
        self.store
            .with_ref(action)
            .unwrap_or_else(|| panic!("artifact store not initialised"))
    }
}
