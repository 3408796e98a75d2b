//! Shared test utilities.

use camino::Utf8PathBuf;
use prism::ArtifactStore;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use url::Url;
use wiremock::{Mock, MockServer};

/// Artifact store in a temporary data directory.
pub struct TempStore {
    /// Keeps the directory alive for the scenario.
    pub dir: TempDir,
    /// Store rooted in `dir`.
    pub store: ArtifactStore,
}

/// Creates an empty artifact store in a temporary directory.
///
/// # Panics
///
/// Panics if the directory cannot be created or is not valid UTF-8.
pub fn create_temp_store() -> TempStore {
    let dir = TempDir::new()
        .unwrap_or_else(|error| panic!("failed to create temporary directory: {error}"));
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .unwrap_or_else(|path| panic!("temporary directory is not UTF-8: {}", path.display()));
    let store = ArtifactStore::open(&root)
        .unwrap_or_else(|error| panic!("failed to open artifact store: {error}"));
    TempStore { dir, store }
}

/// Wiremock server standing in for the GitHub API, with the runtime that
/// drives it.
pub struct MockGitHub {
    runtime: Runtime,
    server: MockServer,
}

impl MockGitHub {
    /// Starts a runtime and a mock server on it.
    ///
    /// # Panics
    ///
    /// Panics if the Tokio runtime cannot be created.
    pub fn start() -> Self {
        let runtime = Runtime::new()
            .unwrap_or_else(|error| panic!("failed to create Tokio runtime: {error}"));
        let server = runtime.block_on(MockServer::start());
        Self { runtime, server }
    }

    /// Runs a future on the scenario runtime.
    pub fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Base URL to configure gateways with.
    ///
    /// # Panics
    ///
    /// Panics if the server URI is not a valid URL.
    pub fn api_base(&self) -> Url {
        Url::parse(&self.server.uri())
            .unwrap_or_else(|error| panic!("mock server URI invalid: {error}"))
    }

    /// Registers a mock on the server.
    pub fn mount(&self, mock: Mock) {
        self.block_on(mock.mount(&self.server));
    }

    /// Paths of every request received so far, in arrival order.
    pub fn received_paths(&self) -> Vec<String> {
        self.block_on(self.server.received_requests())
            .unwrap_or_default()
            .iter()
            .map(|request| request.url.path().to_owned())
            .collect()
    }
}
