//! Shared test utilities for CLI tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use camino::Utf8PathBuf;
use prism::github::models::PullRequestSearchNode;
use prism::github::models::test_support::{detail, search_node};
use prism::github::{
    PageInfo, PullRequestDetail, PullRequestGateway, PullRequestId, SearchGateway, SearchPage,
    SearchQuery,
};
use prism::telemetry::{TelemetryEvent, TelemetrySink};
use prism::{ArtifactStore, IntakeError, LlmProvider, PrismConfig};
use tempfile::TempDir;

/// Temporary data directory with an open store and matching configuration.
pub struct Workspace {
    /// Keeps the directory alive for the test.
    pub temp_dir: TempDir,
    /// Store rooted in `temp_dir`.
    pub store: ArtifactStore,
    /// Configuration for `alice` in `octo/widgets` and `octo/gadgets`.
    pub config: PrismConfig,
}

impl Workspace {
    /// Creates a workspace searching `repos`.
    pub fn new(repos: &str) -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let root = Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf())
            .expect("temp path should be UTF-8");
        let store = ArtifactStore::open(&root).expect("store should open");
        let config = PrismConfig {
            repos: Some(repos.to_owned()),
            author: Some("alice".to_owned()),
            data_dir: root.to_string(),
            ..Default::default()
        };
        Self {
            temp_dir,
            store,
            config,
        }
    }
}

/// Search gateway answering one final page per repository.
#[derive(Default)]
pub struct StubSearchGateway {
    numbers: BTreeMap<String, Vec<u64>>,
    failing_repository: Option<String>,
}

impl StubSearchGateway {
    /// Adds the pull request numbers returned for `repository`.
    #[must_use]
    pub fn with_repository(mut self, repository: &str, numbers: &[u64]) -> Self {
        self.numbers.insert(repository.to_owned(), numbers.to_vec());
        self
    }

    /// Makes searches of `repository` fail with a network error.
    #[must_use]
    pub fn failing_for(mut self, repository: &str) -> Self {
        self.failing_repository = Some(repository.to_owned());
        self
    }
}

#[async_trait]
impl SearchGateway for StubSearchGateway {
    async fn search_pull_requests(
        &self,
        query: &SearchQuery,
    ) -> Result<SearchPage<PullRequestSearchNode>, IntakeError> {
        let repository = query
            .predicate()
            .split_whitespace()
            .find_map(|token| token.strip_prefix("repo:"))
            .unwrap_or_default();
        if self.failing_repository.as_deref() == Some(repository) {
            return Err(IntakeError::Network {
                message: "connection reset".to_owned(),
            });
        }
        let numbers = self.numbers.get(repository).cloned().unwrap_or_default();
        Ok(SearchPage {
            total_count: u64::try_from(numbers.len()).expect("count fits"),
            nodes: numbers.into_iter().map(search_node).collect(),
            page_info: PageInfo::last(),
        })
    }
}

/// Pull request gateway that records every request it serves.
#[derive(Default)]
pub struct StubPullRequestGateway {
    /// Identities requested, as `detail:o/r#n` or `diff:o/r#n`.
    pub requests: Mutex<Vec<String>>,
    /// Pull request number whose diff request fails.
    pub failing_diff: Option<u64>,
}

impl StubPullRequestGateway {
    /// Requests served so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .expect("requests mutex should be available")
            .clone()
    }

    fn record(&self, kind: &str, id: &PullRequestId) {
        self.requests
            .lock()
            .expect("requests mutex should be available")
            .push(format!("{kind}:{id}"));
    }
}

#[async_trait]
impl PullRequestGateway for StubPullRequestGateway {
    async fn pull_request_detail(
        &self,
        id: &PullRequestId,
    ) -> Result<PullRequestDetail, IntakeError> {
        self.record("detail", id);
        Ok(detail(id.number().get()))
    }

    async fn pull_request_diff(&self, id: &PullRequestId) -> Result<String, IntakeError> {
        self.record("diff", id);
        if self.failing_diff == Some(id.number().get()) {
            return Err(IntakeError::Api {
                message: "Not Found".to_owned(),
            });
        }
        Ok(format!("diff --git a/{0} b/{0}\n", id.number()))
    }
}

/// Provider answering every prompt with the same JSON document.
pub struct StubProvider {
    /// Reply text.
    pub reply: String,
    /// Number of completions served.
    pub calls: Mutex<usize>,
}

impl Default for StubProvider {
    fn default() -> Self {
        Self {
            reply: r#"{"summary": "stub", "narratives": [{"title": "one"}, {"title": "two"}]}"#
                .to_owned(),
            calls: Mutex::new(0),
        }
    }
}

impl StubProvider {
    /// Completions served so far.
    pub fn calls(&self) -> usize {
        *self.calls.lock().expect("calls mutex should be available")
    }
}

#[async_trait]
impl LlmProvider for StubProvider {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, IntakeError> {
        *self.calls.lock().expect("calls mutex should be available") += 1;
        Ok(self.reply.clone())
    }
}

/// Telemetry sink that keeps every event.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl RecordingSink {
    /// Drains the recorded events.
    pub fn take(&self) -> Vec<TelemetryEvent> {
        self.events
            .lock()
            .expect("events mutex should be available")
            .drain(..)
            .collect()
    }
}

impl TelemetrySink for RecordingSink {
    fn record(&self, event: TelemetryEvent) {
        self.events
            .lock()
            .expect("events mutex should be available")
            .push(event);
    }
}

/// Runs a future to completion on a fresh runtime.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Runtime::new()
        .expect("runtime should start")
        .block_on(future)
}
