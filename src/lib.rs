//! Prism library crate: a resumable pull request collection pipeline.
//!
//! The library pages through GitHub's pull request search for one author
//! across a set of repositories, writes a local index, enriches every indexed
//! pull request with its detail document and unified diff, and turns the
//! collected material into fact cards and STAR/CARE narratives with an LLM.
//! Each stage consults the file-backed [`ArtifactStore`] before doing work,
//! so an interrupted run resumes without re-fetching what is already on disk.

pub mod collector;
pub mod config;
pub mod generate;
pub mod github;
pub mod store;
pub mod telemetry;

pub use collector::{DetailCollector, DiffCollector, IndexCollector, PaginatedFetcher};
pub use config::PrismConfig;
pub use generate::{FactGenerator, LlmProvider, NarrativeGenerator, OpenAiProvider};
pub use github::{IntakeError, PullRequestId, PullRequestIndexEntry, RepositorySlug};
pub use store::{ArtifactStore, StoreError};
pub use telemetry::{NoopTelemetrySink, StderrJsonlTelemetrySink, TelemetryEvent, TelemetrySink};
