//! Error types exposed by the GitHub collection layer.

use thiserror::Error;

/// Errors surfaced while validating input, talking to GitHub or an LLM
/// provider, or persisting collected artifacts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IntakeError {
    /// No pipeline stage was named on the command line.
    #[error("a stage is required (collect-index, collect-detail, collect-diff, generate-facts, generate-narratives, run-all)")]
    MissingStage,

    /// The named stage is not one prism knows about.
    #[error("unknown stage: {stage}")]
    UnknownStage {
        /// The positional argument that failed to parse.
        stage: String,
    },

    /// A repository slug could not be parsed.
    #[error("repository must be given as owner/repo: {0}")]
    InvalidRepository(String),

    /// The configured API base URL could not be parsed.
    #[error("API base URL is invalid: {0}")]
    InvalidUrl(String),

    /// The pull request number is not a valid integer.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,

    /// The authentication token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// GitHub returned a non-authentication API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// The GraphQL endpoint answered with an `errors` array.
    #[error("GitHub GraphQL error: {message}")]
    GraphQl {
        /// Joined error messages from the response.
        message: String,
    },

    /// Networking failed while calling a remote service.
    #[error("network error: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// Rate limit exceeded - the API returned 403/429 with a rate limit message.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Error message from GitHub.
        message: String,
    },

    /// The LLM provider failed or returned an unusable reply.
    #[error("LLM provider error: {message}")]
    Provider {
        /// Details about the provider failure.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },

    /// Reading or writing the artifact store failed.
    #[error("storage error: {message}")]
    Storage {
        /// Error detail from the entity store.
        message: String,
    },

    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Invalid pagination parameters.
    #[error("invalid pagination: {message}")]
    InvalidPagination {
        /// Description of the invalid parameter.
        message: String,
    },

    /// A stage could not run because its inputs are missing.
    #[error("{message}")]
    Validation {
        /// Description of the missing input.
        message: String,
    },
}

impl From<crate::store::StoreError> for IntakeError {
    fn from(error: crate::store::StoreError) -> Self {
        Self::Storage {
            message: error.to_string(),
        }
    }
}
