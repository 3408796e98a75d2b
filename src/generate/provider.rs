//! Seam between the generation stages and a language model.

use async_trait::async_trait;

use crate::github::error::IntakeError;

/// Chat-style completion endpoint.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Sends a system instruction and a user prompt, returning the
    /// assistant's reply text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, IntakeError>;
}
