//! OpenAI-compatible chat-completions provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::github::error::IntakeError;

use super::provider::LlmProvider;

/// Default chat-completions base URL.
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model identifier.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
/// Default request timeout in seconds.
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

/// Connection settings for [`OpenAiProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenAiConfig {
    /// Base API URL (e.g., `https://api.openai.com/v1`).
    pub base_url: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// API key used for bearer authentication.
    pub api_key: String,
    /// HTTP timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Creates settings for the default endpoint and model.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_LLM_BASE_URL.to_owned(),
            model: DEFAULT_LLM_MODEL.to_owned(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_LLM_TIMEOUT_SECS),
        }
    }
}

/// Provider that posts to `{base_url}/chat/completions`.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    /// Creates a provider and its HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Configuration`] when the API key is blank or
    /// the HTTP client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, IntakeError> {
        if config.api_key.trim().is_empty() {
            return Err(IntakeError::Configuration {
                message: concat!(
                    "LLM API key is required (use --llm-api-key, ",
                    "PRISM_LLM_API_KEY, or OPENAI_API_KEY)"
                )
                .to_owned(),
            });
        }
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|error| IntakeError::Configuration {
                message: format!("failed to configure LLM HTTP client: {error}"),
            })?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, IntakeError> {
        let payload = ChatCompletionsRequest {
            model: self.config.model.as_str(),
            messages: vec![
                ChatCompletionsMessage {
                    role: "system",
                    content: system,
                },
                ChatCompletionsMessage {
                    role: "user",
                    content: prompt,
                },
            ],
        };
        debug!(model = %self.config.model, prompt_chars = prompt.len(), "sending completion");

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.config.api_key.as_str())
            .json(&payload)
            .send()
            .await
            .map_err(|error| IntakeError::Provider {
                message: format!("LLM request transport failed: {error}"),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.map_or_else(
                |_| "(failed to read error response body)".to_owned(),
                |content| truncate_for_message(content.as_str(), 160),
            );
            return Err(IntakeError::Provider {
                message: format!("LLM request failed with status {}: {body}", status.as_u16()),
            });
        }

        let response_payload: ChatCompletionsResponse =
            response.json().await.map_err(|error| IntakeError::Provider {
                message: format!("LLM response JSON decoding failed: {error}"),
            })?;

        response_payload
            .choices
            .first()
            .and_then(|choice| parse_content_value(&choice.message.content))
            .map(str::trim)
            .filter(|content| !content.is_empty())
            .map(ToOwned::to_owned)
            .ok_or_else(|| IntakeError::Provider {
                message: "LLM response did not contain assistant text".to_owned(),
            })
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionsMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionsMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: ChatContent,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<ChatContentPart>),
}

#[derive(Debug, Deserialize)]
struct ChatContentPart {
    text: Option<String>,
    content: Option<String>,
}

fn parse_content_value(content: &ChatContent) -> Option<&str> {
    match content {
        ChatContent::Text(text) => Some(text.as_str()),
        ChatContent::Parts(parts) => parts
            .iter()
            .find_map(|part| part.text.as_deref().or(part.content.as_deref())),
    }
}

fn truncate_for_message(message: &str, max_chars: usize) -> String {
    let mut output: String = message.chars().take(max_chars).collect();
    if message.chars().nth(max_chars).is_some() {
        output.push_str("...");
    }
    output
}
