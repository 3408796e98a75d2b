//! LLM-backed generation stages.
//!
//! Fact generation turns each collected pull request into a fact card;
//! narrative generation folds every fact card into STAR and CARE narratives.
//! Both stages talk to the model through [`LlmProvider`] and persist through
//! the artifact store, so they resume the same way the collectors do.

mod facts;
mod narratives;
mod openai;
mod prompts;
mod provider;
mod reply;

pub use facts::FactGenerator;
pub use narratives::{NarrativeGenerator, NarrativeProgress, NarrativeSet};
pub use openai::{
    DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, DEFAULT_LLM_TIMEOUT_SECS, OpenAiConfig, OpenAiProvider,
};
pub use prompts::PromptRenderer;
pub use provider::LlmProvider;
pub use reply::{MAX_DIFF_CHARS, parse_json_reply, truncate_diff};

#[cfg(test)]
pub use provider::MockLlmProvider;
