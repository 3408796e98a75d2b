//! Helpers for shaping model input and decoding model output.

use serde_json::Value;

use crate::github::error::IntakeError;

/// Largest number of diff characters sent with a fact prompt.
pub const MAX_DIFF_CHARS: usize = 12_000;

/// Truncates `diff` to at most `max_chars` characters.
///
/// Returns the excerpt and whether anything was cut.
///
/// # Example
///
/// ```
/// use prism::generate::truncate_diff;
///
/// assert_eq!(truncate_diff("abcdef", 4), ("abcd".to_owned(), true));
/// assert_eq!(truncate_diff("abc", 4), ("abc".to_owned(), false));
/// ```
#[must_use]
pub fn truncate_diff(diff: &str, max_chars: usize) -> (String, bool) {
    let mut chars = diff.chars();
    let excerpt: String = chars.by_ref().take(max_chars).collect();
    let truncated = chars.next().is_some();
    (excerpt, truncated)
}

/// Parses a model reply as a JSON document.
///
/// Replies wrapped in a Markdown code fence (with or without a `json`
/// language tag) are unwrapped first.
///
/// # Errors
///
/// Returns [`IntakeError::Provider`] when the reply is not valid JSON.
pub fn parse_json_reply(reply: &str) -> Result<Value, IntakeError> {
    let body = strip_code_fence(reply.trim());
    serde_json::from_str(body).map_err(|error| IntakeError::Provider {
        message: format!("model reply is not valid JSON: {error}"),
    })
}

fn strip_code_fence(reply: &str) -> &str {
    let Some(opened) = reply.strip_prefix("```") else {
        return reply;
    };
    let Some(closed) = opened.strip_suffix("```") else {
        return reply;
    };
    // The first line of the fence may carry a language tag.
    match closed.split_once('\n') {
        Some((tag, rest)) if !tag.trim_start().starts_with(['{', '[']) => rest.trim(),
        _ => closed.trim(),
    }
}
