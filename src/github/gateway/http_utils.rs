//! Shared HTTP helpers for gateway implementations.

use http::header::{ACCEPT, HeaderMap, HeaderValue};

/// Media type that makes the pull request endpoint return a unified diff.
pub(super) const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";

pub(super) fn diff_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(DIFF_MEDIA_TYPE));
    headers
}

pub(super) fn extract_github_message(body: &str) -> Option<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return None;
    };
    value
        .get("message")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}
