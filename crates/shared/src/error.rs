use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Message shown when a failed response does not say what went wrong.
pub const FALLBACK_ERROR_MESSAGE: &str = "Unexpected API error";

/// Error body returned by the search API on non-success responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl ApiErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(Value::String(detail.into())),
        }
    }

    /// Human readable reason, falling back to [`FALLBACK_ERROR_MESSAGE`].
    ///
    /// `detail` is usually a string. Request validation failures carry a list
    /// of `{ "msg": ... }` objects instead; their messages are joined.
    pub fn message(&self) -> String {
        match &self.detail {
            Some(Value::String(text)) if !text.trim().is_empty() => text.clone(),
            Some(Value::Array(entries)) => {
                let messages: Vec<&str> = entries
                    .iter()
                    .filter_map(|entry| entry.get("msg").and_then(Value::as_str))
                    .collect();
                if messages.is_empty() {
                    FALLBACK_ERROR_MESSAGE.to_string()
                } else {
                    messages.join("; ")
                }
            }
            _ => FALLBACK_ERROR_MESSAGE.to_string(),
        }
    }

    /// Parses a raw response body, tolerating bodies that are not JSON.
    pub fn message_from_body(body: &[u8]) -> String {
        serde_json::from_slice::<ApiErrorBody>(body)
            .map(|parsed| parsed.message())
            .unwrap_or_else(|_| FALLBACK_ERROR_MESSAGE.to_string())
    }
}

/// Input rejected before anything is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("query text is empty")]
    BlankQuery,
    #[error("search pattern is empty")]
    BlankPattern,
    #[error("book id is empty")]
    BlankBookId,
    #[error("unknown sort mode '{0}' (expected relevance or centrality)")]
    UnknownSortMode(String),
}
