//! HTTP boundary to the book search API.

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{BookId, SortMode},
    error::ApiErrorBody,
};
use tracing::{debug, warn};
use url::Url;

use crate::error::TransportError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";

/// Logical operations exposed by the search API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Search {
        query: String,
        limit: u32,
        sort_mode: SortMode,
    },
    PatternSearch {
        pattern: String,
        limit: u32,
    },
    BookLookup {
        book_id: BookId,
    },
    Suggestions {
        book_id: BookId,
        limit: u32,
    },
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Search { .. } => "search",
            Self::PatternSearch { .. } => "search_by_pattern",
            Self::BookLookup { .. } => "book_lookup",
            Self::Suggestions { .. } => "suggestions_for",
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs one round trip. Non-success responses come back as
    /// [`TransportError::ServerRejected`], never as a panic.
    async fn perform(&self, operation: &Operation) -> Result<Value, TransportError>;
}

pub fn decode_payload<T: DeserializeOwned>(payload: Value) -> Result<T, TransportError> {
    serde_json::from_value(payload).map_err(TransportError::decode)
}

pub struct HttpTransport {
    http: Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, TransportError> {
        let invalid = |message: String| TransportError::InvalidBaseUrl {
            url: base_url.to_string(),
            message,
        };
        let base_url = Url::parse(base_url.trim()).map_err(|err| invalid(err.to_string()))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(invalid("expected an http(s) url".to_string()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, operation: &Operation) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|_| TransportError::InvalidBaseUrl {
                        url: self.base_url.to_string(),
                        message: "url cannot carry a path".to_string(),
                    })?;
            segments.pop_if_empty();
            match operation {
                Operation::Search { .. } => {
                    segments.push("search");
                }
                Operation::PatternSearch { .. } => {
                    segments.extend(["search", "advanced"]);
                }
                Operation::BookLookup { book_id } => {
                    segments.extend(["books", book_id.as_str()]);
                }
                Operation::Suggestions { .. } => {
                    segments.push("suggestions");
                }
            }
        }

        match operation {
            Operation::Search {
                query,
                limit,
                sort_mode,
            } => {
                url.query_pairs_mut()
                    .append_pair("query", query)
                    .append_pair("size", &limit.to_string())
                    .append_pair("sort_by", sort_mode.as_wire());
            }
            Operation::PatternSearch { pattern, limit } => {
                url.query_pairs_mut()
                    .append_pair("regex", pattern)
                    .append_pair("size", &limit.to_string());
            }
            Operation::BookLookup { .. } => {}
            Operation::Suggestions { book_id, limit } => {
                url.query_pairs_mut()
                    .append_pair("book_id", book_id.as_str())
                    .append_pair("limit", &limit.to_string());
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(&self, operation: &Operation) -> Result<Value, TransportError> {
        let url = self.endpoint(operation)?;
        debug!(operation = operation.name(), %url, "dispatching search api request");

        let response = self
            .http
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| {
                warn!(operation = operation.name(), "search api unreachable: {err}");
                TransportError::network(err)
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(TransportError::network)?;

        if !status.is_success() {
            let message = ApiErrorBody::message_from_body(&body);
            warn!(
                operation = operation.name(),
                status = status.as_u16(),
                "search api rejected request: {message}"
            );
            return Err(TransportError::ServerRejected {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&body).map_err(TransportError::decode)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
