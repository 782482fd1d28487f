use std::sync::Arc;

use shared::{
    domain::{QueryRequest, SearchMode, SearchOutcome, SortMode},
    protocol::{PatternSearchResponse, SearchResponse},
};
use tracing::debug;

use crate::{
    error::TransportError,
    transport::{decode_payload, Operation, Transport},
};

/// Primary search: keyword queries ranked by the server, or server-side
/// pattern matching.
#[derive(Clone)]
pub struct SearchExecutor {
    transport: Arc<dyn Transport>,
}

impl SearchExecutor {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Keyword search. `sort_mode` is forwarded to the server as-is; results
    /// are never re-ranked locally.
    pub async fn search(
        &self,
        text: &str,
        sort_mode: SortMode,
        limit: u32,
    ) -> Result<SearchOutcome, TransportError> {
        let request = QueryRequest::keyword(text, sort_mode)?;
        self.execute(&request, limit).await
    }

    /// Pattern search. The pattern is not validated here; a malformed pattern
    /// comes back as the server's own rejection message.
    pub async fn search_by_pattern(
        &self,
        pattern: &str,
        limit: u32,
    ) -> Result<SearchOutcome, TransportError> {
        let request = QueryRequest::pattern(pattern, SortMode::default())?;
        self.execute(&request, limit).await
    }

    pub async fn execute(
        &self,
        request: &QueryRequest,
        limit: u32,
    ) -> Result<SearchOutcome, TransportError> {
        match request.mode() {
            SearchMode::Keyword => {
                let payload = self
                    .transport
                    .perform(&Operation::Search {
                        query: request.text().to_string(),
                        limit,
                        sort_mode: request.sort_mode(),
                    })
                    .await?;
                let response: SearchResponse = decode_payload(payload)?;
                debug!(
                    total = response.total,
                    returned = response.results.len(),
                    "keyword search completed"
                );
                Ok(SearchOutcome {
                    request: request.clone(),
                    items: response.results,
                    total: response.total,
                    echoed_pattern: None,
                })
            }
            SearchMode::Pattern => {
                let payload = self
                    .transport
                    .perform(&Operation::PatternSearch {
                        pattern: request.text().to_string(),
                        limit,
                    })
                    .await?;
                let response: PatternSearchResponse = decode_payload(payload)?;
                debug!(
                    total = response.total,
                    returned = response.results.len(),
                    "pattern search completed"
                );
                Ok(SearchOutcome {
                    request: request.clone(),
                    items: response.results,
                    total: response.total,
                    echoed_pattern: response.regex,
                })
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/search_tests.rs"]
mod tests;
