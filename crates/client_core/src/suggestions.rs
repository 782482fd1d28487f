use std::sync::Arc;

use shared::{
    domain::{BookId, SuggestionOutcome, SuggestionRequest},
    protocol::SuggestionsResponse,
};
use tracing::debug;

use crate::{
    error::TransportError,
    transport::{decode_payload, Operation, Transport},
};

/// "Books related to X". The server decides what an unknown id means,
/// normally an empty list.
#[derive(Clone)]
pub struct SuggestionLoader {
    transport: Arc<dyn Transport>,
}

impl SuggestionLoader {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn suggestions_for(
        &self,
        book_id: &BookId,
        limit: u32,
    ) -> Result<SuggestionOutcome, TransportError> {
        let request = SuggestionRequest::new(book_id.clone())?;
        self.load(&request, limit).await
    }

    pub async fn load(
        &self,
        request: &SuggestionRequest,
        limit: u32,
    ) -> Result<SuggestionOutcome, TransportError> {
        let payload = self
            .transport
            .perform(&Operation::Suggestions {
                book_id: request.source_book_id.clone(),
                limit,
            })
            .await?;
        let response: SuggestionsResponse = decode_payload(payload)?;
        debug!(
            book_id = %request.source_book_id,
            returned = response.results.len(),
            "suggestions loaded"
        );
        Ok(SuggestionOutcome {
            request: request.clone(),
            items: response.results,
        })
    }
}
