use std::sync::Arc;

use shared::{domain::BookId, error::ValidationError, protocol::BookRecord};
use tracing::debug;

use crate::{
    error::TransportError,
    transport::{decode_payload, Operation, Transport},
};

#[derive(Clone)]
pub struct BookLoader {
    transport: Arc<dyn Transport>,
}

impl BookLoader {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    pub async fn book(&self, book_id: &BookId) -> Result<BookRecord, TransportError> {
        if book_id.is_blank() {
            return Err(ValidationError::BlankBookId.into());
        }
        let payload = self
            .transport
            .perform(&Operation::BookLookup {
                book_id: book_id.clone(),
            })
            .await?;
        let record: BookRecord = decode_payload(payload)?;
        debug!(%book_id, "book record loaded");
        Ok(record)
    }
}
