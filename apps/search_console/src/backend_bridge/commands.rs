//! Backend commands queued from the controller to the backend worker.

use shared::domain::{BookId, QueryRequest, RequestSeq, SuggestionRequest};

use crate::controller::events::Slot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Search {
        seq: RequestSeq,
        request: QueryRequest,
        limit: u32,
    },
    LoadSuggestions {
        seq: RequestSeq,
        request: SuggestionRequest,
        limit: u32,
    },
    LoadBook {
        seq: RequestSeq,
        book_id: BookId,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Search { .. } => "search",
            Self::LoadSuggestions { .. } => "load_suggestions",
            Self::LoadBook { .. } => "load_book",
        }
    }

    pub fn slot(&self) -> Slot {
        match self {
            Self::Search { .. } => Slot::Search,
            Self::LoadSuggestions { .. } => Slot::Suggestions,
            Self::LoadBook { .. } => Slot::Book,
        }
    }

    pub fn seq(&self) -> RequestSeq {
        match self {
            Self::Search { seq, .. }
            | Self::LoadSuggestions { seq, .. }
            | Self::LoadBook { seq, .. } => *seq,
        }
    }
}
