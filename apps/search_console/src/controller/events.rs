//! Backend outcomes flowing back to the controller, and slot error modeling.

use client_core::{ErrorKind, TransportError};
use shared::{
    domain::{BookId, RequestSeq, SearchOutcome, SuggestionOutcome},
    protocol::BookRecord,
};

/// Terminal result of one backend command, tagged with the sequence number
/// the controller issued it under.
#[derive(Debug, Clone)]
pub enum BackendEvent {
    SearchSettled {
        seq: RequestSeq,
        result: Result<SearchOutcome, SlotError>,
    },
    SuggestionsSettled {
        seq: RequestSeq,
        result: Result<SuggestionOutcome, SlotError>,
    },
    BookSettled {
        seq: RequestSeq,
        book_id: BookId,
        result: Result<BookRecord, SlotError>,
    },
}

impl BackendEvent {
    pub fn slot(&self) -> Slot {
        match self {
            Self::SearchSettled { .. } => Slot::Search,
            Self::SuggestionsSettled { .. } => Slot::Suggestions,
            Self::BookSettled { .. } => Slot::Book,
        }
    }

    pub fn seq(&self) -> RequestSeq {
        match self {
            Self::SearchSettled { seq, .. }
            | Self::SuggestionsSettled { seq, .. }
            | Self::BookSettled { seq, .. } => *seq,
        }
    }
}

/// Emitted by the search slot when an accepted outcome names a new anchor;
/// consumed by the suggestion slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorChange(pub Option<BookId>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Search,
    Suggestions,
    Book,
}

impl Slot {
    pub fn label(self) -> &'static str {
        match self {
            Self::Search => "Search",
            Self::Suggestions => "Suggestions",
            Self::Book => "Book",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotErrorCategory {
    Validation,
    Transport,
    ServerRejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotError {
    category: SlotErrorCategory,
    slot: Slot,
    message: String,
}

impl SlotError {
    pub fn from_transport(slot: Slot, err: &TransportError) -> Self {
        let category = match err.kind() {
            ErrorKind::ValidationRejected => SlotErrorCategory::Validation,
            ErrorKind::TransportFailure => SlotErrorCategory::Transport,
            ErrorKind::ServerRejected => SlotErrorCategory::ServerRejected,
        };
        Self {
            category,
            slot,
            message: err.to_string(),
        }
    }

    /// The command never left the controller (queue full or worker gone).
    pub fn queue_unavailable(slot: Slot, reason: impl Into<String>) -> Self {
        Self {
            category: SlotErrorCategory::Transport,
            slot,
            message: reason.into(),
        }
    }

    pub fn category(&self) -> SlotErrorCategory {
        self.category
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for SlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} error: {}", self.slot.label(), self.message)
    }
}
