//! View state and its slot transitions.
//!
//! Each slot (search, suggestions, book) tracks its own sequence counter.
//! An outcome is applied only if it carries the sequence number of the
//! request currently in flight for that slot; anything older is dropped on
//! arrival, whatever order the replies come back in.

use shared::{
    domain::{
        BookId, QueryRequest, RequestSeq, SearchMode, SearchOutcome, SortMode, SuggestionOutcome,
    },
    protocol::{BookRecord, ResultItem, SuggestionItem},
};

use crate::controller::events::{AnchorChange, SlotError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    Accepted,
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotStatus {
    Idle,
    Loading,
    Settled,
    Failed,
}

/// Per-slot monotonic counter plus the request still allowed to settle.
#[derive(Debug, Clone, Default)]
pub struct SlotSequence {
    latest_issued: RequestSeq,
    in_flight: Option<RequestSeq>,
}

impl SlotSequence {
    pub fn issue(&mut self) -> RequestSeq {
        self.latest_issued = self.latest_issued.next();
        self.in_flight = Some(self.latest_issued);
        self.latest_issued
    }

    /// Consumes `seq` if it is the authoritative request for this slot.
    pub fn settle(&mut self, seq: RequestSeq) -> Settle {
        if self.in_flight == Some(seq) {
            self.in_flight = None;
            Settle::Accepted
        } else {
            Settle::Stale
        }
    }

    /// Drops whatever is in flight without issuing a replacement.
    pub fn supersede(&mut self) {
        self.latest_issued = self.latest_issued.next();
        self.in_flight = None;
    }

    pub fn latest_issued(&self) -> RequestSeq {
        self.latest_issued
    }

    pub fn in_flight(&self) -> Option<RequestSeq> {
        self.in_flight
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchSlot {
    sequence: SlotSequence,
    query: Option<QueryRequest>,
    outcome: Option<SearchOutcome>,
    error: Option<SlotError>,
}

impl SearchSlot {
    fn begin(&mut self, request: QueryRequest) -> RequestSeq {
        let seq = self.sequence.issue();
        self.query = Some(request);
        self.error = None;
        seq
    }

    /// Returns the anchor change to forward to the suggestion slot when a
    /// successful outcome is accepted.
    fn settle(
        &mut self,
        seq: RequestSeq,
        result: Result<SearchOutcome, SlotError>,
    ) -> (Settle, Option<AnchorChange>) {
        if self.sequence.settle(seq) == Settle::Stale {
            return (Settle::Stale, None);
        }
        match result {
            Ok(outcome) => {
                let anchor = AnchorChange(outcome.anchor());
                self.outcome = Some(outcome);
                self.error = None;
                (Settle::Accepted, Some(anchor))
            }
            Err(err) => {
                self.outcome = None;
                self.error = Some(err);
                (Settle::Accepted, None)
            }
        }
    }

    fn status(&self) -> SlotStatus {
        status_of(&self.sequence, self.error.is_some(), self.outcome.is_some())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SuggestionSlot {
    sequence: SlotSequence,
    anchor: Option<BookId>,
    outcome: Option<SuggestionOutcome>,
    error: Option<SlotError>,
}

impl SuggestionSlot {
    fn begin(&mut self, anchor: BookId) -> RequestSeq {
        let seq = self.sequence.issue();
        self.anchor = Some(anchor);
        self.error = None;
        seq
    }

    /// Decides whether a new anchor needs a fresh load. Returns the anchor to
    /// load, if any.
    fn on_anchor_changed(&mut self, change: AnchorChange) -> Option<BookId> {
        match change.0 {
            None => {
                self.sequence.supersede();
                self.anchor = None;
                self.outcome = None;
                self.error = None;
                None
            }
            Some(anchor) => {
                let already_loaded = self.anchor.as_ref() == Some(&anchor)
                    && self.error.is_none()
                    && (self.outcome.is_some() || self.sequence.in_flight().is_some());
                if already_loaded {
                    None
                } else {
                    Some(anchor)
                }
            }
        }
    }

    fn settle(
        &mut self,
        seq: RequestSeq,
        result: Result<SuggestionOutcome, SlotError>,
    ) -> Settle {
        if self.sequence.settle(seq) == Settle::Stale {
            return Settle::Stale;
        }
        match result {
            Ok(outcome) => {
                self.outcome = Some(outcome);
                self.error = None;
            }
            Err(err) => {
                self.outcome = None;
                self.error = Some(err);
            }
        }
        Settle::Accepted
    }

    fn status(&self) -> SlotStatus {
        status_of(&self.sequence, self.error.is_some(), self.outcome.is_some())
    }
}

#[derive(Debug, Clone, Default)]
pub struct BookSlot {
    sequence: SlotSequence,
    book_id: Option<BookId>,
    record: Option<BookRecord>,
    error: Option<SlotError>,
}

impl BookSlot {
    fn begin(&mut self, book_id: BookId) -> RequestSeq {
        let seq = self.sequence.issue();
        if self.book_id.as_ref() != Some(&book_id) {
            self.record = None;
        }
        self.book_id = Some(book_id);
        self.error = None;
        seq
    }

    fn settle(&mut self, seq: RequestSeq, result: Result<BookRecord, SlotError>) -> Settle {
        if self.sequence.settle(seq) == Settle::Stale {
            return Settle::Stale;
        }
        match result {
            Ok(record) => {
                self.record = Some(record);
                self.error = None;
            }
            Err(err) => {
                self.record = None;
                self.error = Some(err);
            }
        }
        Settle::Accepted
    }

    fn status(&self) -> SlotStatus {
        status_of(&self.sequence, self.error.is_some(), self.record.is_some())
    }
}

fn status_of(sequence: &SlotSequence, failed: bool, settled: bool) -> SlotStatus {
    if sequence.in_flight().is_some() {
        SlotStatus::Loading
    } else if failed {
        SlotStatus::Failed
    } else if settled {
        SlotStatus::Settled
    } else {
        SlotStatus::Idle
    }
}

/// Everything the view shows. Only the controller mutates it.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    sort_mode: SortMode,
    search: SearchSlot,
    suggestions: SuggestionSlot,
    book: BookSlot,
}

impl ViewState {
    pub fn new(sort_mode: SortMode) -> Self {
        Self {
            sort_mode,
            ..Self::default()
        }
    }

    pub(crate) fn begin_search(&mut self, request: QueryRequest) -> RequestSeq {
        self.search.begin(request)
    }

    /// Remembers the new sort mode. Returns the request to re-issue when a
    /// keyword query is active; pattern searches take no sort parameter.
    pub(crate) fn set_sort_mode(&mut self, sort_mode: SortMode) -> Option<QueryRequest> {
        if self.sort_mode == sort_mode {
            return None;
        }
        self.sort_mode = sort_mode;
        self.search
            .query
            .as_ref()
            .filter(|query| query.mode() == SearchMode::Keyword)
            .map(|query| query.with_sort_mode(sort_mode))
    }

    pub(crate) fn settle_search(
        &mut self,
        seq: RequestSeq,
        result: Result<SearchOutcome, SlotError>,
    ) -> (Settle, Option<AnchorChange>) {
        self.search.settle(seq, result)
    }

    pub(crate) fn begin_suggestions(&mut self, anchor: BookId) -> RequestSeq {
        self.suggestions.begin(anchor)
    }

    pub(crate) fn anchor_changed(&mut self, change: AnchorChange) -> Option<BookId> {
        self.suggestions.on_anchor_changed(change)
    }

    pub(crate) fn settle_suggestions(
        &mut self,
        seq: RequestSeq,
        result: Result<SuggestionOutcome, SlotError>,
    ) -> Settle {
        self.suggestions.settle(seq, result)
    }

    pub(crate) fn begin_book(&mut self, book_id: BookId) -> RequestSeq {
        self.book.begin(book_id)
    }

    pub(crate) fn settle_book(
        &mut self,
        seq: RequestSeq,
        result: Result<BookRecord, SlotError>,
    ) -> Settle {
        self.book.settle(seq, result)
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    /// Last issued query, whether or not its outcome has arrived.
    pub fn query(&self) -> Option<&QueryRequest> {
        self.search.query.as_ref()
    }

    pub fn query_text(&self) -> Option<&str> {
        self.query().map(QueryRequest::text)
    }

    pub fn search_outcome(&self) -> Option<&SearchOutcome> {
        self.search.outcome.as_ref()
    }

    pub fn search_items(&self) -> &[ResultItem] {
        self.search
            .outcome
            .as_ref()
            .map(|outcome| outcome.items.as_slice())
            .unwrap_or_default()
    }

    pub fn searching(&self) -> bool {
        self.search.sequence.in_flight().is_some()
    }

    pub fn search_error(&self) -> Option<&SlotError> {
        self.search.error.as_ref()
    }

    pub fn search_status(&self) -> SlotStatus {
        self.search.status()
    }

    pub fn anchor(&self) -> Option<&BookId> {
        self.suggestions.anchor.as_ref()
    }

    pub fn suggestion_outcome(&self) -> Option<&SuggestionOutcome> {
        self.suggestions.outcome.as_ref()
    }

    pub fn suggestion_items(&self) -> &[SuggestionItem] {
        self.suggestions
            .outcome
            .as_ref()
            .map(|outcome| outcome.items.as_slice())
            .unwrap_or_default()
    }

    pub fn suggesting(&self) -> bool {
        self.suggestions.sequence.in_flight().is_some()
    }

    pub fn suggestion_error(&self) -> Option<&SlotError> {
        self.suggestions.error.as_ref()
    }

    pub fn suggestion_status(&self) -> SlotStatus {
        self.suggestions.status()
    }

    pub fn viewed_book_id(&self) -> Option<&BookId> {
        self.book.book_id.as_ref()
    }

    pub fn book(&self) -> Option<&BookRecord> {
        self.book.record.as_ref()
    }

    pub fn loading_book(&self) -> bool {
        self.book.sequence.in_flight().is_some()
    }

    pub fn book_error(&self) -> Option<&SlotError> {
        self.book.error.as_ref()
    }

    pub fn book_status(&self) -> SlotStatus {
        self.book.status()
    }

    pub fn is_idle(&self) -> bool {
        !self.searching() && !self.suggesting() && !self.loading_book()
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
