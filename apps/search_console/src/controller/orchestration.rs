//! Command orchestration from user actions to the backend command queue, and
//! reconciliation of backend outcomes into [`ViewState`].

use std::time::{Duration, Instant};

use client_core::Settings;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use shared::domain::{BookId, QueryRequest, RequestSeq, SearchMode, SortMode, SuggestionRequest};
use tracing::{debug, info, warn};

use crate::{
    backend_bridge::commands::BackendCommand,
    controller::{
        events::{AnchorChange, BackendEvent, Slot, SlotError},
        reducer::{Settle, ViewState},
    },
};

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
) -> Result<(), SlotError> {
    let cmd_name = cmd.name();
    let slot = cmd.slot();
    let seq = cmd.seq();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            debug!(command = cmd_name, %seq, "queued controller->backend command");
            Ok(())
        }
        Err(TrySendError::Full(_)) => Err(SlotError::queue_unavailable(
            slot,
            "Backend command queue is full; please retry",
        )),
        Err(TrySendError::Disconnected(_)) => Err(SlotError::queue_unavailable(
            slot,
            "Backend worker disconnected (possible startup/runtime failure)",
        )),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLimits {
    pub search: u32,
    pub suggestions: u32,
}

impl From<&Settings> for RequestLimits {
    fn from(settings: &Settings) -> Self {
        Self {
            search: settings.search_limit,
            suggestions: settings.suggestion_limit,
        }
    }
}

/// Owns the view state of one search view. All mutation goes through the
/// action methods and [`SearchController::apply_event`]; none of them fail,
/// they only change state.
pub struct SearchController {
    state: ViewState,
    cmd_tx: Sender<BackendCommand>,
    event_rx: Receiver<BackendEvent>,
    limits: RequestLimits,
    default_anchor: Option<BookId>,
}

impl SearchController {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        event_rx: Receiver<BackendEvent>,
        settings: &Settings,
    ) -> Self {
        Self {
            state: ViewState::new(settings.default_sort),
            cmd_tx,
            event_rx,
            limits: RequestLimits::from(settings),
            default_anchor: settings.default_anchor.clone(),
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Loads suggestions for the configured default anchor, if any.
    pub fn open(&mut self) -> Option<RequestSeq> {
        let anchor = self.default_anchor.clone()?;
        self.load_suggestions(anchor)
    }

    pub fn submit_query(&mut self, text: &str) -> Option<RequestSeq> {
        self.submit(SearchMode::Keyword, text)
    }

    pub fn submit_pattern(&mut self, pattern: &str) -> Option<RequestSeq> {
        self.submit(SearchMode::Pattern, pattern)
    }

    fn submit(&mut self, mode: SearchMode, text: &str) -> Option<RequestSeq> {
        let request = match QueryRequest::new(mode, text, self.state.sort_mode()) {
            Ok(request) => request,
            Err(err) => {
                debug!("ignoring submission: {err}");
                return None;
            }
        };
        Some(self.issue_search(request))
    }

    /// Switches ranking. An active keyword query is re-issued with the new
    /// mode; the displayed results stay until that search settles.
    pub fn change_sort_mode(&mut self, sort_mode: SortMode) -> Option<RequestSeq> {
        let request = self.state.set_sort_mode(sort_mode)?;
        Some(self.issue_search(request))
    }

    fn issue_search(&mut self, request: QueryRequest) -> RequestSeq {
        let seq = self.state.begin_search(request.clone());
        info!(
            %seq,
            mode = ?request.mode(),
            sort = request.sort_mode().as_wire(),
            "issuing search"
        );
        let cmd = BackendCommand::Search {
            seq,
            request,
            limit: self.limits.search,
        };
        if let Err(err) = dispatch_backend_command(&self.cmd_tx, cmd) {
            warn!(%seq, "search not dispatched: {}", err.message());
            self.state.settle_search(seq, Err(err));
        }
        seq
    }

    /// Reloads suggestions for the current anchor. No-op without one.
    pub fn refresh_suggestions(&mut self) -> Option<RequestSeq> {
        let anchor = self.state.anchor()?.clone();
        self.load_suggestions(anchor)
    }

    pub fn load_suggestions(&mut self, anchor: BookId) -> Option<RequestSeq> {
        let request = match SuggestionRequest::new(anchor) {
            Ok(request) => request,
            Err(err) => {
                debug!("ignoring suggestion load: {err}");
                return None;
            }
        };
        let seq = self.state.begin_suggestions(request.source_book_id.clone());
        info!(%seq, anchor = %request.source_book_id, "loading suggestions");
        let cmd = BackendCommand::LoadSuggestions {
            seq,
            request,
            limit: self.limits.suggestions,
        };
        if let Err(err) = dispatch_backend_command(&self.cmd_tx, cmd) {
            warn!(%seq, "suggestion load not dispatched: {}", err.message());
            self.state.settle_suggestions(seq, Err(err));
        }
        Some(seq)
    }

    /// Opens a book directly: it becomes the anchor and its record is loaded.
    /// The search slot is not involved.
    pub fn view_book(&mut self, book_id: BookId) -> Option<RequestSeq> {
        if book_id.is_blank() {
            debug!("ignoring view of blank book id");
            return None;
        }
        let book_seq = self.state.begin_book(book_id.clone());
        let cmd = BackendCommand::LoadBook {
            seq: book_seq,
            book_id: book_id.clone(),
        };
        if let Err(err) = dispatch_backend_command(&self.cmd_tx, cmd) {
            warn!(seq = %book_seq, "book load not dispatched: {}", err.message());
            self.state.settle_book(book_seq, Err(err));
        }
        self.load_suggestions(book_id)
    }

    pub fn apply_event(&mut self, event: BackendEvent) {
        let slot = event.slot();
        let seq = event.seq();
        let settle = match event {
            BackendEvent::SearchSettled { seq, result } => {
                let (settle, anchor_change) = self.state.settle_search(seq, result);
                if let Some(change) = anchor_change {
                    self.on_anchor_changed(change);
                }
                settle
            }
            BackendEvent::SuggestionsSettled { seq, result } => {
                self.state.settle_suggestions(seq, result)
            }
            BackendEvent::BookSettled {
                seq,
                book_id,
                result,
            } => {
                debug!(%book_id, "book outcome arrived");
                self.state.settle_book(seq, result)
            }
        };

        match settle {
            Settle::Accepted => info!(slot = slot.label(), %seq, "outcome accepted"),
            Settle::Stale => info!(slot = slot.label(), %seq, "discarding stale outcome"),
        }
    }

    fn on_anchor_changed(&mut self, change: AnchorChange) {
        if let Some(anchor) = self.state.anchor_changed(change) {
            self.load_suggestions(anchor);
        }
    }

    /// Applies every outcome already delivered. Returns how many were applied.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply_event(event);
            applied += 1;
        }
        applied
    }

    /// Blocks up to `timeout` for the next outcome, then drains the rest.
    pub fn wait_for_events(&mut self, timeout: Duration) -> usize {
        match self.event_rx.recv_timeout(timeout) {
            Ok(event) => {
                self.apply_event(event);
                1 + self.process_events()
            }
            Err(RecvTimeoutError::Timeout) => 0,
            Err(RecvTimeoutError::Disconnected) => {
                debug!("backend event channel closed");
                0
            }
        }
    }

    /// Waits until no slot is loading or `timeout` elapses. Returns whether
    /// the view settled. A timeout too large to represent waits without a
    /// deadline.
    pub fn wait_until_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        self.process_events();
        while !self.state.is_idle() {
            let received = match deadline {
                Some(deadline) => self
                    .event_rx
                    .recv_timeout(deadline.saturating_duration_since(Instant::now())),
                None => self
                    .event_rx
                    .recv()
                    .map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(event) => self.apply_event(event),
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("backend event channel closed while requests were in flight");
                    return false;
                }
            }
        }
        true
    }
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
