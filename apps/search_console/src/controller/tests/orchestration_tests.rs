use super::*;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use shared::{
    domain::{SearchOutcome, SuggestionOutcome},
    protocol::{ResultItem, SuggestionItem},
};

use crate::controller::{events::SlotErrorCategory, reducer::SlotStatus};

struct Harness {
    controller: SearchController,
    cmd_rx: Receiver<BackendCommand>,
    event_tx: Sender<BackendEvent>,
}

fn harness_with(settings: Settings) -> Harness {
    let (cmd_tx, cmd_rx) = bounded(settings.command_queue_capacity);
    let (event_tx, event_rx) = unbounded();
    Harness {
        controller: SearchController::new(cmd_tx, event_rx, &settings),
        cmd_rx,
        event_tx,
    }
}

fn harness() -> Harness {
    harness_with(Settings::default())
}

impl Harness {
    fn next_command(&self) -> BackendCommand {
        self.cmd_rx.try_recv().expect("command queued")
    }

    fn assert_no_command(&self) {
        assert!(self.cmd_rx.try_recv().is_err(), "unexpected command queued");
    }

    fn deliver(&mut self, event: BackendEvent) {
        self.event_tx.send(event).expect("event send");
        assert_eq!(self.controller.process_events(), 1);
    }
}

fn item(id: &str, title: &str) -> ResultItem {
    ResultItem {
        id: Some(BookId::new(id)),
        title: Some(title.to_string()),
        ..ResultItem::default()
    }
}

fn search_ok(seq: RequestSeq, request: QueryRequest, items: Vec<ResultItem>) -> BackendEvent {
    BackendEvent::SearchSettled {
        seq,
        result: Ok(SearchOutcome {
            request,
            total: items.len() as u64,
            items,
            echoed_pattern: None,
        }),
    }
}

fn suggestions_ok(seq: RequestSeq, anchor: &str, items: &[(&str, &str)]) -> BackendEvent {
    BackendEvent::SuggestionsSettled {
        seq,
        result: Ok(SuggestionOutcome {
            request: SuggestionRequest {
                source_book_id: BookId::new(anchor),
            },
            items: items
                .iter()
                .map(|(id, title)| SuggestionItem {
                    id: Some(BookId::new(*id)),
                    title: Some(title.to_string()),
                    ..SuggestionItem::default()
                })
                .collect(),
        }),
    }
}

fn expect_search(cmd: BackendCommand) -> (RequestSeq, QueryRequest, u32) {
    match cmd {
        BackendCommand::Search {
            seq,
            request,
            limit,
        } => (seq, request, limit),
        other => panic!("expected search command, got {other:?}"),
    }
}

fn expect_suggestions(cmd: BackendCommand) -> (RequestSeq, BookId, u32) {
    match cmd {
        BackendCommand::LoadSuggestions {
            seq,
            request,
            limit,
        } => (seq, request.source_book_id, limit),
        other => panic!("expected suggestion command, got {other:?}"),
    }
}

#[test]
fn blank_submission_issues_nothing_and_leaves_state_unchanged() {
    let mut h = harness();
    assert_eq!(h.controller.submit_query(""), None);
    assert_eq!(h.controller.submit_query("   \t"), None);
    assert_eq!(h.controller.submit_pattern(" "), None);
    h.assert_no_command();

    let state = h.controller.state();
    assert!(state.query().is_none());
    assert!(state.search_error().is_none());
    assert!(state.is_idle());
}

#[test]
fn submit_query_dispatches_with_configured_limit_and_sort() {
    let mut h = harness_with(Settings {
        search_limit: 25,
        default_sort: SortMode::Centrality,
        ..Settings::default()
    });
    let seq = h.controller.submit_query("whale").expect("issued");

    let (cmd_seq, request, limit) = expect_search(h.next_command());
    assert_eq!(cmd_seq, seq);
    assert_eq!(request.text(), "whale");
    assert_eq!(request.mode(), SearchMode::Keyword);
    assert_eq!(request.sort_mode(), SortMode::Centrality);
    assert_eq!(limit, 25);
    assert!(h.controller.state().searching());
}

#[test]
fn newer_search_wins_when_older_reply_arrives_last() {
    let mut h = harness();
    h.controller.submit_query("whale");
    h.controller.submit_query("whales");
    let (first, first_req, _) = expect_search(h.next_command());
    let (second, second_req, _) = expect_search(h.next_command());

    h.deliver(search_ok(second, second_req, vec![item("2", "Whales")]));
    let (_, anchor, _) = expect_suggestions(h.next_command());
    assert_eq!(anchor, BookId::new("2"));

    h.deliver(search_ok(first, first_req, vec![item("1", "Whale")]));
    h.assert_no_command();

    let state = h.controller.state();
    assert_eq!(state.search_items()[0].title.as_deref(), Some("Whales"));
    assert!(!state.searching());
    assert_eq!(state.suggestion_status(), SlotStatus::Loading);
    assert_eq!(state.anchor(), Some(&BookId::new("2")));
}

#[test]
fn newer_search_wins_when_older_reply_arrives_first() {
    let mut h = harness();
    h.controller.submit_query("whale");
    h.controller.submit_query("whales");
    let (first, first_req, _) = expect_search(h.next_command());
    let (second, second_req, _) = expect_search(h.next_command());

    h.deliver(search_ok(first, first_req, vec![item("1", "Whale")]));
    assert!(h.controller.state().searching());
    assert!(h.controller.state().search_outcome().is_none());
    h.assert_no_command();

    h.deliver(search_ok(second, second_req, vec![item("2", "Whales")]));
    assert_eq!(
        h.controller.state().search_items()[0].title.as_deref(),
        Some("Whales")
    );
}

#[test]
fn suggestion_failure_leaves_search_outcome_untouched() {
    let mut h = harness();
    h.controller.submit_query("castle");
    let (seq, request, _) = expect_search(h.next_command());
    h.deliver(search_ok(seq, request, vec![item("7", "Castle Tales")]));
    let (suggest_seq, _, _) = expect_suggestions(h.next_command());

    h.deliver(BackendEvent::SuggestionsSettled {
        seq: suggest_seq,
        result: Err(SlotError::from_transport(
            Slot::Suggestions,
            &client_core::TransportError::network("connection refused"),
        )),
    });

    let state = h.controller.state();
    assert_eq!(state.search_items().len(), 1);
    assert!(state.search_error().is_none());
    let err = state.suggestion_error().expect("suggestion error");
    assert_eq!(err.category(), SlotErrorCategory::Transport);
    assert!(state.suggestion_items().is_empty());
    assert!(!state.suggesting());
}

#[test]
fn anchor_42_loads_suggestions_once() {
    let mut h = harness_with(Settings {
        suggestion_limit: 3,
        ..Settings::default()
    });
    h.controller.submit_query("hitchhiker");
    let (seq, request, _) = expect_search(h.next_command());
    h.deliver(search_ok(
        seq,
        request,
        vec![item("42", "Guide"), item("43", "Restaurant")],
    ));

    let (suggest_seq, anchor, limit) = expect_suggestions(h.next_command());
    assert_eq!(anchor, BookId::new("42"));
    assert_eq!(limit, 3);
    h.assert_no_command();
    h.deliver(suggestions_ok(suggest_seq, "42", &[("44", "Life")]));

    // Another search led by the same book does not reload its suggestions.
    h.controller.submit_query("guide");
    let (seq, request, _) = expect_search(h.next_command());
    h.deliver(search_ok(seq, request, vec![item("42", "Guide")]));
    h.assert_no_command();
    assert_eq!(h.controller.state().suggestion_items().len(), 1);
}

#[test]
fn anchor_is_not_reloaded_while_its_suggestions_are_in_flight() {
    let mut h = harness();
    h.controller.load_suggestions(BookId::new("42"));
    expect_suggestions(h.next_command());

    h.controller.submit_query("guide");
    let (seq, request, _) = expect_search(h.next_command());
    h.deliver(search_ok(seq, request, vec![item("42", "Guide")]));
    h.assert_no_command();
}

#[test]
fn empty_search_clears_suggestions() {
    let mut h = harness();
    h.controller.load_suggestions(BookId::new("5"));
    let (suggest_seq, _, _) = expect_suggestions(h.next_command());

    h.controller.submit_query("nothing matches");
    let (seq, request, _) = expect_search(h.next_command());
    h.deliver(search_ok(seq, request, Vec::new()));
    h.assert_no_command();

    // The superseded load settles after the anchor was cleared.
    h.deliver(suggestions_ok(suggest_seq, "5", &[("6", "Six")]));
    let state = h.controller.state();
    assert!(state.anchor().is_none());
    assert!(state.suggestion_items().is_empty());
    assert!(state.is_idle());
}

#[test]
fn sort_change_resubmits_dragon_and_keeps_old_results_until_settled() {
    let mut h = harness();
    h.controller.submit_query("dragon");
    let (seq, request, _) = expect_search(h.next_command());
    h.deliver(search_ok(seq, request, vec![item("1", "Relevant Dragon")]));
    let (suggest_seq, _, _) = expect_suggestions(h.next_command());
    h.deliver(suggestions_ok(suggest_seq, "1", &[]));

    let resubmitted = h
        .controller
        .change_sort_mode(SortMode::Centrality)
        .expect("resubmitted");
    let (seq, request, _) = expect_search(h.next_command());
    assert_eq!(seq, resubmitted);
    assert_eq!(request.text(), "dragon");
    assert_eq!(request.sort_mode(), SortMode::Centrality);

    let state = h.controller.state();
    assert_eq!(state.sort_mode(), SortMode::Centrality);
    assert_eq!(
        state.search_items()[0].title.as_deref(),
        Some("Relevant Dragon")
    );
    assert!(state.searching());

    h.deliver(search_ok(seq, request, vec![item("9", "Central Dragon")]));
    assert_eq!(
        h.controller.state().search_items()[0].title.as_deref(),
        Some("Central Dragon")
    );
}

#[test]
fn sort_change_without_query_only_remembers_mode() {
    let mut h = harness();
    assert_eq!(h.controller.change_sort_mode(SortMode::Centrality), None);
    h.assert_no_command();
    assert_eq!(h.controller.state().sort_mode(), SortMode::Centrality);

    // The next query picks it up.
    h.controller.submit_query("moon");
    let (_, request, _) = expect_search(h.next_command());
    assert_eq!(request.sort_mode(), SortMode::Centrality);
}

#[test]
fn sort_change_does_not_reissue_pattern_search() {
    let mut h = harness();
    h.controller.submit_pattern("^Moby");
    let (_, request, _) = expect_search(h.next_command());
    assert_eq!(request.mode(), SearchMode::Pattern);

    assert_eq!(h.controller.change_sort_mode(SortMode::Centrality), None);
    h.assert_no_command();
}

#[test]
fn castle_scenario_settles_both_slots() {
    let mut h = harness();
    h.controller.submit_query("castle");
    let (seq, request, _) = expect_search(h.next_command());
    h.deliver(BackendEvent::SearchSettled {
        seq,
        result: Ok(SearchOutcome {
            request,
            items: vec![item("7", "Castle Tales"), item("9", "Keep")],
            total: 2,
            echoed_pattern: None,
        }),
    });

    let (suggest_seq, anchor, _) = expect_suggestions(h.next_command());
    assert_eq!(anchor, BookId::new("7"));
    h.deliver(suggestions_ok(suggest_seq, "7", &[("12", "Moat")]));
    h.assert_no_command();

    let state = h.controller.state();
    let titles: Vec<_> = state
        .search_items()
        .iter()
        .map(|item| (item.id.clone(), item.display_title().to_string()))
        .collect();
    assert_eq!(
        titles,
        vec![
            (Some(BookId::new("7")), "Castle Tales".to_string()),
            (Some(BookId::new("9")), "Keep".to_string()),
        ]
    );
    assert_eq!(state.search_outcome().map(|o| o.total), Some(2));
    assert_eq!(state.suggestion_items().len(), 1);
    assert_eq!(state.suggestion_items()[0].id, Some(BookId::new("12")));
    assert_eq!(state.suggestion_items()[0].display_title(), "Moat");
    assert!(state.search_error().is_none());
    assert!(state.suggestion_error().is_none());
    assert!(!state.searching());
    assert!(!state.suggesting());
}

#[test]
fn view_book_loads_record_and_suggestions_without_touching_search() {
    let mut h = harness();
    h.controller.submit_query("whale");
    let (search_seq, search_req, _) = expect_search(h.next_command());

    h.controller.view_book(BookId::new("11")).expect("issued");
    match h.next_command() {
        BackendCommand::LoadBook { book_id, .. } => assert_eq!(book_id, BookId::new("11")),
        other => panic!("expected book command, got {other:?}"),
    }
    let (_, anchor, _) = expect_suggestions(h.next_command());
    assert_eq!(anchor, BookId::new("11"));

    let state = h.controller.state();
    assert!(state.searching());
    assert_eq!(state.query_text(), Some("whale"));
    assert!(state.loading_book());

    // The search still settles normally afterwards.
    h.deliver(search_ok(search_seq, search_req, vec![item("11", "Moby")]));
    assert_eq!(h.controller.state().search_items().len(), 1);
}

#[test]
fn blank_book_id_and_missing_anchor_are_no_ops() {
    let mut h = harness();
    assert_eq!(h.controller.view_book(BookId::new("  ")), None);
    assert_eq!(h.controller.refresh_suggestions(), None);
    assert_eq!(h.controller.load_suggestions(BookId::new("")), None);
    h.assert_no_command();
}

#[test]
fn refresh_reloads_current_anchor() {
    let mut h = harness();
    h.controller.load_suggestions(BookId::new("3"));
    let (first, _, _) = expect_suggestions(h.next_command());
    h.deliver(suggestions_ok(first, "3", &[("4", "Four")]));

    let second = h.controller.refresh_suggestions().expect("issued");
    let (seq, anchor, _) = expect_suggestions(h.next_command());
    assert_eq!(seq, second);
    assert!(second > first);
    assert_eq!(anchor, BookId::new("3"));
}

#[test]
fn open_loads_default_anchor() {
    let mut h = harness_with(Settings {
        default_anchor: Some(BookId::new("0")),
        ..Settings::default()
    });
    h.controller.open().expect("issued");
    let (_, anchor, _) = expect_suggestions(h.next_command());
    assert_eq!(anchor, BookId::new("0"));

    let mut h = harness();
    assert_eq!(h.controller.open(), None);
    h.assert_no_command();
}

#[test]
fn full_queue_fails_the_slot_instead_of_leaving_it_loading() {
    let mut h = harness_with(Settings {
        command_queue_capacity: 1,
        ..Settings::default()
    });
    h.controller.submit_query("first");
    h.controller.submit_query("second");

    let state = h.controller.state();
    assert!(!state.searching());
    let err = state.search_error().expect("queue error");
    assert_eq!(err.message(), "Backend command queue is full; please retry");
    assert_eq!(err.category(), SlotErrorCategory::Transport);
}

#[test]
fn disconnected_worker_fails_each_slot() {
    let mut h = harness();
    drop(h.cmd_rx);
    let (replacement_tx, replacement_rx) = bounded(1);
    drop(replacement_tx);
    h.cmd_rx = replacement_rx;

    h.controller.submit_query("whale");
    h.controller.view_book(BookId::new("8"));

    let state = h.controller.state();
    assert!(state.is_idle());
    for err in [
        state.search_error(),
        state.suggestion_error(),
        state.book_error(),
    ] {
        let err = err.expect("slot error");
        assert!(err.message().contains("disconnected"));
    }
}

#[test]
fn wait_until_idle_times_out_without_replies() {
    let mut h = harness();
    assert!(h.controller.wait_until_idle(Duration::from_millis(5)));

    h.controller.submit_query("slow");
    assert!(!h.controller.wait_until_idle(Duration::from_millis(20)));
    assert!(h.controller.state().searching());
}

#[test]
fn wait_until_idle_accepts_unrepresentable_timeout() {
    let mut h = harness();
    assert!(h.controller.wait_until_idle(Duration::from_secs(u64::MAX)));

    h.controller.submit_query("x");
    let (seq, request, _) = expect_search(h.next_command());
    h.event_tx
        .send(search_ok(seq, request, Vec::new()))
        .expect("event send");
    assert!(h.controller.wait_until_idle(Duration::from_secs(u64::MAX)));
    assert!(!h.controller.state().searching());
}
