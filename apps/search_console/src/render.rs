//! Plain-text rendering of the view state for the terminal front end.

use shared::{
    domain::{SearchMode, SortMode},
    protocol::{ResultItem, SuggestionItem, NO_COVER},
};

use crate::controller::ViewState;

pub fn render_view(state: &ViewState) -> String {
    let mut lines = Vec::new();
    render_search(state, &mut lines);
    lines.push(String::new());
    render_suggestions(state, &mut lines);
    if state.viewed_book_id().is_some() {
        lines.push(String::new());
        render_book(state, &mut lines);
    }
    lines.join("\n")
}

fn render_search(state: &ViewState, lines: &mut Vec<String>) {
    let sort_mode = state.sort_mode();
    match state.query() {
        Some(query) if query.mode() == SearchMode::Pattern => {
            lines.push(format!("Matches for /{}/", query.text()));
        }
        Some(query) => lines.push(format!(
            "Results for \u{201c}{}\u{201d} (sorted by {})",
            query.text(),
            sort_mode.label()
        )),
        None => lines.push(format!("Results (sorted by {})", sort_mode.label())),
    }

    if state.searching() {
        lines.push("  Searching library\u{2026}".to_string());
    }
    if let Some(err) = state.search_error() {
        lines.push(format!("  {}", err.message()));
    }

    match state.search_outcome() {
        Some(outcome) if !outcome.items.is_empty() => {
            lines.push(format!(
                "  {} shown of {} total",
                outcome.items.len(),
                outcome.total
            ));
            for (position, item) in outcome.items.iter().enumerate() {
                lines.push(result_line(position + 1, item, sort_mode));
            }
        }
        _ if !state.searching() && state.search_error().is_none() => {
            lines.push("  No results yet. Try a query.".to_string());
        }
        _ => {}
    }
}

fn result_line(position: usize, item: &ResultItem, sort_mode: SortMode) -> String {
    let score = match sort_mode {
        SortMode::Relevance => format!("relevance {}", item.display_relevance()),
        SortMode::Centrality => format!("centrality {}", item.display_centrality()),
    };
    let mut line = format!(
        "  {position:>2}. {} \u{2014} {} [{score}]",
        item.display_title(),
        item.display_author()
    );
    if item.display_cover() == NO_COVER {
        line.push_str(" (no cover)");
    }
    if let Some(id) = &item.id {
        line.push_str(&format!(" id={id}"));
    }
    line
}

fn render_suggestions(state: &ViewState, lines: &mut Vec<String>) {
    match state.anchor() {
        Some(anchor) => lines.push(format!("Suggestions (related to book {anchor})")),
        None => lines.push("Suggestions".to_string()),
    }

    if state.suggesting() {
        lines.push("  Loading suggestions\u{2026}".to_string());
        return;
    }
    if let Some(err) = state.suggestion_error() {
        lines.push(format!("  {err}"));
        return;
    }
    let items = state.suggestion_items();
    if items.is_empty() {
        lines.push("  No suggestions available yet.".to_string());
        return;
    }
    for item in items {
        lines.push(suggestion_line(item));
    }
}

fn suggestion_line(item: &SuggestionItem) -> String {
    let mut line = format!(
        "  - {} \u{2014} {}",
        item.display_title(),
        item.display_author()
    );
    if item.affinity_score.is_some() {
        line.push_str(&format!(" [{} views]", item.display_affinity()));
    }
    if let Some(id) = &item.id {
        line.push_str(&format!(" id={id}"));
    }
    line
}

fn render_book(state: &ViewState, lines: &mut Vec<String>) {
    if state.loading_book() {
        lines.push("Book: loading\u{2026}".to_string());
        return;
    }
    if let Some(err) = state.book_error() {
        lines.push(format!("Book: {}", err.message()));
        return;
    }
    let Some(book) = state.book() else {
        return;
    };
    lines.push(format!(
        "Book: {} \u{2014} {}",
        book.display_title(),
        book.display_author()
    ));
    lines.push(format!(
        "  Word count: {}  Centrality: {}",
        book.display_word_count(),
        book.display_centrality()
    ));
    if let Some(metadata) = &book.metadata {
        for (key, value) in metadata {
            match value {
                Some(value) => lines.push(format!("  {key}: {value}")),
                None => lines.push(format!("  {key}: \u{2014}")),
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
