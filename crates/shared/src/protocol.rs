use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{deserialize_optional_book_id, BookId};

pub const UNTITLED_BOOK: &str = "Untitled book";
pub const UNKNOWN_AUTHOR: &str = "Unknown author";
pub const NO_COVER: &str = "No Cover";
pub const MISSING_SCORE: &str = "—";

/// One ranked search hit. Every field may be missing upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    #[serde(default, deserialize_with = "deserialize_optional_book_id")]
    pub id: Option<BookId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, rename = "score")]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub centrality_score: Option<f64>,
    #[serde(default, rename = "image_url")]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

impl ResultItem {
    pub fn display_title(&self) -> &str {
        display_or(&self.title, UNTITLED_BOOK)
    }

    pub fn display_author(&self) -> &str {
        display_or(&self.author, UNKNOWN_AUTHOR)
    }

    pub fn display_cover(&self) -> &str {
        display_or(&self.cover_image_url, NO_COVER)
    }

    pub fn display_relevance(&self) -> String {
        format_score(self.relevance_score, 2)
    }

    pub fn display_centrality(&self) -> String {
        format_score(self.centrality_score, 3)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total: u64,
    #[serde(default)]
    pub results: Vec<ResultItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternSearchResponse {
    pub total: u64,
    #[serde(default)]
    pub results: Vec<ResultItem>,
    #[serde(default)]
    pub regex: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionItem {
    #[serde(default, deserialize_with = "deserialize_optional_book_id")]
    pub id: Option<BookId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, rename = "similarity")]
    pub affinity_score: Option<f64>,
    #[serde(default, rename = "image_url")]
    pub cover_image_url: Option<String>,
}

impl SuggestionItem {
    pub fn display_title(&self) -> &str {
        display_or(&self.title, "Untitled")
    }

    pub fn display_author(&self) -> &str {
        display_or(&self.author, UNKNOWN_AUTHOR)
    }

    pub fn display_affinity(&self) -> String {
        format_score(self.affinity_score, 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub book_id: BookId,
    #[serde(default)]
    pub results: Vec<SuggestionItem>,
}

/// Scalar metadata attached to a book record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl std::fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(default, deserialize_with = "deserialize_optional_book_id")]
    pub id: Option<BookId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub word_count: Option<u64>,
    #[serde(default)]
    pub centrality_score: Option<f64>,
    #[serde(default, rename = "image_url")]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub metadata: Option<BTreeMap<String, Option<MetadataValue>>>,
}

impl BookRecord {
    pub fn display_title(&self) -> &str {
        display_or(&self.title, UNTITLED_BOOK)
    }

    pub fn display_author(&self) -> &str {
        display_or(&self.author, UNKNOWN_AUTHOR)
    }

    pub fn display_word_count(&self) -> String {
        self.word_count
            .map(|count| count.to_string())
            .unwrap_or_else(|| MISSING_SCORE.to_string())
    }

    pub fn display_centrality(&self) -> String {
        format_score(self.centrality_score, 3)
    }
}

fn display_or<'a>(value: &'a Option<String>, placeholder: &'a str) -> &'a str {
    match value.as_deref() {
        Some(text) if !text.trim().is_empty() => text,
        _ => placeholder,
    }
}

fn format_score(score: Option<f64>, precision: usize) -> String {
    match score {
        Some(value) if value.is_finite() => format!("{value:.precision$}"),
        _ => MISSING_SCORE.to_string(),
    }
}
