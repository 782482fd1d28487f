use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::ValidationError,
    protocol::{ResultItem, SuggestionItem},
};

/// Server-owned book identifier. The server is authoritative on what it means.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub String);

impl BookId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Accepts ids serialized either as JSON strings or as integers.
pub(crate) fn deserialize_optional_book_id<'de, D>(
    deserializer: D,
) -> Result<Option<BookId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Integer(i64),
    }

    Ok(
        Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
            RawId::Text(text) => BookId(text),
            RawId::Integer(number) => BookId(number.to_string()),
        }),
    )
}

/// Per-slot request sequence number. Strictly increasing within one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestSeq(pub u64);

impl RequestSeq {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Keyword,
    Pattern,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Relevance,
    Centrality,
}

impl SortMode {
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Centrality => "centrality",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Relevance => "BM25 relevance",
            Self::Centrality => "closeness centrality",
        }
    }
}

impl std::str::FromStr for SortMode {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "relevance" | "bm25" => Ok(Self::Relevance),
            "centrality" | "closeness" => Ok(Self::Centrality),
            other => Err(ValidationError::UnknownSortMode(other.to_string())),
        }
    }
}

/// One issued search. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryRequest {
    mode: SearchMode,
    text: String,
    sort_mode: SortMode,
}

impl QueryRequest {
    pub fn keyword(text: impl Into<String>, sort_mode: SortMode) -> Result<Self, ValidationError> {
        Self::new(SearchMode::Keyword, text, sort_mode)
    }

    pub fn pattern(
        pattern: impl Into<String>,
        sort_mode: SortMode,
    ) -> Result<Self, ValidationError> {
        Self::new(SearchMode::Pattern, pattern, sort_mode)
    }

    pub fn new(
        mode: SearchMode,
        text: impl Into<String>,
        sort_mode: SortMode,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(match mode {
                SearchMode::Keyword => ValidationError::BlankQuery,
                SearchMode::Pattern => ValidationError::BlankPattern,
            });
        }
        Ok(Self {
            mode,
            text,
            sort_mode,
        })
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    /// Same text and mode, different ranking.
    pub fn with_sort_mode(&self, sort_mode: SortMode) -> Self {
        Self {
            sort_mode,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub source_book_id: BookId,
}

impl SuggestionRequest {
    pub fn new(source_book_id: BookId) -> Result<Self, ValidationError> {
        if source_book_id.is_blank() {
            return Err(ValidationError::BlankBookId);
        }
        Ok(Self { source_book_id })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub request: QueryRequest,
    pub items: Vec<ResultItem>,
    pub total: u64,
    /// Pattern echoed back by the pattern-search operation.
    pub echoed_pattern: Option<String>,
}

impl SearchOutcome {
    /// Id of the first result, which drives suggestion loading.
    pub fn anchor(&self) -> Option<BookId> {
        self.items.first().and_then(|item| item.id.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionOutcome {
    pub request: SuggestionRequest,
    pub items: Vec<SuggestionItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_queries_are_rejected_per_mode() {
        assert_eq!(
            QueryRequest::keyword("  ", SortMode::Relevance),
            Err(ValidationError::BlankQuery)
        );
        assert_eq!(
            QueryRequest::pattern("\t", SortMode::Relevance),
            Err(ValidationError::BlankPattern)
        );
        assert!(SuggestionRequest::new(BookId::new(" ")).is_err());
    }

    #[test]
    fn sort_mode_parses_wire_names_and_aliases() {
        assert_eq!("relevance".parse::<SortMode>(), Ok(SortMode::Relevance));
        assert_eq!(" BM25 ".parse::<SortMode>(), Ok(SortMode::Relevance));
        assert_eq!("closeness".parse::<SortMode>(), Ok(SortMode::Centrality));
        assert_eq!(
            "title".parse::<SortMode>(),
            Err(ValidationError::UnknownSortMode("title".into()))
        );
    }

    #[test]
    fn outcome_anchor_is_first_item_id() {
        let request = QueryRequest::keyword("castle", SortMode::Relevance).expect("query");
        let mut outcome = SearchOutcome {
            request,
            items: vec![ResultItem::default()],
            total: 1,
            echoed_pattern: None,
        };
        assert_eq!(outcome.anchor(), None);
        outcome.items[0].id = Some(BookId::new("7"));
        assert_eq!(outcome.anchor(), Some(BookId::new("7")));
    }
}
