//! Line commands accepted by the interactive console.

use shared::domain::{BookId, SortMode};

pub const HELP: &str = "\
commands:
  search <text>       keyword search (alias: s)
  regex <pattern>     pattern search (alias: r)
  sort <mode>         relevance | centrality
  book <id>           open a book and load related suggestions
  refresh             reload suggestions for the current anchor
  show                print the current view
  help                this text
  quit                exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Search(String),
    Pattern(String),
    Sort(SortMode),
    Book(BookId),
    Refresh,
    Show,
    Help,
    Quit,
}

impl ConsoleCommand {
    /// Parses one input line. Blank lines parse to `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            // Blank text is passed through; the controller treats it as a no-op.
            "search" | "s" => Self::Search(rest.to_string()),
            "regex" | "r" => Self::Pattern(rest.to_string()),
            "sort" => Self::Sort(rest.parse::<SortMode>().map_err(|err| err.to_string())?),
            "book" | "b" => {
                if rest.is_empty() {
                    return Err("usage: book <id>".to_string());
                }
                Self::Book(BookId::new(rest))
            }
            "refresh" => Self::Refresh,
            "show" => Self::Show,
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => return Err(format!("unknown command '{other}' (try 'help')")),
        };
        Ok(Some(command))
    }
}
