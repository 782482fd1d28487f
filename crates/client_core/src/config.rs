use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use shared::domain::{BookId, SortMode};
use thiserror::Error;
use tracing::{debug, warn};

use crate::transport::DEFAULT_API_BASE_URL;

pub const DEFAULT_SETTINGS_FILE: &str = "search_console.toml";

const SEARCH_LIMIT_RANGE: (u32, u32) = (1, 50);
const SUGGESTION_LIMIT_RANGE: (u32, u32) = (1, 20);

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api_base_url: String,
    pub search_limit: u32,
    pub suggestion_limit: u32,
    pub default_sort: SortMode,
    /// Anchor loaded when a view opens, before any search ("0" asks the
    /// server for popular books).
    pub default_anchor: Option<BookId>,
    pub command_queue_capacity: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            search_limit: 10,
            suggestion_limit: 5,
            default_sort: SortMode::Relevance,
            default_anchor: None,
            command_queue_capacity: 64,
        }
    }
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Loads settings from `path` (or [`DEFAULT_SETTINGS_FILE`] when absent), then
/// applies environment overrides.
///
/// A missing default file is not an error; a missing explicit file is.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, SettingsError> {
    let mut settings = match path {
        Some(path) => read_settings_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_SETTINGS_FILE);
            if default_path.exists() {
                read_settings_file(default_path)?
            } else {
                Settings::default()
            }
        }
    };

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings.normalized())
}

fn read_settings_file(path: &Path) -> Result<Settings, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let settings = toml::from_str::<Settings>(&raw).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded settings file");
    Ok(settings)
}

pub fn apply_env_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SEARCHBOOK_API_BASE_URL") {
        settings.api_base_url = v;
    }
    if let Some(v) = lookup("APP__API_BASE_URL") {
        settings.api_base_url = v;
    }

    if let Some(v) = lookup("APP__SEARCH_LIMIT") {
        match v.parse::<u32>() {
            Ok(parsed) => settings.search_limit = parsed,
            Err(_) => warn!("ignoring non-numeric APP__SEARCH_LIMIT={v}"),
        }
    }
    if let Some(v) = lookup("APP__SUGGESTION_LIMIT") {
        match v.parse::<u32>() {
            Ok(parsed) => settings.suggestion_limit = parsed,
            Err(_) => warn!("ignoring non-numeric APP__SUGGESTION_LIMIT={v}"),
        }
    }

    if let Some(v) = lookup("APP__DEFAULT_SORT") {
        match v.parse::<SortMode>() {
            Ok(parsed) => settings.default_sort = parsed,
            Err(err) => warn!("ignoring APP__DEFAULT_SORT: {err}"),
        }
    }

    if let Some(v) = lookup("APP__DEFAULT_ANCHOR") {
        settings.default_anchor = if v.trim().is_empty() {
            None
        } else {
            Some(BookId::new(v.trim()))
        };
    }
}

impl Settings {
    /// Clamps limits to what the search API accepts and trims the base url.
    pub fn normalized(mut self) -> Self {
        self.api_base_url = self.api_base_url.trim().to_string();
        if self.api_base_url.is_empty() {
            self.api_base_url = DEFAULT_API_BASE_URL.to_string();
        }
        self.search_limit = self
            .search_limit
            .clamp(SEARCH_LIMIT_RANGE.0, SEARCH_LIMIT_RANGE.1);
        self.suggestion_limit = self
            .suggestion_limit
            .clamp(SUGGESTION_LIMIT_RANGE.0, SUGGESTION_LIMIT_RANGE.1);
        self.command_queue_capacity = self.command_queue_capacity.max(1);
        if self
            .default_anchor
            .as_ref()
            .is_some_and(|anchor| anchor.is_blank())
        {
            self.default_anchor = None;
        }
        self
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
