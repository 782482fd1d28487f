use std::sync::Arc;

pub mod books;
pub mod config;
pub mod error;
pub mod search;
pub mod suggestions;
pub mod transport;

pub use books::BookLoader;
pub use config::{load_settings, Settings, SettingsError};
pub use error::{ErrorKind, TransportError};
pub use search::SearchExecutor;
pub use suggestions::SuggestionLoader;
pub use transport::{HttpTransport, Operation, Transport};

/// The three API wrappers over one shared transport.
#[derive(Clone)]
pub struct SearchClient {
    pub search: SearchExecutor,
    pub suggestions: SuggestionLoader,
    pub books: BookLoader,
}

impl SearchClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            search: SearchExecutor::new(Arc::clone(&transport)),
            suggestions: SuggestionLoader::new(Arc::clone(&transport)),
            books: BookLoader::new(transport),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(&settings.api_base_url)?;
        Ok(Self::new(Arc::new(transport)))
    }
}

#[cfg(test)]
#[path = "tests/fake_transport.rs"]
pub(crate) mod fake_transport;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
