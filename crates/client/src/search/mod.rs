//! Web search collaborator.
//!
//! The enrichment flow needs a ranked list of hits to work on. The only
//! backend is DuckDuckGo's HTML endpoint, which needs no API key.

pub mod duckduckgo;

pub use duckduckgo::{DuckDuckGoClient, DuckDuckGoConfig};

use std::sync::Arc;

use pagesift_core::SearchHit;

/// Errors from a search backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// Blank query.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// HTTP error response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16 },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { SearchError::Timeout } else { SearchError::Network(Arc::new(err)) }
    }
}

/// A source of ranked search hits.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Return at most `max_results` hits in rank order.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>, SearchError>;

    fn name(&self) -> &'static str;
}
