//! Shared state for route handlers

use news_client::ArticleFetcher;

/// State handed to every handler
///
/// Cloned per request; the fetcher shares its source behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Validating fetcher over the configured headline source
    pub fetcher: ArticleFetcher,
}

impl AppState {
    /// Create a new AppState
    pub fn new(fetcher: ArticleFetcher) -> Self {
        Self { fetcher }
    }
}
