//! News Client Library
//!
//! This crate fetches top headlines for a (category, country) query. It
//! provides the article data model, the [`source::ArticleSource`] transports
//! (synthetic, NewsAPI, and the `/news` proxy), and the validating
//! [`fetcher::ArticleFetcher`] the browsing state is built on.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod fetcher;
pub mod http;
pub mod source;
pub mod types;

pub use fetcher::{ArticleFetcher, FetchError};
pub use http::{NewsClientConfig, NewsHttpClient, RetryConfig};
pub use source::{ArticleSource, NewsApiSource, ProxySource, SyntheticSource};
pub use types::{Article, ArticleQuery, ArticleSet, Category, Country, SourceRef};

/// Result type for news client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for news client operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// API error with status code and message
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from server
        message: String,
    },
}

impl Error {
    /// Check if this is a transient network-related error that may be retried
    ///
    /// Network failure statuses: 408, 425, 429, 500, 502, 503, 504, 522, 524
    pub fn is_network_error(&self) -> bool {
        match self {
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            Error::Api { status, .. } => {
                matches!(status, 408 | 425 | 429 | 500 | 502 | 503 | 504 | 522 | 524)
            }
            Error::Json(_) | Error::InvalidInput(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_types() {
        let err = Error::InvalidInput("test".to_string());
        assert!(err.to_string().contains("Invalid input"));
    }

    #[test]
    fn test_api_error_network_classification() {
        let unavailable = Error::Api { status: 503, message: "down".to_string() };
        assert!(unavailable.is_network_error());

        let unauthorized = Error::Api { status: 401, message: "bad key".to_string() };
        assert!(!unauthorized.is_network_error());
        assert_eq!(unauthorized.to_string(), "API error (401): bad key");
    }
}
