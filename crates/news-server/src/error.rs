//! Server error types and their HTTP mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use news_client::FetchError;
use serde::Serialize;
use thiserror::Error;

/// Errors starting or running the server
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or serving failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Headline source could not be built
    #[error("Client error: {0}")]
    Client(#[from] news_client::Error),
}

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// JSON error body returned to clients
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub error: String,
}

/// A request that could not be answered
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Create an error with a status and message
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    /// HTTP status of the response
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, format!("Failed to fetch news: {}", err.source))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use news_client::{ArticleQuery, Error};

    #[test]
    fn test_fetch_error_maps_to_bad_gateway() {
        let err = FetchError {
            query: ArticleQuery::default(),
            source: Error::Api { status: 401, message: "Your API key is invalid".to_string() },
        };

        let api_error = ApiError::from(err);
        assert_eq!(api_error.status(), StatusCode::BAD_GATEWAY);
        assert!(api_error.message.contains("Your API key is invalid"));
    }

    #[test]
    fn test_server_error_display() {
        let err = ServerError::Config("missing key".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing key");
    }
}
