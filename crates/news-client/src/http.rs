//! HTTP client for headline services
//!
//! This module provides the JSON-over-HTTP client shared by the NewsAPI and
//! proxy sources, its configuration, and the retry helpers used to ride out
//! transient upstream failures.

use crate::{Error, Result};
use reqwest::Client as ReqwestClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for [`NewsHttpClient`]
#[derive(Debug, Clone)]
pub struct NewsClientConfig {
    /// Base service URL (e.g., "https://newsapi.org")
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Retries after the first attempt for transient failures
    pub max_retries: usize,
}

impl Default for NewsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://newsapi.org".to_string(),
            timeout: Duration::from_secs(15),
            user_agent: format!("Newsdeck/{}", env!("CARGO_PKG_VERSION")),
            max_retries: 2,
        }
    }
}

impl NewsClientConfig {
    /// Create a new config with a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Default::default() }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the number of retries
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }
}

// =============================================================================
// Error Response Format
// =============================================================================

/// Error body shapes returned by headline services.
///
/// NewsAPI sends `{status, code, message}`; the `/news` proxy sends `{error}`.
#[derive(Debug, Clone, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn api_error(status: u16, body: &str) -> Error {
    let parsed = serde_json::from_str::<ErrorBody>(body).unwrap_or_default();
    let message = parsed
        .error
        .or(parsed.message)
        .unwrap_or_else(|| format!("HTTP {}: {}", status, body.trim()));
    Error::Api { status, message }
}

// =============================================================================
// Client Implementation
// =============================================================================

/// JSON client for headline endpoints
///
/// # Examples
/// ```
/// use news_client::http::{NewsClientConfig, NewsHttpClient};
///
/// async fn example() -> news_client::Result<()> {
///     let client = NewsHttpClient::new(NewsClientConfig::new("http://localhost:3000"))?;
///     let body: serde_json::Value = client.get_json("/news", &[("category", "sports")]).await?;
///     println!("{}", body);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct NewsHttpClient {
    client: ReqwestClient,
    config: NewsClientConfig,
}

impl NewsHttpClient {
    /// Create a new client
    pub fn new(config: NewsClientConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// GET `path` with query parameters and decode the JSON body.
    ///
    /// Transient failures are retried up to `max_retries` times.
    pub async fn get_json<T>(&self, path: &str, params: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        network_retry(self.config.max_retries, || self.get_once(path, params)).await
    }

    async fn get_once<T>(&self, path: &str, params: &[(&str, &str)]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);
        tracing::debug!(url = %url, "GET");

        let response = self.client.get(&url).query(params).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status.as_u16(), &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Get the client configuration
    pub fn config(&self) -> &NewsClientConfig {
        &self.config
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

// =============================================================================
// Retry Logic with Exponential Backoff
// =============================================================================

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: usize,
    /// Initial delay between retries
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Backoff multiplier (e.g., 2.0 for exponential backoff)
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new(max_retries: usize) -> Self {
        Self { max_retries, ..Default::default() }
    }

    /// Set the initial delay
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    fn calculate_delay(&self, attempt: usize) -> Duration {
        let delay_ms =
            self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);

        Duration::from_millis(delay_ms as u64).min(self.max_delay)
    }
}

/// Retry an async operation with a configurable retry policy
///
/// # Examples
/// ```
/// use news_client::http::{retry, RetryConfig};
/// use news_client::Error;
///
/// async fn example() -> Result<String, Error> {
///     retry(RetryConfig::new(3), |err: &Error| err.is_network_error(), || async {
///         Ok("success".to_string())
///     })
///     .await
/// }
/// ```
pub async fn retry<F, Fut, T, E>(
    config: RetryConfig,
    should_retry: impl Fn(&E) -> bool,
    mut operation: F,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut attempts = 0;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(err) => {
                attempts += 1;

                if !should_retry(&err) || attempts > config.max_retries {
                    return Err(err);
                }

                let delay = config.calculate_delay(attempts - 1);
                tracing::debug!(attempt = attempts, ?delay, "Retrying after transient failure");
                sleep(delay).await;
            }
        }
    }
}

/// Retry only errors classified by [`Error::is_network_error`]
pub async fn network_retry<F, Fut, T>(max_retries: usize, operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    retry(RetryConfig::new(max_retries), |err: &Error| err.is_network_error(), operation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_client_config_default() {
        let config = NewsClientConfig::default();
        assert_eq!(config.base_url, "https://newsapi.org");
        assert_eq!(config.max_retries, 2);
        assert!(config.user_agent.starts_with("Newsdeck/"));
    }

    #[test]
    fn test_client_config_builder() {
        let config = NewsClientConfig::new("http://localhost:3000")
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("TestAgent/1.0")
            .with_max_retries(0);

        let client = NewsHttpClient::new(config).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
        assert_eq!(client.config().timeout, Duration::from_secs(5));
        assert_eq!(client.config().user_agent, "TestAgent/1.0");
        assert_eq!(client.config().max_retries, 0);
    }

    #[test]
    fn test_api_error_prefers_error_field() {
        let err = api_error(502, r#"{"error":"upstream down"}"#);
        assert!(matches!(err, Error::Api { status: 502, ref message } if message == "upstream down"));

        let err = api_error(401, r#"{"status":"error","code":"apiKeyInvalid","message":"bad key"}"#);
        assert!(matches!(err, Error::Api { status: 401, ref message } if message == "bad key"));

        let err = api_error(500, "oops");
        assert!(matches!(err, Error::Api { status: 500, ref message } if message == "HTTP 500: oops"));
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            max_delay: Duration::from_millis(250),
            ..RetryConfig::new(10).with_initial_delay(Duration::from_millis(100))
        };

        assert_eq!(config.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(config.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(config.calculate_delay(5), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_retry_success_after_retries() {
        let config = RetryConfig::new(3).with_initial_delay(Duration::from_millis(10));
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let result = retry(
            config,
            |_: &String| true,
            || {
                let c = counter_clone.clone();
                async move {
                    let count = c.fetch_add(1, Ordering::SeqCst);
                    if count < 2 {
                        Err("temporary error".to_string())
                    } else {
                        Ok("success")
                    }
                }
            },
        )
        .await;

        assert_eq!(result, Ok("success"));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_exhausted() {
        let config = RetryConfig::new(2).with_initial_delay(Duration::from_millis(10));
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let result = retry(
            config,
            |_: &String| true,
            || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<String, _>("always fails".to_string())
                }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3); // Initial + 2 retries
    }

    #[tokio::test]
    async fn test_network_retry_skips_client_errors() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();

        let result: Result<()> = network_retry(3, || {
            let c = counter_clone.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(Error::Api { status: 401, message: "unauthorized".to_string() })
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }
}
