//! Headline transports
//!
//! An [`ArticleSource`] turns a validated (category, country) query into raw
//! articles. [`SyntheticSource`] generates them locally, [`NewsApiSource`]
//! calls the NewsAPI `top-headlines` endpoint, and [`ProxySource`] calls a
//! same-origin `GET /news` endpoint such as the one served by `news-server`.

use crate::http::{NewsClientConfig, NewsHttpClient};
use crate::types::{Article, Category, Country, SourceRef};
use crate::{Error, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;

/// Transport producing raw headlines for a query
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Fetch top headlines for a category and country
    async fn fetch_headlines(&self, category: Category, country: &Country)
        -> Result<Vec<Article>>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<S: ArticleSource + ?Sized> ArticleSource for Arc<S> {
    async fn fetch_headlines(
        &self,
        category: Category,
        country: &Country,
    ) -> Result<Vec<Article>> {
        (**self).fetch_headlines(category, country).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

// =============================================================================
// Synthetic Source
// =============================================================================

/// Deterministic local generator, used offline and in tests
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    article_count: usize,
    base_time: Option<DateTime<Utc>>,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self { article_count: 10, base_time: None }
    }
}

impl SyntheticSource {
    /// Create a generator producing ten articles per query
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of articles per query
    pub fn with_article_count(mut self, count: usize) -> Self {
        self.article_count = count;
        self
    }

    /// Pin the publication clock so output is fully reproducible
    pub fn with_base_time(mut self, time: DateTime<Utc>) -> Self {
        self.base_time = Some(time);
        self
    }

    /// Generate the articles for a query
    pub fn generate(&self, category: Category, country: &Country) -> Vec<Article> {
        let now = self.base_time.unwrap_or_else(Utc::now);
        let display = category.display_name();

        (1..=self.article_count)
            .map(|i| Article {
                source: SourceRef {
                    id: Some(format!("source-{}", i)),
                    name: format!("{} News {}", display, i),
                },
                author: Some(format!("Author {}", i)),
                title: format!("{} News Article {}", display, i),
                description: Some(format!("A sample {} story for readers in {}.", category, country)),
                url: format!("https://example.com/{}/{}/{}", country, category, i),
                url_to_image: format!(
                    "https://picsum.photos/id/{}/600/400",
                    i * 10 + category.index()
                ),
                published_at: now - Duration::hours(i as i64),
                content: Some(format!("Sample body text for {} news.", category)),
                category: Some(category),
            })
            .collect()
    }
}

#[async_trait]
impl ArticleSource for SyntheticSource {
    async fn fetch_headlines(
        &self,
        category: Category,
        country: &Country,
    ) -> Result<Vec<Article>> {
        Ok(self.generate(category, country))
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

// =============================================================================
// NewsAPI Source
// =============================================================================

/// `top-headlines` response body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopHeadlines {
    status: String,
    #[serde(default)]
    total_results: Option<u64>,
    #[serde(default)]
    articles: Vec<Article>,
    #[serde(default)]
    message: Option<String>,
}

/// NewsAPI `top-headlines` client
#[derive(Debug, Clone)]
pub struct NewsApiSource {
    client: NewsHttpClient,
    api_key: String,
}

impl NewsApiSource {
    /// Create a source against the default NewsAPI host
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(NewsClientConfig::default(), api_key)
    }

    /// Create a source with a custom client configuration
    pub fn with_config(config: NewsClientConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::InvalidInput("NewsAPI key must not be empty".to_string()));
        }
        Ok(Self { client: NewsHttpClient::new(config)?, api_key })
    }
}

#[async_trait]
impl ArticleSource for NewsApiSource {
    async fn fetch_headlines(
        &self,
        category: Category,
        country: &Country,
    ) -> Result<Vec<Article>> {
        let params = [
            ("category", category.as_str()),
            ("country", country.as_str()),
            ("apiKey", self.api_key.as_str()),
            ("language", "en"),
        ];

        let body: TopHeadlines = self.client.get_json("/v2/top-headlines", &params).await?;

        if body.status != "ok" {
            return Err(Error::Api {
                status: 200,
                message: body.message.unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        tracing::debug!(
            category = %category,
            country = %country,
            total = body.total_results.unwrap_or(0),
            returned = body.articles.len(),
            "NewsAPI headlines received"
        );

        Ok(body.articles)
    }

    fn name(&self) -> &'static str {
        "newsapi"
    }
}

// =============================================================================
// Proxy Source
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
struct NewsPayload {
    #[serde(default)]
    articles: Vec<Article>,
}

/// Client for a `GET /news?category&country` endpoint
#[derive(Debug, Clone)]
pub struct ProxySource {
    client: NewsHttpClient,
}

impl ProxySource {
    /// Create a source for the service at `base_url`.
    ///
    /// Requests are not retried: the service already retries its own
    /// upstream before answering with an error.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_config(NewsClientConfig::new(base_url).with_max_retries(0))
    }

    /// Create a source with a custom client configuration
    pub fn with_config(config: NewsClientConfig) -> Result<Self> {
        Ok(Self { client: NewsHttpClient::new(config)? })
    }
}

#[async_trait]
impl ArticleSource for ProxySource {
    async fn fetch_headlines(
        &self,
        category: Category,
        country: &Country,
    ) -> Result<Vec<Article>> {
        let params = [("category", category.as_str()), ("country", country.as_str())];
        let payload: NewsPayload = self.client.get_json("/news", &params).await?;
        Ok(payload.articles)
    }

    fn name(&self) -> &'static str {
        "proxy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_synthetic_source_generates_ten() {
        let source = SyntheticSource::new();
        let country = Country::parse("gb").unwrap();

        let articles = source.fetch_headlines(Category::Technology, &country).await.unwrap();

        assert_eq!(articles.len(), 10);
        assert_eq!(articles[0].title, "Technology News Article 1");
        assert_eq!(articles[0].source.name, "Technology News 1");
        assert_eq!(articles[0].url_to_image, "https://picsum.photos/id/16/600/400");
        assert_eq!(articles[9].author.as_deref(), Some("Author 10"));
    }

    #[test]
    fn test_synthetic_source_is_deterministic() {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let source = SyntheticSource::new().with_base_time(base).with_article_count(3);
        let country = Country::default();

        let first = source.generate(Category::Sports, &country);
        let second = source.generate(Category::Sports, &country);

        assert_eq!(first, second);
        assert_eq!(first[0].published_at, base - Duration::hours(1));
        assert_eq!(first[2].published_at, base - Duration::hours(3));
    }

    #[test]
    fn test_synthetic_urls_unique_per_query() {
        let source = SyntheticSource::new();
        let gb = Country::default();
        let us = Country::parse("us").unwrap();

        let articles = source.generate(Category::General, &gb);
        let urls: HashSet<_> = articles.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls.len(), 10);

        let other = source.generate(Category::General, &us);
        assert_ne!(articles[0].url, other[0].url);
    }

    #[test]
    fn test_newsapi_requires_key() {
        assert!(matches!(NewsApiSource::new("  "), Err(Error::InvalidInput(_))));
        assert_eq!(NewsApiSource::new("key").unwrap().name(), "newsapi");
    }
}
