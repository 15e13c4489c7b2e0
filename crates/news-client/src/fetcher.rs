//! Validating headline fetcher
//!
//! [`ArticleFetcher`] validates the raw category and country a caller hands
//! it, calls the configured [`ArticleSource`], and normalizes the result into
//! an [`ArticleSet`]. Invalid input never reaches the transport and never
//! fails the caller; only transport and parse failures surface as errors.

use crate::source::ArticleSource;
use crate::types::{ArticleQuery, ArticleSet, Category, Country};
use crate::Error;
use std::sync::Arc;
use thiserror::Error as ThisError;

/// A failed headline request
#[derive(Debug, ThisError)]
#[error("Failed to fetch {query} headlines: {source}")]
pub struct FetchError {
    /// The query that failed
    pub query: ArticleQuery,
    /// Underlying transport or parse error
    #[source]
    pub source: Error,
}

impl FetchError {
    /// Check if retrying the same query may succeed
    pub fn is_retryable(&self) -> bool {
        self.source.is_network_error()
    }
}

/// Fetches and normalizes headlines through an [`ArticleSource`]
#[derive(Clone)]
pub struct ArticleFetcher {
    source: Arc<dyn ArticleSource>,
}

impl std::fmt::Debug for ArticleFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleFetcher").field("source", &self.source.name()).finish()
    }
}

impl ArticleFetcher {
    /// Create a fetcher over a source
    pub fn new(source: impl ArticleSource + 'static) -> Self {
        Self { source: Arc::new(source) }
    }

    /// Create a fetcher over a shared source
    pub fn from_arc(source: Arc<dyn ArticleSource>) -> Self {
        Self { source }
    }

    /// Name of the underlying source
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Fetch headlines for raw user input.
    ///
    /// An unknown category or malformed country yields an empty set without
    /// contacting the source. The empty set keeps whichever half of the
    /// query was valid and defaults the other. A blank country means the
    /// default country.
    pub async fn fetch(&self, category: &str, country: &str) -> Result<ArticleSet, FetchError> {
        let parsed_category = Category::parse(category);

        let country_code = match Country::parse(country) {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!(country, error = %e, "Rejecting malformed country");
                let category = parsed_category.unwrap_or_default();
                return Ok(ArticleSet::empty(ArticleQuery::new(category, Country::default())));
            }
        };

        let Some(category) = parsed_category else {
            tracing::warn!(category, "Ignoring request for unknown category");
            return Ok(ArticleSet::empty(ArticleQuery::new(Category::default(), country_code)));
        };

        self.fetch_query(ArticleQuery::new(category, country_code)).await
    }

    /// Fetch headlines for an already validated query
    pub async fn fetch_query(&self, query: ArticleQuery) -> Result<ArticleSet, FetchError> {
        tracing::debug!(query = %query, source = self.source.name(), "Fetching headlines");

        let raw = match self.source.fetch_headlines(query.category, &query.country).await {
            Ok(raw) => raw,
            Err(source) => {
                tracing::warn!(query = %query, error = %source, "Headline fetch failed");
                return Err(FetchError { query, source });
            }
        };

        let category = query.category;
        let articles = raw.into_iter().map(|a| a.normalized(category)).collect();
        let set = ArticleSet::new(query, articles);

        if set.is_empty() {
            tracing::debug!(query = %set.query(), "No headlines found");
        } else {
            tracing::debug!(query = %set.query(), count = set.len(), "Headlines fetched");
        }

        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SyntheticSource;
    use crate::types::{Article, PLACEHOLDER_IMAGE};
    use crate::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Source that counts calls and serves fixed articles or a fixed failure
    struct CountingSource {
        calls: Arc<AtomicUsize>,
        articles: Vec<Article>,
        should_fail: bool,
    }

    impl CountingSource {
        fn serving(articles: Vec<Article>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (Self { calls: calls.clone(), articles, should_fail: false }, calls)
        }

        fn failing() -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (Self { calls: calls.clone(), articles: Vec::new(), should_fail: true }, calls)
        }
    }

    #[async_trait]
    impl ArticleSource for CountingSource {
        async fn fetch_headlines(
            &self,
            _category: Category,
            _country: &Country,
        ) -> Result<Vec<Article>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.should_fail {
                return Err(Error::Api { status: 500, message: "upstream exploded".to_string() });
            }
            Ok(self.articles.clone())
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn synthetic(count: usize) -> Vec<Article> {
        SyntheticSource::new()
            .with_article_count(count)
            .generate(Category::General, &Country::default())
    }

    #[tokio::test]
    async fn test_invalid_category_skips_transport() {
        let (source, calls) = CountingSource::serving(synthetic(3));
        let fetcher = ArticleFetcher::new(source);

        let set = fetcher.fetch("invalid-category", "gb").await.unwrap();

        assert!(set.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_malformed_country_skips_transport() {
        let (source, calls) = CountingSource::serving(synthetic(3));
        let fetcher = ArticleFetcher::new(source);

        let set = fetcher.fetch("sports", "gbr").await.unwrap();

        assert!(set.is_empty());
        assert_eq!(set.query().category, Category::Sports);
        assert_eq!(set.query().country, Country::default());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_country_defaults() {
        let fetcher = ArticleFetcher::new(SyntheticSource::new());

        let set = fetcher.fetch("Technology", "").await.unwrap();

        assert_eq!(set.len(), 10);
        assert_eq!(set.query().category, Category::Technology);
        assert_eq!(set.query().country.as_str(), "gb");
    }

    #[tokio::test]
    async fn test_every_category_returns_a_set() {
        let fetcher = ArticleFetcher::new(SyntheticSource::new());

        for category in Category::ALL {
            let set = fetcher.fetch(category.as_str(), "us").await.unwrap();
            assert_eq!(set.len(), 10);
            assert!(set.articles().iter().all(|a| a.category == Some(category)));
        }
    }

    #[tokio::test]
    async fn test_normalizes_images_and_dedups() {
        let mut articles = synthetic(2);
        articles[0].url_to_image = String::new();
        articles.push(articles[1].clone());

        let (source, _) = CountingSource::serving(articles);
        let set = ArticleFetcher::new(source).fetch("general", "gb").await.unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().url_to_image, PLACEHOLDER_IMAGE);
        assert!(set.get(1).unwrap().has_image());
    }

    #[tokio::test]
    async fn test_empty_result_is_not_an_error() {
        let (source, calls) = CountingSource::serving(Vec::new());
        let set = ArticleFetcher::new(source).fetch("health", "de").await.unwrap();

        assert!(set.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces() {
        let (source, _) = CountingSource::failing();
        let err = ArticleFetcher::new(source).fetch("science", "us").await.unwrap_err();

        assert_eq!(err.query.category, Category::Science);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("science/us"));
        assert!(err.to_string().contains("upstream exploded"));
    }

    #[test]
    fn test_debug_names_source() {
        let fetcher = ArticleFetcher::new(SyntheticSource::new());
        assert_eq!(fetcher.source_name(), "synthetic");
        assert!(format!("{:?}", fetcher).contains("synthetic"));
    }
}
