//! Headline data model
//!
//! Categories, country codes, articles, and the article set answering one
//! (category, country) query.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Image shown for articles that arrive without one
pub const PLACEHOLDER_IMAGE: &str = "/placeholder-image.jpg";

// =============================================================================
// Category
// =============================================================================

/// Fixed topic tag for headlines
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// General news
    #[default]
    General,
    /// Business and finance
    Business,
    /// Entertainment
    Entertainment,
    /// Health
    Health,
    /// Science
    Science,
    /// Sports
    Sports,
    /// Technology
    Technology,
}

impl Category {
    /// Every category, in catalog order
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Business,
        Category::Entertainment,
        Category::Health,
        Category::Science,
        Category::Sports,
        Category::Technology,
    ];

    /// Wire name used in queries (e.g., "technology")
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }

    /// Capitalized name for display (e.g., "Technology")
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Business => "Business",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Science => "Science",
            Category::Sports => "Sports",
            Category::Technology => "Technology",
        }
    }

    /// Position in [`Category::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Parse a category name, ignoring case and surrounding whitespace
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL.into_iter().find(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s).ok_or_else(|| Error::InvalidInput(format!("unknown category: {}", s)))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Country
// =============================================================================

/// Lowercase two-letter country code
///
/// # Examples
/// ```
/// use news_client::Country;
///
/// assert_eq!(Country::parse(" US ").unwrap().as_str(), "us");
/// assert_eq!(Country::parse("").unwrap().as_str(), "gb");
/// assert!(Country::parse("usa").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Country(String);

impl Country {
    /// Parse a country code. Blank input yields the default country.
    pub fn parse(raw: &str) -> Result<Self> {
        storage::normalize_country(raw)
            .map(Country)
            .ok_or_else(|| Error::InvalidInput(format!("invalid country code: {}", raw)))
    }

    /// Get the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Country {
    fn default() -> Self {
        Country(storage::DEFAULT_COUNTRY.to_string())
    }
}

impl FromStr for Country {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Country {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Country> for String {
    fn from(country: Country) -> Self {
        country.0
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Articles
// =============================================================================

/// Publisher of an article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Publisher identifier, when the upstream has one
    #[serde(default)]
    pub id: Option<String>,
    /// Publisher name
    #[serde(default, deserialize_with = "string_or_null")]
    pub name: String,
}

/// A single headline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Publisher
    pub source: SourceRef,
    /// Byline
    #[serde(default)]
    pub author: Option<String>,
    /// Headline text
    #[serde(default, deserialize_with = "string_or_null")]
    pub title: String,
    /// Summary
    #[serde(default)]
    pub description: Option<String>,
    /// Canonical link; unique within an [`ArticleSet`]
    pub url: String,
    /// Lead image. Blank until normalized, then never blank.
    #[serde(default, deserialize_with = "string_or_null")]
    pub url_to_image: String,
    /// Publication time
    pub published_at: DateTime<Utc>,
    /// Truncated body
    #[serde(default)]
    pub content: Option<String>,
    /// Category the article was fetched under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Article {
    /// Fill in the placeholder image and tag the article with its category
    pub fn normalized(mut self, category: Category) -> Self {
        if self.url_to_image.trim().is_empty() {
            self.url_to_image = PLACEHOLDER_IMAGE.to_string();
        }
        self.category = Some(category);
        self
    }

    /// Check if the article has its own image
    pub fn has_image(&self) -> bool {
        !self.url_to_image.trim().is_empty() && self.url_to_image != PLACEHOLDER_IMAGE
    }
}

fn string_or_null<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The (category, country) pair an [`ArticleSet`] answers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ArticleQuery {
    /// Requested category
    pub category: Category,
    /// Requested country
    pub country: Country,
}

impl ArticleQuery {
    /// Create a new query
    pub fn new(category: Category, country: Country) -> Self {
        Self { category, country }
    }
}

impl fmt::Display for ArticleQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.country)
    }
}

/// Ordered headlines for one query, unique by url
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArticleSet {
    query: ArticleQuery,
    articles: Vec<Article>,
}

impl ArticleSet {
    /// Build a set, dropping later articles whose url was already seen
    pub fn new(query: ArticleQuery, articles: Vec<Article>) -> Self {
        let mut unique: Vec<Article> = Vec::with_capacity(articles.len());
        for article in articles {
            if unique.iter().any(|a| a.url == article.url) {
                tracing::debug!(url = %article.url, "Dropping duplicate article");
                continue;
            }
            unique.push(article);
        }
        Self { query, articles: unique }
    }

    /// An empty set for a query
    pub fn empty(query: ArticleQuery) -> Self {
        Self { query, articles: Vec::new() }
    }

    /// The query this set answers
    pub fn query(&self) -> &ArticleQuery {
        &self.query
    }

    /// Articles in display order
    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    /// Consume the set, returning its articles
    pub fn into_articles(self) -> Vec<Article> {
        self.articles
    }

    /// Article at `index`
    pub fn get(&self, index: usize) -> Option<&Article> {
        self.articles.get(index)
    }

    /// Number of articles
    pub fn len(&self) -> usize {
        self.articles.len()
    }

    /// Check if the set has no articles
    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(url: &str) -> Article {
        Article {
            source: SourceRef { id: None, name: "Wire".to_string() },
            author: None,
            title: "Headline".to_string(),
            description: None,
            url: url.to_string(),
            url_to_image: String::new(),
            published_at: Utc::now(),
            content: None,
            category: None,
        }
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("Technology"), Some(Category::Technology));
        assert_eq!(Category::parse("  SPORTS "), Some(Category::Sports));
        assert_eq!(Category::parse("invalid-category"), None);
        assert_eq!(Category::parse(""), None);
        assert!("weather".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_names() {
        assert_eq!(Category::Technology.as_str(), "technology");
        assert_eq!(Category::Technology.display_name(), "Technology");
        assert_eq!(Category::default(), Category::General);
        assert_eq!(Category::Technology.index(), 6);
        assert_eq!(serde_json::to_string(&Category::Health).unwrap(), "\"health\"");
    }

    #[test]
    fn test_country_parse() {
        assert_eq!(Country::parse("US").unwrap().as_str(), "us");
        assert_eq!(Country::parse("   ").unwrap(), Country::default());
        assert!(Country::parse("u1").is_err());
        assert!(Country::parse("gbr").is_err());
    }

    #[test]
    fn test_country_serde() {
        let country: Country = serde_json::from_str("\"FR\"").unwrap();
        assert_eq!(country.as_str(), "fr");
        assert!(serde_json::from_str::<Country>("\"france\"").is_err());
    }

    #[test]
    fn test_article_deserializes_newsapi_nulls() {
        let json = r#"{
            "source": {"id": null, "name": "BBC News"},
            "author": null,
            "title": "Markets rally",
            "description": null,
            "url": "https://bbc.co.uk/1",
            "urlToImage": null,
            "publishedAt": "2024-05-01T10:00:00Z",
            "content": null
        }"#;

        let article: Article = serde_json::from_str(json).unwrap();
        assert_eq!(article.url_to_image, "");
        assert!(!article.has_image());

        let article = article.normalized(Category::Business);
        assert_eq!(article.url_to_image, PLACEHOLDER_IMAGE);
        assert_eq!(article.category, Some(Category::Business));
    }

    #[test]
    fn test_article_serializes_camel_case() {
        let json = serde_json::to_value(article("https://a").normalized(Category::General)).unwrap();
        assert_eq!(json["urlToImage"], PLACEHOLDER_IMAGE);
        assert_eq!(json["category"], "general");
        assert!(json.get("publishedAt").is_some());
    }

    #[test]
    fn test_article_set_dedups_by_url() {
        let set = ArticleSet::new(
            ArticleQuery::default(),
            vec![article("https://a"), article("https://b"), article("https://a")],
        );
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(1).unwrap().url, "https://b");
    }

    #[test]
    fn test_query_display() {
        let query = ArticleQuery::new(Category::Sports, Country::parse("us").unwrap());
        assert_eq!(query.to_string(), "sports/us");
    }
}
