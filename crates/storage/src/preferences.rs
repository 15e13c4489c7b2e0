//! User preferences for news personalization
//!
//! This module defines the persisted preference document and the partial
//! update applied to it. The whole document is stored as one JSON object
//! under [`PREFERENCES_KEY`].

use serde::{Deserialize, Deserializer, Serialize};

/// Storage key holding the serialized preferences
pub const PREFERENCES_KEY: &str = "userPreferences";

/// Country used whenever none (or an unusable one) is stored
pub const DEFAULT_COUNTRY: &str = "gb";

const DEFAULT_CATEGORIES: [&str; 7] =
    ["General", "Business", "Technology", "Sports", "Entertainment", "Health", "Science"];

const DEFAULT_CONTENT_TYPES: [&str; 3] = ["text articles", "videos", "podcasts"];

const DEFAULT_NOTIFICATIONS: [&str; 2] = ["breaking news alerts", "daily news digest"];

/// Preferred article length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleLength {
    /// Headlines and short summaries
    Short,
    /// Standard articles
    #[default]
    Medium,
    /// Long-form reads
    Long,
}

/// Persisted user personalization settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Category display names, in the order the user arranged them
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,

    /// Preferred article length
    #[serde(default)]
    pub article_length: ArticleLength,

    /// Content formats the user wants to see
    #[serde(default = "default_content_types")]
    pub content_types: Vec<String>,

    /// Notification channels the user opted into
    #[serde(default = "default_notifications")]
    pub notifications: Vec<String>,

    /// Lowercase two-letter country code for headlines.
    ///
    /// A missing or null value reads as blank so the loader backfills it.
    #[serde(default, deserialize_with = "string_or_null")]
    pub country: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            article_length: ArticleLength::default(),
            content_types: default_content_types(),
            notifications: default_notifications(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

impl Preferences {
    /// Parse a stored document.
    ///
    /// Returns `None` for malformed JSON so callers can treat it as absent.
    pub fn from_json(text: &str) -> Option<Self> {
        match serde_json::from_str::<Preferences>(text) {
            Ok(prefs) => Some(prefs),
            Err(e) => {
                tracing::warn!("Ignoring malformed stored preferences: {}", e);
                None
            }
        }
    }

    /// Serialize to the stored JSON form
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Replace a missing or unusable country with [`DEFAULT_COUNTRY`].
    ///
    /// Returns true if the country was changed.
    pub fn backfill_country(&mut self) -> bool {
        match normalize_country(&self.country) {
            Some(code) if code == self.country => false,
            Some(code) => {
                self.country = code;
                true
            }
            None => {
                self.country = DEFAULT_COUNTRY.to_string();
                true
            }
        }
    }

    /// Enforce the document invariants: unique non-empty lists, at least one
    /// category, a valid country.
    pub fn normalize(&mut self) {
        self.categories = dedup_names(std::mem::take(&mut self.categories));
        if self.categories.is_empty() {
            self.categories = default_categories();
        }
        self.content_types = dedup_names(std::mem::take(&mut self.content_types));
        self.notifications = dedup_names(std::mem::take(&mut self.notifications));
        self.backfill_country();
    }

    /// Shallow-merge a partial update, returning the normalized result
    pub fn merged(&self, update: PreferencesUpdate) -> Preferences {
        let mut next = self.clone();

        if let Some(categories) = update.categories {
            let categories = dedup_names(categories);
            // An empty selection would break the non-empty invariant; keep the current one.
            if !categories.is_empty() {
                next.categories = categories;
            }
        }
        if let Some(length) = update.article_length {
            next.article_length = length;
        }
        if let Some(content_types) = update.content_types {
            next.content_types = content_types;
        }
        if let Some(notifications) = update.notifications {
            next.notifications = notifications;
        }
        if let Some(country) = update.country {
            next.country = country;
        }

        next.normalize();
        next
    }

    /// Check whether a category is selected (case-insensitive)
    pub fn has_category(&self, name: &str) -> bool {
        let name = name.trim();
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Partial preferences update; `None` fields keep their current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    /// Replacement category list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,

    /// Replacement article length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_length: Option<ArticleLength>,

    /// Replacement content types
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_types: Option<Vec<String>>,

    /// Replacement notification channels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Vec<String>>,

    /// Replacement country code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl PreferencesUpdate {
    /// Create an empty update
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the category list
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = Some(categories.into_iter().map(Into::into).collect());
        self
    }

    /// Set the article length
    pub fn article_length(mut self, length: ArticleLength) -> Self {
        self.article_length = Some(length);
        self
    }

    /// Set the content types
    pub fn content_types<I, S>(mut self, content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.content_types = Some(content_types.into_iter().map(Into::into).collect());
        self
    }

    /// Set the notification channels
    pub fn notifications<I, S>(mut self, notifications: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.notifications = Some(notifications.into_iter().map(Into::into).collect());
        self
    }

    /// Set the country code
    pub fn country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Check if the update changes nothing
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Lowercase and validate a two-letter country code.
///
/// Blank input yields [`DEFAULT_COUNTRY`]; anything else that is not two
/// ASCII letters yields `None`.
pub fn normalize_country(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_lowercase();
    if code.is_empty() {
        return Some(DEFAULT_COUNTRY.to_string());
    }
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(code)
    } else {
        None
    }
}

/// Trim entries, drop blanks, and remove case-insensitive duplicates keeping
/// the first occurrence.
fn dedup_names(names: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(names.len());
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            continue;
        }
        let folded = trimmed.to_lowercase();
        if !seen.contains(&folded) {
            seen.push(folded);
            out.push(trimmed.to_string());
        }
    }
    out
}

fn string_or_null<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_categories() -> Vec<String> {
    DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect()
}

fn default_content_types() -> Vec<String> {
    DEFAULT_CONTENT_TYPES.iter().map(|s| s.to_string()).collect()
}

fn default_notifications() -> Vec<String> {
    DEFAULT_NOTIFICATIONS.iter().map(|s| s.to_string()).collect()
}
