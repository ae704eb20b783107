//! Core types for backend items, normalized results, and search responses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw result item as produced by a backend, before normalization.
///
/// Backends are free to omit the title or description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    /// The URL of the result.
    pub url: String,
    /// The page title, if the backend provided one.
    #[serde(default)]
    pub title: Option<String>,
    /// A snippet describing the page, if the backend provided one.
    #[serde(default)]
    pub description: Option<String>,
}

impl SearchItem {
    /// An item with only a URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            description: None,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A normalized search result, attributed to the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// 1-based position in the backend's returned order.
    pub position: usize,
    /// The URL of the result.
    pub url: String,
    /// The title, or `"Result {position}"` when the backend gave none.
    pub title: String,
    /// The description, empty when the backend gave none.
    pub description: String,
    /// Name of the backend that produced this result.
    pub source: String,
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.url)
    }
}

/// Locale parameters forwarded to every backend.
///
/// `None` fields fall back to the configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParams {
    /// Language code, e.g. `en`.
    pub lang: Option<String>,
    /// Country code, e.g. `us`.
    pub country: Option<String>,
}

impl SearchParams {
    /// Params with both fields set.
    pub fn new(lang: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            lang: Some(lang.into()),
            country: Some(country.into()),
        }
    }
}

/// Metadata about a successful search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMetadata {
    /// Number of results returned.
    pub total_results: usize,
    /// Language code used for the search.
    pub language: String,
    /// Country code used for the search.
    pub country: String,
}

/// A successful search: results from exactly one backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The query that was executed.
    pub query: String,
    /// Normalized results, in the backend's order.
    pub results: Vec<SearchResult>,
    /// The backend that answered.
    pub used_backend: String,
    /// Result count and the locale used.
    pub metadata: SearchMetadata,
    /// Backends tried before `used_backend` that failed.
    pub failed: Vec<String>,
    /// Backends passed over because their circuit was open.
    pub skipped: Vec<String>,
}
