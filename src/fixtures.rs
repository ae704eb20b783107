//! Scripted backends loaded from a JSON fixture file.
//!
//! Fixtures stand in for real search providers so routing and circuit
//! breaking can be exercised end to end without network access.
//!
//! ```json
//! {
//!   "backends": [
//!     { "name": "google", "behavior": { "kind": "error", "message": "HTTP 429" } },
//!     { "name": "baidu", "behavior": { "kind": "empty" } },
//!     { "name": "bing", "delay_ms": 150, "behavior": {
//!         "kind": "flaky", "failures": 2,
//!         "items": [{ "url": "https://www.rust-lang.org", "title": "Rust" }] } },
//!     { "name": "duckduckgo", "behavior": {
//!         "kind": "results",
//!         "items": [{ "url": "https://doc.rust-lang.org/book/" }] } },
//!     { "name": "stuck", "behavior": { "kind": "hang" } }
//!   ]
//! }
//! ```

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sift_search::{SearchBackend, SearchError, SearchItem};

use crate::error::{Result, SiftError};

/// What a fixture backend does when invoked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixtureBehavior {
    /// Return these items (truncated to the requested count).
    Results {
        /// Items to serve.
        items: Vec<SearchItem>,
    },
    /// Return no items.
    Empty,
    /// Fail with this message.
    Error {
        /// Failure reason.
        message: String,
    },
    /// Fail the first `failures` calls, then serve `items`.
    Flaky {
        /// Calls that fail before the backend recovers.
        failures: usize,
        /// Items served after recovery.
        items: Vec<SearchItem>,
    },
    /// Never answer.
    Hang,
}

/// One backend entry in a fixture file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureSpec {
    /// Backend name used for routing.
    pub name: String,
    /// Artificial latency before the behavior runs.
    #[serde(default)]
    pub delay_ms: u64,
    /// What the backend does.
    pub behavior: FixtureBehavior,
}

/// A fixture file: backends in registration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Backends, registered in this order.
    pub backends: Vec<FixtureSpec>,
}

impl FixtureSet {
    /// Parse a fixture set from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Fixture`] for malformed JSON or a blank backend name.
    pub fn from_json(json: &str) -> Result<Self> {
        let set: Self =
            serde_json::from_str(json).map_err(|e| SiftError::Fixture(e.to_string()))?;
        if let Some(blank) = set.backends.iter().position(|b| b.name.trim().is_empty()) {
            return Err(SiftError::Fixture(format!(
                "backend #{} has an empty name",
                blank + 1
            )));
        }
        Ok(set)
    }

    /// Load a fixture set from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Build one backend per entry, in file order.
    pub fn backends(&self) -> Vec<Arc<FixtureBackend>> {
        self.backends
            .iter()
            .cloned()
            .map(|spec| Arc::new(FixtureBackend::new(spec)))
            .collect()
    }
}

/// A [`SearchBackend`] driven by a [`FixtureSpec`].
#[derive(Debug)]
pub struct FixtureBackend {
    spec: FixtureSpec,
    calls: AtomicUsize,
}

impl FixtureBackend {
    /// Create a backend from its spec.
    pub fn new(spec: FixtureSpec) -> Self {
        Self {
            spec,
            calls: AtomicUsize::new(0),
        }
    }

    /// How many times this backend has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for FixtureBackend {
    fn name(&self) -> &str {
        &self.spec.name
    }

    async fn invoke(
        &self,
        query: &str,
        num_results: usize,
        lang: &str,
        country: &str,
    ) -> std::result::Result<Vec<SearchItem>, SearchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(backend = %self.spec.name, query, lang, country, call, "fixture invoked");

        if self.spec.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.spec.delay_ms)).await;
        }

        match &self.spec.behavior {
            FixtureBehavior::Results { items } => Ok(take(items, num_results)),
            FixtureBehavior::Empty => Ok(Vec::new()),
            FixtureBehavior::Error { message } => {
                Err(SearchError::invocation(&self.spec.name, message))
            }
            FixtureBehavior::Flaky { failures, .. } if call < *failures => Err(
                SearchError::invocation(&self.spec.name, format!("scripted failure {}", call + 1)),
            ),
            FixtureBehavior::Flaky { items, .. } => Ok(take(items, num_results)),
            FixtureBehavior::Hang => std::future::pending().await,
        }
    }
}

fn take(items: &[SearchItem], num_results: usize) -> Vec<SearchItem> {
    items.iter().take(num_results).cloned().collect()
}
