//! Core search orchestrator: ordered failover through per-backend breakers.
//!
//! Walks the try-order one backend at a time. Backends with an open circuit
//! are skipped without being touched; the rest are invoked through the
//! [`CircuitBreakerRegistry`]. The first non-empty answer is normalized and
//! returned, and nothing after it is consulted.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::backend::SearchBackend;
use crate::circuit_breaker::{BackendStatus, CircuitBreakerRegistry};
use crate::config::SearchConfig;
use crate::error::{Result, SearchError, UnavailableReport};
use crate::types::{SearchItem, SearchMetadata, SearchParams, SearchResponse};

use super::normalize::normalize_items;
use super::order::try_order;

/// Routes searches across registered backends.
///
/// Cheap to share behind an [`Arc`]; concurrent searches are fine and all
/// of them feed the same circuit breaker registry.
pub struct SearchOrchestrator {
    config: SearchConfig,
    registry: Arc<CircuitBreakerRegistry>,
    backends: Vec<Arc<dyn SearchBackend>>,
}

impl std::fmt::Debug for SearchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOrchestrator")
            .field("config", &self.config)
            .field("backends", &self.backend_names())
            .finish_non_exhaustive()
    }
}

impl SearchOrchestrator {
    /// Create an orchestrator with its own registry built from
    /// `config.circuit_breaker`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` is invalid.
    pub fn new(config: SearchConfig) -> Result<Self> {
        let registry = Arc::new(CircuitBreakerRegistry::new(config.circuit_breaker.clone()));
        Self::with_registry(config, registry)
    }

    /// Create an orchestrator that records into an existing registry.
    ///
    /// The registry's own breaker configuration wins over
    /// `config.circuit_breaker`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if `config` or the registry's breaker
    /// configuration is invalid.
    pub fn with_registry(config: SearchConfig, registry: Arc<CircuitBreakerRegistry>) -> Result<Self> {
        config.validate()?;
        registry.config().validate()?;
        Ok(Self {
            config,
            registry,
            backends: Vec::new(),
        })
    }

    /// Register a backend. Registration order is the last-resort try-order.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the name is blank or already taken
    /// (compared case-insensitively).
    pub fn register(&mut self, backend: Arc<dyn SearchBackend>) -> Result<()> {
        let name = backend.name();
        if name.trim().is_empty() {
            return Err(SearchError::Config("backend name must not be empty".into()));
        }
        if self
            .backends
            .iter()
            .any(|existing| existing.name().eq_ignore_ascii_case(name))
        {
            return Err(SearchError::Config(format!(
                "backend {name} is already registered"
            )));
        }
        tracing::debug!(backend = name, "registered search backend");
        self.backends.push(backend);
        Ok(())
    }

    /// Builder-style [`Self::register`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`].
    pub fn with_backend(mut self, backend: Arc<dyn SearchBackend>) -> Result<Self> {
        self.register(backend)?;
        Ok(self)
    }

    /// The configuration in use.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The shared circuit breaker registry.
    pub fn registry(&self) -> &Arc<CircuitBreakerRegistry> {
        &self.registry
    }

    /// Registered backend names, in registration order.
    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|backend| backend.name()).collect()
    }

    /// The order backends would be tried in right now.
    pub fn try_order(&self) -> Vec<String> {
        try_order(
            &self.backend_names(),
            self.config.preferred_backend.as_deref(),
            &self.config.fallback_backends,
        )
    }

    /// Breaker snapshot for every registered backend, tried or not.
    pub fn backend_status(&self) -> BTreeMap<String, BackendStatus> {
        self.backends
            .iter()
            .map(|backend| {
                let name = backend.name();
                (name.to_owned(), self.registry.status(name))
            })
            .collect()
    }

    fn backend(&self, name: &str) -> Option<&Arc<dyn SearchBackend>> {
        self.backends.iter().find(|backend| backend.name() == name)
    }

    /// Search with the configured result count and locale.
    ///
    /// # Errors
    ///
    /// Same as [`Self::search`].
    pub async fn search_default(&self, query: &str) -> Result<SearchResponse> {
        self.search(query, self.config.num_results, &SearchParams::default())
            .await
    }

    /// Run `query` against the first backend that answers.
    ///
    /// # Pipeline
    ///
    /// 1. Compute the try-order (fixed for the whole call)
    /// 2. Skip backends whose circuit is open, without invoking them
    /// 3. Invoke the rest through the registry, one at a time; an empty
    ///    answer counts as a failure
    /// 4. Return the first non-empty answer, normalized and attributed
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidQuery`] for a blank query or `num_results == 0`
    /// - [`SearchError::AllBackendsUnavailable`] when every backend was
    ///   skipped or failed, carrying the failed/skipped split and a status
    ///   snapshot of every backend in the try-order
    pub async fn search(
        &self,
        query: &str,
        num_results: usize,
        params: &SearchParams,
    ) -> Result<SearchResponse> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::InvalidQuery("query must not be empty".into()));
        }
        if num_results == 0 {
            return Err(SearchError::InvalidQuery(
                "num_results must be greater than 0".into(),
            ));
        }
        let lang = params.lang.as_deref().unwrap_or(&self.config.lang);
        let country = params.country.as_deref().unwrap_or(&self.config.country);

        let order = self.try_order();
        let mut failed: Vec<String> = Vec::new();
        let mut skipped: Vec<String> = Vec::new();

        for name in &order {
            if !self.registry.is_available(name) {
                let retry_after_secs = self
                    .registry
                    .status(name)
                    .retry_after_secs
                    .unwrap_or_default();
                tracing::info!(backend = %name, retry_after_secs, "skipping backend, circuit open");
                skipped.push(name.clone());
                continue;
            }
            let Some(backend) = self.backend(name) else {
                tracing::warn!(backend = %name, "backend in try-order is not registered");
                failed.push(name.clone());
                continue;
            };
            let backend: &dyn SearchBackend = backend.as_ref();

            tracing::info!(backend = %name, "attempting search");
            let outcome = self
                .registry
                .call(name, move || {
                    invoke_non_empty(backend, query, num_results, lang, country)
                })
                .await;

            match outcome {
                Ok(items) => {
                    let results = normalize_items(items, name);
                    tracing::info!(
                        backend = %name,
                        results = results.len(),
                        ?failed,
                        ?skipped,
                        "search succeeded"
                    );
                    return Ok(SearchResponse {
                        query: query.to_owned(),
                        metadata: SearchMetadata {
                            total_results: results.len(),
                            language: lang.to_owned(),
                            country: country.to_owned(),
                        },
                        results,
                        used_backend: name.clone(),
                        failed,
                        skipped,
                    });
                }
                Err(err) => {
                    tracing::info!(backend = %name, error = %err, "backend failed, trying next");
                    failed.push(name.clone());
                }
            }
        }

        let status = order
            .iter()
            .map(|name| (name.clone(), self.registry.status(name)))
            .collect();
        let report = UnavailableReport {
            query: query.to_owned(),
            failed,
            skipped,
            status,
        };
        tracing::error!(
            failed = ?report.failed,
            skipped = ?report.skipped,
            "all search backends unavailable"
        );
        Err(SearchError::AllBackendsUnavailable(Box::new(report)))
    }
}

/// Invoke a backend, treating an empty answer as a failure.
async fn invoke_non_empty(
    backend: &dyn SearchBackend,
    query: &str,
    num_results: usize,
    lang: &str,
    country: &str,
) -> Result<Vec<SearchItem>> {
    let items = backend.invoke(query, num_results, lang, country).await?;
    if items.is_empty() {
        return Err(SearchError::BackendEmptyResult {
            backend: backend.name().to_owned(),
        });
    }
    Ok(items)
}
