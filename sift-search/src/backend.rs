//! Trait definition for pluggable search backends.
//!
//! The orchestrator only needs a stable name per backend and one async
//! invocation. How a backend reaches the network is its own business.

use async_trait::async_trait;

use crate::error::SearchError;
use crate::types::SearchItem;

/// A pluggable search backend.
///
/// Implementations return [`SearchError::BackendInvocationFailed`] on hard
/// failure and an empty list when they simply found nothing. The orchestrator
/// treats the empty case as a failure too.
///
/// All implementations must be `Send + Sync` so one instance can serve
/// concurrent searches.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Stable identifier used for routing, circuit breaking, and attribution.
    fn name(&self) -> &str;

    /// Run a query and return raw result items.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the backend could not produce results.
    async fn invoke(
        &self,
        query: &str,
        num_results: usize,
        lang: &str,
        country: &str,
    ) -> Result<Vec<SearchItem>, SearchError>;
}
