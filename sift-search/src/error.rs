//! Error types for the sift-search crate.
//!
//! Per-backend errors ([`SearchError::BackendUnavailable`],
//! [`SearchError::BackendInvocationFailed`], [`SearchError::BackendEmptyResult`])
//! are recovered inside the orchestrator. Only
//! [`SearchError::AllBackendsUnavailable`] reaches callers of a search, and it
//! always carries the full per-backend diagnostics.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::circuit_breaker::BackendStatus;

/// Errors that can occur during a multi-backend search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The backend's circuit is open; no attempt was made.
    #[error("backend {backend} is unavailable (circuit open), retry after {:.1}s", .retry_after.as_secs_f64())]
    BackendUnavailable {
        /// Backend name.
        backend: String,
        /// Remaining backoff before the circuit will probe again.
        retry_after: Duration,
    },

    /// The backend raised an error or exceeded its deadline.
    #[error("backend {backend} failed: {reason}")]
    BackendInvocationFailed {
        /// Backend name.
        backend: String,
        /// Human-readable failure reason.
        reason: String,
    },

    /// The backend returned zero items, which counts against its health.
    #[error("backend {backend} returned no results")]
    BackendEmptyResult {
        /// Backend name.
        backend: String,
    },

    /// Every backend was either skipped or failed.
    #[error("{0}")]
    AllBackendsUnavailable(Box<UnavailableReport>),

    /// The query was rejected before any backend was consulted.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid search or circuit breaker configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl SearchError {
    /// Shorthand for a [`SearchError::BackendInvocationFailed`].
    pub fn invocation(backend: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::BackendInvocationFailed {
            backend: backend.into(),
            reason: reason.to_string(),
        }
    }

    /// The backend this error is attributed to, if it is a per-backend error.
    pub fn backend(&self) -> Option<&str> {
        match self {
            Self::BackendUnavailable { backend, .. }
            | Self::BackendInvocationFailed { backend, .. }
            | Self::BackendEmptyResult { backend } => Some(backend),
            _ => None,
        }
    }
}

/// Diagnostics attached to [`SearchError::AllBackendsUnavailable`].
#[derive(Debug, Clone, Serialize)]
pub struct UnavailableReport {
    /// The query that could not be answered.
    pub query: String,
    /// Backends that were attempted and failed, in try-order.
    pub failed: Vec<String>,
    /// Backends skipped because their circuit was open, in try-order.
    pub skipped: Vec<String>,
    /// Circuit breaker snapshot for every backend in the try-order.
    pub status: BTreeMap<String, BackendStatus>,
}

impl UnavailableReport {
    /// True when no backend was registered at all (a configuration problem
    /// rather than a temporary outage).
    pub fn no_backends(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty()
    }
}

impl fmt::Display for UnavailableReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.no_backends() {
            return f.write_str("no search backends registered");
        }
        write!(
            f,
            "all search backends unavailable (failed: [{}], circuit open: [{}])",
            self.failed.join(", "),
            self.skipped.join(", ")
        )
    }
}

/// Convenience type alias for sift-search results.
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn report(failed: &[&str], skipped: &[&str]) -> UnavailableReport {
        UnavailableReport {
            query: "rust".into(),
            failed: failed.iter().map(|s| s.to_string()).collect(),
            skipped: skipped.iter().map(|s| s.to_string()).collect(),
            status: BTreeMap::new(),
        }
    }

    #[test]
    fn display_backend_unavailable() {
        let err = SearchError::BackendUnavailable {
            backend: "google".into(),
            retry_after: Duration::from_millis(12_340),
        };
        assert_eq!(
            err.to_string(),
            "backend google is unavailable (circuit open), retry after 12.3s"
        );
    }

    #[test]
    fn display_invocation_failed() {
        let err = SearchError::invocation("bing", "connection refused");
        assert_eq!(err.to_string(), "backend bing failed: connection refused");
    }

    #[test]
    fn display_empty_result() {
        let err = SearchError::BackendEmptyResult {
            backend: "baidu".into(),
        };
        assert_eq!(err.to_string(), "backend baidu returned no results");
    }

    #[test]
    fn display_all_backends_unavailable() {
        let err = SearchError::AllBackendsUnavailable(Box::new(report(&["a"], &["b", "c"])));
        assert_eq!(
            err.to_string(),
            "all search backends unavailable (failed: [a], circuit open: [b, c])"
        );
    }

    #[test]
    fn display_no_backends_registered() {
        let err = SearchError::AllBackendsUnavailable(Box::new(report(&[], &[])));
        assert_eq!(err.to_string(), "no search backends registered");
    }

    #[test]
    fn backend_attribution() {
        assert_eq!(
            SearchError::invocation("duckduckgo", "boom").backend(),
            Some("duckduckgo")
        );
        assert_eq!(SearchError::Config("bad".into()).backend(), None);
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SearchError>();
    }
}
