//! # sift-search
//!
//! Resilient search across a pool of interchangeable, independently-failing
//! backends.
//!
//! ## Design
//!
//! - Each backend gets its own circuit breaker (closed / open / half-open)
//!   with exponential backoff, tracked in a [`CircuitBreakerRegistry`]
//! - The [`SearchOrchestrator`] tries backends one at a time: preferred
//!   backend first, then configured fallbacks, then everything else
//! - Backends with an open circuit are skipped without being called
//! - An empty answer counts as a failure against the backend's health
//! - The first non-empty answer wins; results are never merged, and every
//!   result is attributed to the backend that produced it
//! - Total failure surfaces as [`SearchError::AllBackendsUnavailable`] with a
//!   per-backend status table
//!
//! The backends themselves live outside this crate; anything implementing
//! [`SearchBackend`] can be registered.
//!
//! ## Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # async fn example(backend: Arc<dyn sift_search::SearchBackend>) -> sift_search::Result<()> {
//! let orchestrator = sift_search::SearchOrchestrator::new(sift_search::SearchConfig::default())?
//!     .with_backend(backend)?;
//! let response = orchestrator.search_default("rust programming").await?;
//! for result in &response.results {
//!     println!("{}. {} [{}]", result.position, result, result.source);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod circuit_breaker;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod types;

pub use backend::SearchBackend;
pub use circuit_breaker::{
    BackendStatus, CircuitBreakerConfig, CircuitBreakerRegistry, CircuitState,
};
pub use config::SearchConfig;
pub use error::{Result, SearchError, UnavailableReport};
pub use orchestrator::SearchOrchestrator;
pub use types::{SearchItem, SearchMetadata, SearchParams, SearchResponse, SearchResult};
