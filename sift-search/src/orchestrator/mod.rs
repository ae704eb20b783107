//! Search orchestrator: ordered failover across backends.
//!
//! Backends are tried one at a time in a fixed try-order, each attempt gated
//! by its circuit breaker. The first non-empty answer wins; results are never
//! merged across backends.

pub mod normalize;
pub mod order;
pub mod search;

pub use search::SearchOrchestrator;
