//! # sift
//!
//! Application layer around [`sift_search`]: configuration loading, scripted
//! fixture backends, and text rendering for the `sift` CLI.
//!
//! The failover and circuit breaking logic lives entirely in `sift-search`;
//! this crate wires a [`SiftConfig`] and a set of backends into a
//! [`SearchOrchestrator`].

pub mod config;
pub mod error;
pub mod fixtures;
pub mod render;

use std::sync::Arc;

pub use config::SiftConfig;
pub use error::{Result, SiftError};
pub use fixtures::{FixtureBackend, FixtureBehavior, FixtureSet, FixtureSpec};
pub use sift_search::{SearchBackend, SearchOrchestrator};

/// Build an orchestrator from `config` and register `backends` in order.
///
/// # Errors
///
/// Returns an error if the config is invalid or two backends share a name.
pub fn build_orchestrator<I>(config: &SiftConfig, backends: I) -> Result<SearchOrchestrator>
where
    I: IntoIterator<Item = Arc<dyn SearchBackend>>,
{
    config.validate()?;
    let mut orchestrator = SearchOrchestrator::new(config.search.clone())?;
    for backend in backends {
        orchestrator.register(backend)?;
    }
    tracing::debug!(backends = ?orchestrator.backend_names(), "orchestrator ready");
    Ok(orchestrator)
}
