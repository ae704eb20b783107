//! Search configuration with sensible defaults.
//!
//! [`SearchConfig`] controls backend routing (preferred backend and ordered
//! fallbacks), request defaults, and the circuit breaker tuning shared by all
//! backends.

use serde::{Deserialize, Serialize};

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::error::SearchError;

/// Configuration for a [`crate::SearchOrchestrator`].
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Backend to try first. Ignored if no backend with this name is registered.
    pub preferred_backend: Option<String>,
    /// Backends to try next, in order. Unknown names are skipped.
    pub fallback_backends: Vec<String>,
    /// Number of results requested when the caller does not say.
    pub num_results: usize,
    /// Language code used when the caller does not pass one.
    pub lang: String,
    /// Country code used when the caller does not pass one.
    pub country: String,
    /// Circuit breaker tuning applied to every backend.
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            preferred_backend: None,
            fallback_backends: Vec::new(),
            num_results: 5,
            lang: "en".into(),
            country: "us".into(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `num_results` must be greater than 0
    /// - `lang` and `country` must not be blank
    /// - the circuit breaker settings (see [`CircuitBreakerConfig::validate`])
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.num_results == 0 {
            return Err(SearchError::Config(
                "num_results must be greater than 0".into(),
            ));
        }
        if self.lang.trim().is_empty() {
            return Err(SearchError::Config("lang must not be empty".into()));
        }
        if self.country.trim().is_empty() {
            return Err(SearchError::Config("country must not be empty".into()));
        }
        self.circuit_breaker.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sensible_values() {
        let config = SearchConfig::default();
        assert!(config.preferred_backend.is_none());
        assert!(config.fallback_backends.is_empty());
        assert_eq!(config.num_results, 5);
        assert_eq!(config.lang, "en");
        assert_eq!(config.country, "us");
        assert_eq!(config.circuit_breaker, CircuitBreakerConfig::default());
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(SearchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_num_results_rejected() {
        let config = SearchConfig {
            num_results: 0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("num_results"));
    }

    #[test]
    fn blank_locale_rejected() {
        let config = SearchConfig {
            lang: "  ".into(),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("lang"));

        let config = SearchConfig {
            country: String::new(),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().to_string().contains("country"));
    }

    #[test]
    fn breaker_errors_surface() {
        let config = SearchConfig {
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("failure_threshold"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SearchConfig = serde_json::from_str(
            r#"{"preferred_backend":"bing","circuit_breaker":{"failure_threshold":5}}"#,
        )
        .expect("deserialize");
        assert_eq!(config.preferred_backend.as_deref(), Some("bing"));
        assert_eq!(config.num_results, 5);
        assert_eq!(config.circuit_breaker.failure_threshold, 5);
        assert_eq!(config.circuit_breaker.success_threshold, 2);
    }
}
