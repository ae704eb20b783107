//! Configuration file for the sift application.
//!
//! The file is TOML and mirrors [`SiftConfig`]; every field is optional.
//!
//! ```toml
//! [search]
//! preferred_backend = "google"
//! fallback_backends = ["duckduckgo", "bing"]
//! num_results = 5
//! lang = "en"
//! country = "us"
//!
//! [search.circuit_breaker]
//! failure_threshold = 3
//! success_threshold = 2
//! open_timeout_secs = 60.0
//! half_open_timeout_secs = 30.0
//! backoff_base = 2.0
//! ```

use serde::{Deserialize, Serialize};
use sift_search::SearchConfig;
use std::path::{Path, PathBuf};

use crate::error::{Result, SiftError};

/// Environment variable that overrides the default config file location.
pub const CONFIG_ENV_VAR: &str = "SIFT_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Routing, request defaults, and circuit breaker tuning.
    pub search: SearchConfig,
}

impl SiftConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| SiftError::Config(format!("{}: {e}", path.display())))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| SiftError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/sift/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("sift").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("sift")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/sift-config/config.toml")
        }
    }

    /// Resolve and load the effective configuration.
    ///
    /// An explicit path must exist. Otherwise `$SIFT_CONFIG`, then the
    /// default path, is used if present, falling back to defaults. The result
    /// is validated either way.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but is unreadable or invalid.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading config");
                Self::from_file(path)?
            }
            None => {
                let path = std::env::var_os(CONFIG_ENV_VAR)
                    .map(PathBuf::from)
                    .unwrap_or_else(Self::default_config_path);
                if path.exists() {
                    tracing::info!(path = %path.display(), "loading config");
                    Self::from_file(&path)?
                } else {
                    tracing::debug!(path = %path.display(), "config file not found, using defaults");
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Search`] with the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.search.validate()?;
        Ok(())
    }
}
