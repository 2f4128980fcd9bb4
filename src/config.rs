//! Layered engine configuration loaded with figment.
//!
//! Sources, highest priority first:
//! 1. Environment variables prefixed `TASKFLOW_` (`__` separates sections)
//! 2. `taskflow.toml` in the working directory, when present
//! 3. Built-in defaults

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CONFIG_FILE: &str = "taskflow.toml";
const ENV_PREFIX: &str = "TASKFLOW_";

/// Tunables for the workflow engine, timer tracker, and dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Upper bound for every repository call, in milliseconds.
    pub storage_timeout_ms: u64,
    /// Share of the estimate after which a running timer reports `WARNING`.
    pub warning_threshold_percent: u8,
    /// Optimistic-concurrency retries before a conflict surfaces as a
    /// storage error.
    pub max_conflict_retries: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_timeout_ms: 5_000,
            warning_threshold_percent: 80,
            max_conflict_retries: 3,
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider could not be read or extracted.
    #[error("failed to load configuration: {0}")]
    Extract(#[from] Box<figment::Error>),

    /// The warning threshold must lie strictly between 0 and 100.
    #[error("warning_threshold_percent must be between 1 and 99, got {0}")]
    InvalidWarningThreshold(u8),

    /// Storage calls need a positive bound.
    #[error("storage_timeout_ms must be greater than zero")]
    ZeroTimeout,
}

impl EngineConfig {
    /// Loads configuration from defaults, `taskflow.toml`, and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a source is malformed or a value is out
    /// of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Loads configuration using an explicit TOML file path.
    ///
    /// A missing file is treated as empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a source is malformed or a value is out
    /// of range.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path).extract().map_err(Box::new)?;
        config.validate()
    }

    /// Builds the provider chain so callers can layer extra providers.
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidWarningThreshold`] or
    /// [`ConfigError::ZeroTimeout`] for out-of-range values.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.warning_threshold_percent == 0 || self.warning_threshold_percent >= 100 {
            return Err(ConfigError::InvalidWarningThreshold(
                self.warning_threshold_percent,
            ));
        }
        if self.storage_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(self)
    }

    /// Returns the storage bound as a [`Duration`].
    #[must_use]
    pub const fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }
}
