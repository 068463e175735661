//! Engine configuration.
//!
//! Loaded from RON so balance knobs can change without a rebuild.
//!
//! # Example RON
//!
//! ```ron
//! EngineConfig(
//!     seed: Some(12345),
//!     event_probability: 0.05,
//!     storage_key: "colony-sim-state",
//!     tick_interval_ms: 1000,
//!     autosave: true,
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::events::DEFAULT_EVENT_PROBABILITY;
use crate::persistence::DEFAULT_STORAGE_KEY;

/// Real-time cadence the driving timer should use.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

/// Error type for configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found.
    #[error("Config file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// A value is out of range.
    #[error("Invalid config value for {field}: {message}")]
    InvalidValue {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Tunables for [`crate::engine::GameEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// RNG seed. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Per-tick chance of a new event while none is pending.
    pub event_probability: f64,
    /// Key the state is persisted under.
    pub storage_key: String,
    /// Interval between ticks for drivers that own a timer.
    pub tick_interval_ms: u64,
    /// Persist after every successful mutation.
    pub autosave: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            event_probability: DEFAULT_EVENT_PROBABILITY,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            autosave: true,
        }
    }
}

impl EngineConfig {
    /// Load a config from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Builder: fixed seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder: event chance per tick.
    #[must_use]
    pub fn with_event_probability(mut self, probability: f64) -> Self {
        self.event_probability = probability;
        self
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.event_probability) {
            return Err(ConfigError::InvalidValue {
                field: "event_probability",
                message: format!("{} is outside [0, 1]", self.event_probability),
            });
        }
        if self.storage_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "storage_key",
                message: "must not be empty".to_string(),
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "tick_interval_ms",
                message: "must be positive".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_constants() {
        let config = EngineConfig::default();
        assert_eq!(config.event_probability, 0.05);
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.storage_key, "colony-sim-state");
        assert!(config.autosave);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_ron() {
        let config = EngineConfig::from_ron_str("(seed: Some(9), event_probability: 0.5)").unwrap();
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.event_probability, 0.5);
        assert_eq!(config.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = EngineConfig::from_ron_str("(event_probability: 1.5)").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "event_probability",
                ..
            }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }
}
