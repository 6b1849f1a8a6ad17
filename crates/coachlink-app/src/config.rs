//! # Acceptance Configuration
//!
//! Timing and secret parameters for the acceptance coordinator.
//!
//! The settle and registry-clear delays are empirical values with no verified
//! lower bound, so they are configurable rather than baked in. Values come
//! from defaults, then an optional TOML file, then `COACHLINK_*` environment
//! variables.
//!
//! ```toml
//! settle_delay_ms = 500
//! poll_interval_ms = 500
//! registry_clear_delay_ms = 1000
//! identity_timeout_ms = 120000
//! secret_bytes = 32
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Pause after an identity-ready signal before redeeming
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 500;
/// Cadence of the POLL wait strategy
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
/// Delay between `Success` and clearing the pending invitation
pub const DEFAULT_REGISTRY_CLEAR_DELAY_MS: u64 = 1_000;
/// Upper bound on waiting for the identity provider
pub const DEFAULT_IDENTITY_TIMEOUT_MS: u64 = 120_000;
/// Length of the generated manual-credential secret before hex encoding
pub const DEFAULT_SECRET_BYTES: usize = 32;

/// Minimum accepted secret length in bytes
pub const MIN_SECRET_BYTES: usize = 16;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "COACHLINK_";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read
    #[error("Failed to read config file {path}: {message}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying error
        message: String,
    },

    /// The config text is not valid TOML for this schema
    #[error("Invalid config: {message}")]
    Parse {
        /// Parser message
        message: String,
    },

    /// A key is unknown or its value is out of range
    #[error("Invalid value for {key}: {message}")]
    Invalid {
        /// Offending key
        key: String,
        /// What is wrong with it
        message: String,
    },
}

impl ConfigError {
    fn invalid(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Acceptance coordinator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AcceptanceConfig {
    /// Pause after the identity signal before redeeming (federated path only)
    pub settle_delay_ms: u64,
    /// POLL strategy sampling cadence
    pub poll_interval_ms: u64,
    /// Delay between `Success` and clearing the pending invitation
    pub registry_clear_delay_ms: u64,
    /// Give up waiting for the identity provider after this long; `None` waits forever
    pub identity_timeout_ms: Option<u64>,
    /// Manual-credential secret length in bytes
    pub secret_bytes: usize,
}

impl Default for AcceptanceConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: DEFAULT_SETTLE_DELAY_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            registry_clear_delay_ms: DEFAULT_REGISTRY_CLEAR_DELAY_MS,
            identity_timeout_ms: Some(DEFAULT_IDENTITY_TIMEOUT_MS),
            secret_bytes: DEFAULT_SECRET_BYTES,
        }
    }
}

impl AcceptanceConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `COACHLINK_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> Result<(), ConfigError> {
        self.merge_from_vars(std::env::vars())
    }

    /// Apply `COACHLINK_*` overrides from an explicit variable list.
    ///
    /// `COACHLINK_SETTLE_DELAY_MS=250` maps to `settle_delay_ms`. Variables
    /// without the prefix are ignored; unknown keys after the prefix are not.
    pub fn merge_from_vars<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                self.set_from_string(&config_key.to_lowercase(), &value)?;
            }
        }
        Ok(())
    }

    /// Set a single value from its string form (env and CLI overrides)
    pub fn set_from_string(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "settle_delay_ms" => self.settle_delay_ms = parse_u64(key, value)?,
            "poll_interval_ms" => self.poll_interval_ms = parse_u64(key, value)?,
            "registry_clear_delay_ms" => self.registry_clear_delay_ms = parse_u64(key, value)?,
            "identity_timeout_ms" => {
                self.identity_timeout_ms = match value {
                    "" | "none" | "off" => None,
                    other => Some(parse_u64(key, other)?),
                };
            }
            "secret_bytes" => {
                self.secret_bytes = value
                    .parse()
                    .map_err(|e| ConfigError::invalid(key, format!("{e}")))?;
            }
            other => return Err(ConfigError::invalid(other, "unknown configuration key")),
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "poll_interval_ms",
                "must be greater than zero",
            ));
        }
        if self.secret_bytes < MIN_SECRET_BYTES {
            return Err(ConfigError::invalid(
                "secret_bytes",
                format!("must be at least {MIN_SECRET_BYTES}"),
            ));
        }
        if self.identity_timeout_ms == Some(0) {
            return Err(ConfigError::invalid(
                "identity_timeout_ms",
                "use `none` to disable the timeout",
            ));
        }
        Ok(())
    }

    /// Settle delay as a duration
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Registry clear delay as a duration
    pub fn registry_clear_delay(&self) -> Duration {
        Duration::from_millis(self.registry_clear_delay_ms)
    }
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|e| ConfigError::invalid(key, format!("{e}")))
}
