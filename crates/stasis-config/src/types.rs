//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [redis]
//! url = "redis://127.0.0.1:6379"
//!
//! [session]
//! key_prefix = "sess:"
//! flush_interval_secs = 10
//! default_ttl_secs = 1440
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use stasis_session::StorageConfig;

use crate::{ConfigError, Result};

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StasisConfig {
    /// Store connection.
    pub redis: Option<RedisConfig>,

    /// Session storage behaviour.
    pub session: Option<SessionConfig>,
}

impl StasisConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: StasisConfig) {
        if other.redis.is_some() {
            self.redis = other.redis;
        }

        if other.session.is_some() {
            self.session = other.session;
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref session) = self.session {
            if session.flush_interval_secs == 0 {
                return Err(ConfigError::Invalid {
                    field: "session.flush_interval_secs".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            let max_secs = stasis_session::MAX_FLUSH_INTERVAL.as_secs();
            if session.flush_interval_secs > max_secs {
                return Err(ConfigError::Invalid {
                    field: "session.flush_interval_secs".to_string(),
                    reason: format!("must be at most {max_secs}"),
                });
            }
            if session.default_ttl_secs == 0 {
                return Err(ConfigError::Invalid {
                    field: "session.default_ttl_secs".to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Effective store settings (defaults when the section is absent).
    pub fn redis(&self) -> RedisConfig {
        self.redis.clone().unwrap_or_default()
    }

    /// Effective session settings (defaults when the section is absent).
    pub fn session(&self) -> SessionConfig {
        self.session.clone().unwrap_or_default()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Redis Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default Redis URL.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Store connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    /// Connection URL.
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_REDIS_URL.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Session Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Session storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Prefix prepended to session ids to build store keys.
    pub key_prefix: String,
    /// Seconds between TTL renewal flushes.
    pub flush_interval_secs: u64,
    /// TTL used by the CLI when none is given.
    pub default_ttl_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            key_prefix: String::new(),
            flush_interval_secs: stasis_session::DEFAULT_FLUSH_INTERVAL.as_secs(),
            default_ttl_secs: 1440,
        }
    }
}

impl SessionConfig {
    /// Flush interval as a duration.
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }

    /// Default TTL as a duration.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_secs)
    }

    /// Build the storage configuration.
    pub fn storage_config(&self) -> StorageConfig {
        StorageConfig::new()
            .with_key_prefix(self.key_prefix.clone())
            .with_flush_interval(self.flush_interval())
    }
}
