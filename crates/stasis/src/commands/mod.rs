//! CLI command handlers.

pub mod delete;
pub mod get;
pub mod put;
pub mod touch;

use std::time::Duration;

use anyhow::{Context as _, Result};
use stasis_config::StasisConfig;
use stasis_session::{KvSessionStorage, RedisStore};

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective configuration.
    pub config: StasisConfig,
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Connect to the configured store and start a session storage on it.
    pub async fn open_storage(&self) -> Result<KvSessionStorage<RedisStore>> {
        let url = self.config.redis().url;
        let store = RedisStore::connect(&url)
            .await
            .with_context(|| format!("connecting to {url}"))?;
        Ok(KvSessionStorage::new(
            store,
            self.config.session().storage_config(),
        ))
    }

    /// TTL from a `--ttl` flag, or the configured default.
    pub fn ttl_or_default(&self, ttl_secs: Option<u64>) -> Duration {
        ttl_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.config.session().default_ttl())
    }
}
