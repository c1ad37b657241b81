//! Configuration for the session storage.

use std::time::Duration;

/// Default interval between renewal flushes.
///
/// Touches asking for a TTL shorter than this are not queued.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(10);

/// Longest accepted interval between renewal flushes (one day).
pub const MAX_FLUSH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Configuration for [`KvSessionStorage`](crate::KvSessionStorage).
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Prefix prepended verbatim to every session id to build the store key.
    pub key_prefix: String,

    /// Interval at which pending TTL renewals are flushed to the store.
    pub flush_interval: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key_prefix: String::new(),
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }
}

impl StorageConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key prefix.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Set the flush interval.
    ///
    /// The interval is clamped to between one millisecond and
    /// [`MAX_FLUSH_INTERVAL`]; `tokio::time::interval` panics on zero and
    /// timer deadlines overflow for very large values.
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval.clamp(Duration::from_millis(1), MAX_FLUSH_INTERVAL);
        self
    }
}
