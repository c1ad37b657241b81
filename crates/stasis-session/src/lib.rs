//! Session storage on top of an external key-value store.
//!
//! This crate persists per-session key/value maps and defers TTL renewal:
//! - Loads and saves go straight to the store (`GET` / `SETEX`)
//! - Touches are queued in memory and deduplicated per session
//! - A background flusher drains the queue on a fixed interval (`EXPIRE`)
//!
//! # Example
//!
//! ```rust,ignore
//! use stasis_session::{KvSessionStorage, RedisStore, SessionStorage, StorageConfig};
//!
//! let store = RedisStore::connect("redis://127.0.0.1:6379").await?;
//! let config = StorageConfig::default()
//!     .with_key_prefix("sess:")
//!     .with_flush_interval(Duration::from_secs(10));
//!
//! let storage = KvSessionStorage::new(store, config);
//! storage.update_ttl("abc", Duration::from_secs(1440)).await?;
//! ```

mod backend;
mod config;
mod error;
mod flusher;
mod noop;
mod pending;
#[cfg(feature = "redis")]
mod redis_store;
mod storage;
mod value;

pub use backend::{KvBackend, KvStore, Renewal};
pub use config::{DEFAULT_FLUSH_INTERVAL, MAX_FLUSH_INTERVAL, StorageConfig};
pub use error::{BackendError, Error, Operation, Result};
pub use flusher::{FlushReport, FlusherHandle, RenewalFlusher};
pub use noop::NoopStorage;
pub use pending::PendingRenewals;
#[cfg(feature = "redis")]
pub use redis_store::RedisStore;
pub use storage::{KvSessionStorage, SessionStorage};
pub use value::{SessionData, SessionMap, decode_map, encode_map};
