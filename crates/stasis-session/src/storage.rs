//! Session storage interface and the key-value backed implementation.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, trace};

use crate::backend::{KvBackend, KvStore};
use crate::config::StorageConfig;
use crate::error::{Error, Operation, Result};
use crate::flusher::{FlushReport, FlusherHandle, RenewalFlusher};
use crate::pending::PendingRenewals;
use crate::value::{SessionData, SessionMap, decode_map, encode_map};

/// Storage contract used by the session manager.
///
/// The whole-session operations (`get_session`, `set_session`, `update_ttl`,
/// `remove_all`) are required. The per-key operations default to
/// [`Error::Disabled`]; a storage that does not override them must keep
/// returning that sentinel so callers can tell "not supported here" apart
/// from an empty result.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Create a new session id.
    async fn new_session(&self, _ttl: Duration) -> Result<String> {
        Err(Error::Disabled(Operation::New))
    }

    /// Read one key of a session.
    async fn get(&self, _session_id: &str, _key: &str) -> Result<Option<Value>> {
        Err(Error::Disabled(Operation::Get))
    }

    /// Read all keys of a session.
    async fn data(&self, _session_id: &str) -> Result<SessionMap> {
        Err(Error::Disabled(Operation::Data))
    }

    /// Number of keys stored for a session.
    async fn get_size(&self, _session_id: &str) -> Result<usize> {
        Err(Error::Disabled(Operation::GetSize))
    }

    /// Write one key of a session.
    async fn set(&self, _session_id: &str, _key: &str, _value: Value, _ttl: Duration) -> Result<()> {
        Err(Error::Disabled(Operation::Set))
    }

    /// Write several keys of a session.
    async fn set_map(&self, _session_id: &str, _data: SessionMap, _ttl: Duration) -> Result<()> {
        Err(Error::Disabled(Operation::SetMap))
    }

    /// Delete one key of a session.
    async fn remove(&self, _session_id: &str, _key: &str) -> Result<()> {
        Err(Error::Disabled(Operation::Remove))
    }

    /// Delete the whole session. Deleting an unknown session succeeds.
    async fn remove_all(&self, session_id: &str) -> Result<()>;

    /// Load a session when a request starts.
    ///
    /// Returns `Ok(None)` when no record exists; the caller treats that as a
    /// fresh or expired session. An error means the state is unknown and
    /// must not be read as "not found". When `data` is given its contents
    /// are replaced in place and the same handle is returned.
    async fn get_session(
        &self,
        session_id: &str,
        ttl: Duration,
        data: Option<SessionData>,
    ) -> Result<Option<SessionData>>;

    /// Persist the full session map with a fresh TTL.
    ///
    /// Called when a dirty session is closed.
    async fn set_session(&self, session_id: &str, data: &SessionData, ttl: Duration) -> Result<()>;

    /// Extend the TTL of an unchanged session.
    ///
    /// Called when a clean session is closed. Must not wait on the network.
    async fn update_ttl(&self, session_id: &str, ttl: Duration) -> Result<()>;
}

fn check_session_id(session_id: &str) -> Result<()> {
    if session_id.is_empty() {
        return Err(Error::InvalidSessionId);
    }
    Ok(())
}

/// Shared state behind [`KvSessionStorage`] clones.
struct StorageInner<K> {
    backend: Arc<KvBackend<K>>,
    pending: Arc<PendingRenewals>,
    flusher: Arc<RenewalFlusher<K>>,
    handle: Mutex<Option<FlusherHandle>>,
    config: StorageConfig,
}

/// Session storage on an external key-value store with batched TTL renewal.
///
/// Loads, saves and removals hit the store immediately. TTL renewals are
/// queued in memory and written by a background flusher once per
/// `flush_interval`, so a session read many times between flushes costs a
/// single `EXPIRE`. A renewal asking for less than one flush interval is
/// dropped, since the record could expire before the flush runs.
///
/// Clones share the same queue and flusher. The flusher stops on
/// [`shutdown`](Self::shutdown) or when the last clone is dropped.
pub struct KvSessionStorage<K: KvStore> {
    inner: Arc<StorageInner<K>>,
}

impl<K: KvStore> KvSessionStorage<K> {
    /// Create the storage and start its flusher.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn new(store: K, config: StorageConfig) -> Self {
        let backend = Arc::new(KvBackend::new(store, config.key_prefix.clone()));
        let pending = Arc::new(PendingRenewals::new());
        let flusher = Arc::new(RenewalFlusher::new(
            Arc::clone(&backend),
            Arc::clone(&pending),
        ));
        let handle = FlusherHandle::spawn(Arc::clone(&flusher), config.flush_interval);

        debug!(
            prefix = %config.key_prefix,
            flush_interval_ms = config.flush_interval.as_millis() as u64,
            "Session storage started"
        );

        Self {
            inner: Arc::new(StorageInner {
                backend,
                pending,
                flusher,
                handle: Mutex::new(Some(handle)),
                config,
            }),
        }
    }

    /// Get the storage configuration.
    pub fn config(&self) -> &StorageConfig {
        &self.inner.config
    }

    /// Interval between renewal flushes.
    pub fn flush_interval(&self) -> Duration {
        self.inner.config.flush_interval
    }

    /// The session adapter over the store.
    pub fn backend(&self) -> &KvBackend<K> {
        &self.inner.backend
    }

    /// Renewals waiting for the next flush.
    pub fn pending_renewals(&self) -> &PendingRenewals {
        &self.inner.pending
    }

    /// Flush pending renewals now instead of waiting for the next tick.
    ///
    /// Never overlaps with a scheduled flush.
    pub async fn flush_pending(&self) -> FlushReport {
        self.inner.flusher.flush().await
    }

    /// Stop the background flusher and wait for it to exit.
    ///
    /// Pending renewals are left unflushed; call
    /// [`flush_pending`](Self::flush_pending) first to apply them.
    pub async fn shutdown(&self) {
        let handle = self.inner.handle.lock().take();
        if let Some(mut handle) = handle {
            handle.shutdown().await;
        }
    }
}

impl<K: KvStore> Clone for KvSessionStorage<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl<K: KvStore> SessionStorage for KvSessionStorage<K> {
    async fn remove_all(&self, session_id: &str) -> Result<()> {
        check_session_id(session_id)?;
        debug!(session_id = %session_id, "Removing session");
        self.inner.backend.delete(session_id).await?;
        Ok(())
    }

    async fn get_session(
        &self,
        session_id: &str,
        ttl: Duration,
        data: Option<SessionData>,
    ) -> Result<Option<SessionData>> {
        check_session_id(session_id)?;
        trace!(session_id = %session_id, ttl_secs = ttl.as_secs(), "Loading session");

        let Some(payload) = self.inner.backend.load(session_id).await? else {
            return Ok(None);
        };
        let Some(map) = decode_map(&payload)? else {
            return Ok(None);
        };

        match data {
            Some(existing) => {
                existing.replace(map);
                Ok(Some(existing))
            }
            None => Ok(Some(SessionData::from_map(map))),
        }
    }

    async fn set_session(&self, session_id: &str, data: &SessionData, ttl: Duration) -> Result<()> {
        check_session_id(session_id)?;
        let ttl_secs = ttl.as_secs();
        if ttl_secs == 0 {
            return Err(Error::InvalidTtl(ttl));
        }

        let payload = encode_map(&data.snapshot())?;
        debug!(
            session_id = %session_id,
            ttl_secs,
            bytes = payload.len(),
            "Saving session"
        );
        self.inner.backend.save(session_id, payload, ttl_secs).await?;
        Ok(())
    }

    async fn update_ttl(&self, session_id: &str, ttl: Duration) -> Result<()> {
        check_session_id(session_id)?;
        let ttl_secs = ttl.as_secs();
        // EXPIRE with 0 seconds deletes the key, so sub-second TTLs are
        // dropped even when the flush interval is shorter still.
        if ttl < self.inner.config.flush_interval || ttl_secs == 0 {
            trace!(
                session_id = %session_id,
                ttl_ms = ttl.as_millis() as u64,
                "TTL shorter than flush interval, renewal skipped"
            );
            return Ok(());
        }

        self.inner.pending.put(session_id, ttl_secs);
        trace!(session_id = %session_id, ttl_secs, "Renewal queued");
        Ok(())
    }
}
