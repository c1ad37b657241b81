//! Key-value store contract and the session adapter built on it.
//!
//! [`KvStore`] is the wire contract of the external store: four commands
//! with Redis semantics. [`KvBackend`] turns session ids into namespaced
//! keys and maps command replies onto session outcomes. It is stateless
//! apart from the prefix and performs no retries; store errors are returned
//! exactly as the client reported them.

use async_trait::async_trait;
use tracing::trace;

use crate::error::BackendError;

/// Minimal command set of the external key-value store.
///
/// Implementations must be safe for concurrent use.
#[async_trait]
pub trait KvStore: Send + Sync + 'static {
    /// `GET key`. Returns `None` when the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError>;

    /// `SETEX key secs value`. Writes the value and its expiry atomically.
    async fn set_ex(&self, key: &str, value: Vec<u8>, secs: u64) -> Result<(), BackendError>;

    /// `EXPIRE key secs`. Returns `false` when the key does not exist.
    async fn expire(&self, key: &str, secs: u64) -> Result<bool, BackendError>;

    /// `DEL key`. Returns the number of keys removed.
    async fn del(&self, key: &str) -> Result<u64, BackendError>;
}

/// Outcome of an expiry extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Renewal {
    /// The record exists and its expiry was reset.
    Extended,
    /// No record exists for the session; nothing was changed.
    Missing,
}

/// Session-level operations over a [`KvStore`].
#[derive(Debug)]
pub struct KvBackend<K> {
    store: K,
    prefix: String,
}

impl<K: KvStore> KvBackend<K> {
    /// Wrap a store, namespacing every key with `prefix`.
    pub fn new(store: K, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &K {
        &self.store
    }

    /// Store key for a session id.
    pub fn key_for(&self, session_id: &str) -> String {
        format!("{}{}", self.prefix, session_id)
    }

    /// Load the stored payload for a session.
    ///
    /// A missing key and an empty value are both reported as `None`.
    pub async fn load(&self, session_id: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let key = self.key_for(session_id);
        let payload = self.store.get(&key).await?;
        trace!(key = %key, found = payload.is_some(), "GET");
        Ok(payload.filter(|bytes| !bytes.is_empty()))
    }

    /// Write the payload and set its expiry in one command.
    pub async fn save(
        &self,
        session_id: &str,
        payload: Vec<u8>,
        ttl_secs: u64,
    ) -> Result<(), BackendError> {
        let key = self.key_for(session_id);
        trace!(key = %key, ttl_secs, bytes = payload.len(), "SETEX");
        self.store.set_ex(&key, payload, ttl_secs).await
    }

    /// Reset the expiry of a stored session without touching its value.
    pub async fn extend_expiry(
        &self,
        session_id: &str,
        ttl_secs: u64,
    ) -> Result<Renewal, BackendError> {
        let key = self.key_for(session_id);
        let existed = self.store.expire(&key, ttl_secs).await?;
        trace!(key = %key, ttl_secs, existed, "EXPIRE");
        Ok(if existed {
            Renewal::Extended
        } else {
            Renewal::Missing
        })
    }

    /// Delete a stored session. Deleting an absent session succeeds.
    pub async fn delete(&self, session_id: &str) -> Result<(), BackendError> {
        let key = self.key_for(session_id);
        let removed = self.store.del(&key).await?;
        trace!(key = %key, removed, "DEL");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapStore {
        values: Mutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl KvStore for MapStore {
        async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
            Ok(self.values.lock().get(key).cloned())
        }

        async fn set_ex(&self, key: &str, value: Vec<u8>, _secs: u64) -> Result<(), BackendError> {
            self.values.lock().insert(key.to_string(), value);
            Ok(())
        }

        async fn expire(&self, key: &str, _secs: u64) -> Result<bool, BackendError> {
            Ok(self.values.lock().contains_key(key))
        }

        async fn del(&self, key: &str) -> Result<u64, BackendError> {
            Ok(u64::from(self.values.lock().remove(key).is_some()))
        }
    }

    #[test]
    fn test_key_for_prefixes_verbatim() {
        let backend = KvBackend::new(MapStore::default(), "sess:");
        assert_eq!(backend.key_for("abc"), "sess:abc");

        let bare = KvBackend::new(MapStore::default(), "");
        assert_eq!(bare.key_for("abc"), "abc");
    }

    #[tokio::test]
    async fn test_empty_value_is_absent() {
        let backend = KvBackend::new(MapStore::default(), "p-");
        backend.save("empty", Vec::new(), 60).await.unwrap();

        assert!(backend.load("empty").await.unwrap().is_none());
        assert!(backend.load("never").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_extend_missing_key() {
        let backend = KvBackend::new(MapStore::default(), "p-");
        assert_eq!(
            backend.extend_expiry("gone", 30).await.unwrap(),
            Renewal::Missing
        );

        backend.save("here", b"{}".to_vec(), 30).await.unwrap();
        assert_eq!(
            backend.extend_expiry("here", 30).await.unwrap(),
            Renewal::Extended
        );
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let backend = KvBackend::new(MapStore::default(), "");
        backend.save("s", b"{}".to_vec(), 30).await.unwrap();

        backend.delete("s").await.unwrap();
        backend.delete("s").await.unwrap();
        assert!(backend.load("s").await.unwrap().is_none());
    }
}
