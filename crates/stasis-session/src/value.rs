//! Session value maps and their wire encoding.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::error::{Error, Result};

/// Key/value state of one session.
///
/// Values are `serde_json::Value`, a tagged union of null, bool, number,
/// string, array and object. The crate enables `arbitrary_precision` so
/// numbers survive a store round trip digit for digit.
pub type SessionMap = BTreeMap<String, Value>;

/// Shared, mutable handle to a session map.
///
/// The session manager keeps one handle per live session. Loading into an
/// existing handle replaces the contents in place, so every clone of the
/// handle observes the reloaded data.
#[derive(Debug, Clone, Default)]
pub struct SessionData {
    inner: Arc<RwLock<SessionMap>>,
}

impl SessionData {
    /// Create an empty handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a handle owning the given map.
    pub fn from_map(map: SessionMap) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Replace the whole map, keeping handle identity.
    pub fn replace(&self, map: SessionMap) {
        *self.inner.write() = map;
    }

    /// Copy of the current map.
    pub fn snapshot(&self) -> SessionMap {
        self.inner.read().clone()
    }

    /// Get a single value.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().get(key).cloned()
    }

    /// Set a single value, returning the previous one.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.inner.write().insert(key.into(), value.into())
    }

    /// Remove a single value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.write().remove(key)
    }

    /// Number of keys in the map.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Whether two handles point at the same map.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<SessionMap> for SessionData {
    fn from(map: SessionMap) -> Self {
        Self::from_map(map)
    }
}

/// Serialize a session map to the stored JSON object.
pub fn encode_map(map: &SessionMap) -> Result<Vec<u8>> {
    serde_json::to_vec(map).map_err(Error::Encode)
}

/// Parse a stored payload.
///
/// A JSON `null` payload decodes to `None`, like a missing record.
pub fn decode_map(bytes: &[u8]) -> Result<Option<SessionMap>> {
    serde_json::from_slice::<Option<SessionMap>>(bytes).map_err(Error::Decode)
}
