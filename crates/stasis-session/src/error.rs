//! Error types for session storage operations.

use std::fmt;
use std::time::Duration;

/// Storage operations that a backend may leave unimplemented.
///
/// The batching storage only supports whole-session operations. The per-key
/// operations below are part of the uniform storage interface but report
/// [`Error::Disabled`] instead of doing anything. `RemoveAll` is only
/// disabled on storages that hold nothing to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create a session id.
    New,
    /// Read a single key of a session.
    Get,
    /// Read the whole key/value map of a session.
    Data,
    /// Count the keys of a session.
    GetSize,
    /// Write a single key of a session.
    Set,
    /// Write several keys of a session.
    SetMap,
    /// Delete a single key of a session.
    Remove,
    /// Delete a whole session.
    RemoveAll,
}

impl Operation {
    /// Stable name of the operation, used in the error message.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Get => "get",
            Self::Data => "data",
            Self::GetSize => "get_size",
            Self::Set => "set",
            Self::SetMap => "set_map",
            Self::Remove => "remove",
            Self::RemoveAll => "remove_all",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure reported by the key-value store client.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Error from the Redis client.
    #[cfg(feature = "redis")]
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    /// The store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Error type for session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The key-value store failed; the error is passed through unchanged.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The stored payload is not a valid session map.
    #[error("failed to decode session payload: {0}")]
    Decode(#[source] serde_json::Error),

    /// The session map could not be serialized.
    #[error("failed to encode session payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// The operation is not supported by this storage.
    #[error("session storage operation disabled: {0}")]
    Disabled(Operation),

    /// The TTL is shorter than the one-second resolution of the store.
    #[error("invalid session TTL {0:?}: must be at least one second")]
    InvalidTtl(Duration),

    /// The session id is empty.
    #[error("invalid session id: must not be empty")]
    InvalidSessionId,
}

impl Error {
    /// Whether this is the "operation disabled" sentinel.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled(_))
    }
}

/// Result type for session storage operations.
pub type Result<T> = std::result::Result<T, Error>;
