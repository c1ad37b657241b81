//! Storage that persists nothing.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::{Error, Operation, Result};
use crate::storage::SessionStorage;
use crate::value::SessionData;

/// A no-op storage for deployments that keep sessions elsewhere.
///
/// Loading hands back whatever map the caller already holds; saving and
/// renewing succeed without effect. Removal and the per-key operations report
/// [`Error::Disabled`] since there is nothing to delete.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

impl NoopStorage {
    /// Create a no-op storage.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SessionStorage for NoopStorage {
    async fn remove_all(&self, _session_id: &str) -> Result<()> {
        Err(Error::Disabled(Operation::RemoveAll))
    }

    async fn get_session(
        &self,
        _session_id: &str,
        _ttl: Duration,
        data: Option<SessionData>,
    ) -> Result<Option<SessionData>> {
        Ok(data)
    }

    async fn set_session(&self, _session_id: &str, _data: &SessionData, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn update_ttl(&self, _session_id: &str, _ttl: Duration) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SessionMap;

    #[tokio::test]
    async fn test_per_key_operations_are_disabled() {
        let storage = NoopStorage::new();
        let ttl = Duration::from_secs(60);

        assert!(matches!(
            storage.new_session(ttl).await,
            Err(Error::Disabled(Operation::New))
        ));
        assert!(matches!(
            storage.get("s", "k").await,
            Err(Error::Disabled(Operation::Get))
        ));
        assert!(matches!(
            storage.data("s").await,
            Err(Error::Disabled(Operation::Data))
        ));
        assert!(matches!(
            storage.get_size("s").await,
            Err(Error::Disabled(Operation::GetSize))
        ));
        assert!(matches!(
            storage.set("s", "k", serde_json::json!(1), ttl).await,
            Err(Error::Disabled(Operation::Set))
        ));
        assert!(matches!(
            storage.set_map("s", SessionMap::new(), ttl).await,
            Err(Error::Disabled(Operation::SetMap))
        ));
        assert!(matches!(
            storage.remove("s", "k").await,
            Err(Error::Disabled(Operation::Remove))
        ));

        let err = storage.remove_all("s").await.unwrap_err();
        assert!(err.is_disabled());
        assert_eq!(err.to_string(), "session storage operation disabled: remove_all");
    }

    #[tokio::test]
    async fn test_get_session_returns_caller_data() {
        let storage = NoopStorage::new();
        let ttl = Duration::from_secs(60);

        assert!(storage.get_session("s", ttl, None).await.unwrap().is_none());

        let data = SessionData::new();
        data.insert("k", "v");
        let loaded = storage
            .get_session("s", ttl, Some(data.clone()))
            .await
            .unwrap()
            .unwrap();
        assert!(loaded.ptr_eq(&data));

        storage.set_session("s", &data, ttl).await.unwrap();
        storage.update_ttl("s", ttl).await.unwrap();
    }
}
