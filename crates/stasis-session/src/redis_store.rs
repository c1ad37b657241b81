//! Redis implementation of [`KvStore`].

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::debug;

use crate::backend::KvStore;
use crate::error::BackendError;

/// [`KvStore`] over a Redis connection manager.
///
/// The manager multiplexes commands over one connection and reconnects on
/// failure. Clones share that connection, so a single `RedisStore` can serve
/// every session request and the flusher at once.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to the Redis server at `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, BackendError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        debug!(url = %url, "Connected to Redis");
        Ok(Self { conn })
    }

    /// Wrap an existing connection manager.
    pub fn from_manager(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BackendError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: Vec<u8>, secs: u64) -> Result<(), BackendError> {
        let mut conn = self.conn.clone();
        let _: () = redis::cmd("SETEX")
            .arg(key)
            .arg(secs)
            .arg(value)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn expire(&self, key: &str, secs: u64) -> Result<bool, BackendError> {
        let mut conn = self.conn.clone();
        // EXPIRE replies 1 when the timeout was set, 0 when the key is absent.
        let reply: i64 = redis::cmd("EXPIRE")
            .arg(key)
            .arg(secs)
            .query_async(&mut conn)
            .await?;
        Ok(reply == 1)
    }

    async fn del(&self, key: &str) -> Result<u64, BackendError> {
        let mut conn = self.conn.clone();
        let removed: u64 = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(removed)
    }
}
