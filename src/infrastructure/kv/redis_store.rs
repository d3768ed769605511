//! Redis-backed key-value store.

use super::service::{KvError, KvResult, KvStore};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Redis store using a multiplexed `ConnectionManager`.
///
/// Keys are namespaced with `tiny:`. All operations except `connect` are
/// fail-open: errors are logged and never reach callers.
pub struct RedisStore {
    client: ConnectionManager,
    default_ttl: Duration,
    key_prefix: String,
}

impl RedisStore {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// `default_ttl` applies to [`KvStore::set`] calls without an explicit TTL.
    ///
    /// # Errors
    ///
    /// Returns [`KvError::ConnectionError`] if the URL is invalid, the
    /// connection cannot be established, or the PING fails.
    pub async fn connect(redis_url: &str, default_ttl: Duration) -> KvResult<Self> {
        info!("Connecting to Redis");

        let client = Client::open(redis_url)
            .map_err(|e| KvError::ConnectionError(format!("Failed to create Redis client: {}", e)))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| KvError::ConnectionError(format!("Failed to connect to Redis: {}", e)))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| KvError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl,
            key_prefix: "tiny:".to_string(),
        })
    }

    fn build_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

/// Redis rejects a zero expiry, so sub-second TTLs round up.
fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> KvResult<Option<Vec<u8>>> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<Vec<u8>>>(&full_key).await {
            Ok(Some(value)) => {
                debug!(key, "KV HIT");
                Ok(Some(value))
            }
            Ok(None) => {
                debug!(key, "KV MISS");
                Ok(None)
            }
            Err(e) => {
                warn!(key, error = %e, "Redis GET error");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> KvResult<()> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();
        let seconds = ttl_seconds(ttl.unwrap_or(self.default_ttl));

        match conn.set_ex::<_, _, ()>(&full_key, value, seconds).await {
            Ok(()) => {
                debug!(key, ttl = seconds, bytes = value.len(), "KV SET");
            }
            Err(e) => {
                warn!(key, error = %e, "Redis SET error");
            }
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> KvResult<bool> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(&full_key).await {
            Ok(deleted) => Ok(deleted > 0),
            Err(e) => {
                warn!(key, error = %e, "Redis DEL error");
                Ok(false)
            }
        }
    }

    async fn lock(&self, key: &str, ttl: Duration) -> KvResult<bool> {
        let full_key = self.build_key(key);
        let mut conn = self.client.clone();

        let reply = redis::cmd("SET")
            .arg(&full_key)
            .arg(1)
            .arg("NX")
            .arg("EX")
            .arg(ttl_seconds(ttl))
            .query_async::<Option<String>>(&mut conn)
            .await;

        match reply {
            Ok(acquired) => Ok(acquired.is_some()),
            Err(e) => {
                // Fail open so a Redis outage never blocks writes.
                warn!(key, error = %e, "Redis lock error");
                Ok(true)
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
