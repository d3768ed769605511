//! No-op key-value store for testing or disabled caching.

use super::service::{KvResult, KvStore};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A store that keeps nothing.
///
/// Used when Redis is not configured or unreachable at startup. Reads always
/// miss, writes succeed without storing, and every lock is granted.
pub struct NullStore;

impl NullStore {
    pub fn new() -> Self {
        debug!("Using NullStore (caching disabled)");
        Self
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for NullStore {
    async fn get(&self, _key: &str) -> KvResult<Option<Vec<u8>>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Option<Duration>) -> KvResult<()> {
        Ok(())
    }

    async fn del(&self, _key: &str) -> KvResult<bool> {
        Ok(false)
    }

    async fn lock(&self, _key: &str, _ttl: Duration) -> KvResult<bool> {
        Ok(true)
    }

    async fn health_check(&self) -> bool {
        true
    }
}
