//! Key-value store trait and error types.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the key-value backend.
#[derive(Debug, Error)]
pub enum KvError {
    #[error("Key-value connection error: {0}")]
    ConnectionError(String),
    #[error("Key-value operation error: {0}")]
    OperationError(String),
}

/// Result type for key-value operations.
pub type KvResult<T> = Result<T, KvError>;

/// Key-value store used for caching optimized images and short-lived locks.
///
/// Implementations must be thread-safe and fail open: a backend error is
/// logged and reported as a miss (or a no-op for writes) so requests fall back
/// to the relational store.
///
/// # Implementations
///
/// - [`crate::infrastructure::kv::RedisStore`] - Redis-backed store with TTL support
/// - [`crate::infrastructure::kv::NullStore`] - No-op store for disabled caching
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Reads a value.
    ///
    /// Returns `Ok(None)` on miss or backend error.
    async fn get(&self, key: &str) -> KvResult<Option<Vec<u8>>>;

    /// Writes a value with an optional TTL (implementation default if `None`).
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> KvResult<()>;

    /// Removes a key. Returns true if something was removed.
    async fn del(&self, key: &str) -> KvResult<bool>;

    /// Sets `key` only if absent, expiring after `ttl`.
    ///
    /// Returns true when the caller acquired the lock.
    async fn lock(&self, key: &str, ttl: Duration) -> KvResult<bool>;

    /// Checks if the backend is reachable.
    async fn health_check(&self) -> bool;
}
