//! Key-value store for cached optimized images and short-lived locks.
//!
//! Provides a [`KvStore`] trait with two implementations:
//! - [`RedisStore`] - Production Redis-backed store
//! - [`NullStore`] - No-op implementation for testing/disabled caching
//!
//! [`get_json`] and [`set_json`] layer the JSON codec on top.

mod codec;
mod null_store;
mod redis_store;
mod service;

pub use codec::{get_json, set_json};
pub use null_store::NullStore;
pub use redis_store::RedisStore;
pub use service::{KvError, KvResult, KvStore};

#[cfg(test)]
pub use service::MockKvStore;
