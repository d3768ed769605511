//! JSON encoding on top of the byte-oriented [`KvStore`].
//!
//! Values are written with `serde_json`, the same codec used for HTTP bodies.
//! A stored value that no longer decodes is treated as a miss.

use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::warn;

use super::service::{KvError, KvResult, KvStore};

pub async fn get_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> KvResult<Option<T>> {
    let Some(bytes) = store.get(key).await? else {
        return Ok(None);
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key, error = %e, "Discarding undecodable cached value");
            Ok(None)
        }
    }
}

pub async fn set_json<T: Serialize + Sync>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> KvResult<()> {
    let bytes = serde_json::to_vec(value).map_err(|e| KvError::OperationError(e.to_string()))?;
    store.set(key, &bytes, ttl).await
}
