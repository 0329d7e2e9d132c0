//! Key-value persistence abstractions shared by the rate cache and favorites.

use anyhow::Result;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

/// Synchronous string-keyed blob store that survives process restarts.
///
/// Writes must be durable when `set`/`remove` return; callers rely on
/// write-through semantics and never batch.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Reads and decodes a JSON record. Missing keys, store errors and records
/// that fail to decode are all reported as `None`.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!(key, "Store MISS");
            return None;
        }
        Err(e) => {
            warn!(key, error = %e, "Store read failed");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => {
            debug!(key, "Store HIT");
            Some(value)
        }
        Err(e) => {
            warn!(key, error = %e, "Discarding unreadable record");
            None
        }
    }
}

pub fn write_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)?;
    debug!(key, "Store PUT");
    Ok(())
}
