pub mod disk;
pub mod memory;

use crate::core::cache::KeyValueStore;
use crate::core::config::AppConfig;
use disk::DiskStore;
use memory::MemoryStore;
use std::sync::Arc;
use tracing::warn;

/// Opens the persistent store for the configured data directory. Falls back to
/// a process-local store when the directory cannot be opened.
pub fn open_store(config: &AppConfig) -> Arc<dyn KeyValueStore> {
    let opened = config
        .data_path()
        .and_then(|path| DiskStore::open(&path.join("cache")));

    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!(error = %e, "Falling back to in-memory store");
            Arc::new(MemoryStore::new())
        }
    }
}
