//! # Key-Value Store
//!
//! The durable storage collaborator the cart is persisted to.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    KeyValueStore Implementations                        │
//! │                                                                         │
//! │                      ┌────────────────────┐                            │
//! │                      │  KeyValueStore     │                            │
//! │                      │  get(key)          │                            │
//! │                      │  set(key, value)   │                            │
//! │                      └─────────┬──────────┘                            │
//! │                 ┌──────────────┴──────────────┐                         │
//! │                 ▼                             ▼                          │
//! │       ┌──────────────────┐          ┌──────────────────┐               │
//! │       │   MemoryStore    │          │  JsonFileStore   │               │
//! │       │  (tests, --memory│          │  (one JSON file, │               │
//! │       │   runs)          │          │   atomic rename) │               │
//! │       └──────────────────┘          └──────────────────┘               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are opaque strings. Neither call has a timeout; callers await
//! completion or failure.

mod file;
mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{CartConfig, StorageBackend};
use crate::error::{KvResult, StoreError, StoreResult};

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// Asynchronous string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`, `None` if nothing is stored.
    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> KvResult<()>;
}

/// Builds the key-value store selected by the configuration.
pub fn open_store(config: &CartConfig) -> StoreResult<Arc<dyn KeyValueStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory cart storage");
            Ok(Arc::new(MemoryStore::new()))
        }
        StorageBackend::File => {
            let path = config.storage_path().ok_or_else(|| {
                StoreError::InvalidConfig("No storage path available for file backend".into())
            })?;
            info!(?path, "Using file cart storage");
            Ok(Arc::new(JsonFileStore::new(path)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_store() {
        let mut config = CartConfig::default();
        config.storage.backend = StorageBackend::Memory;

        let store = open_store(&config).unwrap();
        store.set("k", "v").await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_open_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CartConfig::default();
        config.storage.backend = StorageBackend::File;
        config.storage.path = Some(dir.path().join("cart.json"));

        let store = open_store(&config).unwrap();
        store.set("k", "v").await.unwrap();
        assert!(dir.path().join("cart.json").exists());
    }
}
