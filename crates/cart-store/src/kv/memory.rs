//! In-memory key-value store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::error::KvResult;

/// Key-value store that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        MemoryStore {
            entries: RwLock::new(entries),
        }
    }

    /// Returns the number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Checks if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
