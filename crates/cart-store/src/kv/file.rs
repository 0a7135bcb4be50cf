//! # JSON File Store
//!
//! Keeps every key in one JSON object on disk.
//!
//! ```text
//! cart.json
//! {
//!   "@GoMarketplace:cartProducts": "[{\"id\":\"a\",...}]"
//! }
//! ```
//!
//! ## Write Path
//! 1. Read the current object (missing file = empty object)
//! 2. Insert the key
//! 3. Write `cart.json.tmp`, then rename over `cart.json`
//!
//! The rename keeps a crash mid-write from leaving a half-written file.
//! Writes go through an async mutex so two sets never interleave their
//! read-modify-write.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::KeyValueStore;
use crate::error::{KvError, KvResult};

/// Key-value store backed by a single JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Creates a store for the given file. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> KvResult<BTreeMap<String, String>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&contents).map_err(|e| {
            KvError::Corrupt(format!("{}: {}", self.path.display(), e))
        })
    }

    async fn write_entries(&self, entries: &BTreeMap<String, String>) -> KvResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let contents = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.tmp_path();

        tokio::fs::write(&tmp_path, contents).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        let mut entries = self.read_entries().await?;
        Ok(entries.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> KvResult<()> {
        let _guard = self.write_lock.lock().await;

        // A corrupt file is reported rather than overwritten, other keys may live in it
        let mut entries = self.read_entries().await?;
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries).await?;

        debug!(path = ?self.path, key = %key, bytes = value.len(), "Wrote key to file store");
        Ok(())
    }
}
