//! # Cart Configuration
//!
//! Configuration management for the cart store.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CART_NAMESPACE=@GoMarketplace                                      │
//! │     CART_STORAGE_BACKEND=file                                          │
//! │     CART_STORAGE_PATH=/tmp/cart.json                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/marketplace-cart/cart.toml (Linux)                       │
//! │     ~/Library/Application Support/com.gomarketplace.cart/cart.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     namespace "@GoMarketplace", file backend in the data dir           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [store]
//! namespace = "@GoMarketplace"
//!
//! [storage]
//! backend = "file"  # file | memory
//! path = "/var/lib/marketplace/cart.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use cart_core::DEFAULT_NAMESPACE;

use crate::error::{StoreError, StoreResult};

// =============================================================================
// Storage Backend
// =============================================================================

/// Which key-value store the cart is persisted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// JSON file on disk (survives restarts).
    #[default]
    File,

    /// Process memory only (tests, throwaway sessions).
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" | "disk" => Ok(StorageBackend::File),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(StoreError::InvalidConfig(format!(
                "Unknown storage backend: '{}'. Valid options: file, memory",
                other
            ))),
        }
    }
}

// =============================================================================
// Settings Sections
// =============================================================================

/// Settings that identify the cart in storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Namespace prefix of the storage key.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            namespace: default_namespace(),
        }
    }
}

/// Where the cart is persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Storage backend.
    #[serde(default)]
    pub backend: StorageBackend,

    /// File path for the file backend.
    /// Defaults to `cart.json` in the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartConfig {
    /// Storage key settings.
    #[serde(default)]
    pub store: StoreSettings,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageSettings,
}

impl CartConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> StoreResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> StoreResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| StoreError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> StoreResult<()> {
        let namespace = self.store.namespace.trim();
        if namespace.is_empty() {
            return Err(StoreError::InvalidConfig(
                "store.namespace must not be empty".into(),
            ));
        }

        if namespace.contains(':') {
            return Err(StoreError::InvalidConfig(format!(
                "store.namespace must not contain ':', got: {}",
                namespace
            )));
        }

        if let Some(ref path) = self.storage.path {
            if path.as_os_str().is_empty() {
                return Err(StoreError::InvalidConfig(
                    "storage.path must not be empty".into(),
                ));
            }
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(namespace) = var("CART_NAMESPACE") {
            debug!(namespace = %namespace, "Overriding namespace from environment");
            self.store.namespace = namespace;
        }

        if let Some(backend) = var("CART_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(parsed) => self.storage.backend = parsed,
                Err(_) => warn!(backend = %backend, "Unknown storage backend in environment"),
            }
        }

        if let Some(path) = var("CART_STORAGE_PATH") {
            debug!(path = %path, "Overriding storage path from environment");
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("cart.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Returns the storage key the cart is loaded from and saved to.
    pub fn storage_key(&self) -> String {
        cart_core::storage_key(self.store.namespace.trim())
    }

    /// Returns the file path for the file backend.
    pub fn storage_path(&self) -> Option<PathBuf> {
        self.storage
            .path
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join("cart.json")))
    }

    /// Returns the storage backend.
    pub fn backend(&self) -> StorageBackend {
        self.storage.backend
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "gomarketplace", "cart")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("file".parse::<StorageBackend>().unwrap(), StorageBackend::File);
        assert_eq!("MEMORY".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = CartConfig::default();
        assert_eq!(config.backend(), StorageBackend::File);
        assert_eq!(config.storage_key(), "@GoMarketplace:cartProducts");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = CartConfig::default();

        config.store.namespace = "  ".to_string();
        assert!(config.validate().is_err());

        config.store.namespace = "@Shop:extra".to_string();
        assert!(config.validate().is_err());

        config.store.namespace = "@Shop".to_string();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage_key(), "@Shop:cartProducts");
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CART_NAMESPACE", "@Test"),
            ("CART_STORAGE_BACKEND", "memory"),
            ("CART_STORAGE_PATH", "/tmp/elsewhere.json"),
        ]
        .into_iter()
        .collect();

        let mut config = CartConfig::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.store.namespace, "@Test");
        assert_eq!(config.backend(), StorageBackend::Memory);
        assert_eq!(
            config.storage_path(),
            Some(PathBuf::from("/tmp/elsewhere.json"))
        );
    }

    #[test]
    fn test_unknown_backend_override_is_ignored() {
        let mut config = CartConfig::default();
        config.apply_overrides(|name| {
            (name == "CART_STORAGE_BACKEND").then(|| "redis".to_string())
        });
        assert_eq!(config.backend(), StorageBackend::File);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cart.toml");

        let mut config = CartConfig::default();
        config.store.namespace = "@Saved".to_string();
        config.storage.backend = StorageBackend::Memory;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: CartConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.store.namespace, "@Saved");
        assert_eq!(loaded.backend(), StorageBackend::Memory);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CartConfig = toml::from_str("[storage]\nbackend = \"memory\"\n").unwrap();
        assert_eq!(config.store.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.backend(), StorageBackend::Memory);
        assert!(config.storage.path.is_none());
    }
}
