//! # Store Error Types
//!
//! Error types for cart store operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io::Error / serde_json::Error (adapter internals)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  KvError ← key-value store failure                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                        ▲                                        │
//! │       │                        └── CoreError (malformed stored cart)    │
//! │       ▼                                                                 │
//! │  Host (CLI / UI shell) shows the message                               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use cart_core::CoreError;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for key-value store calls.
pub type KvResult<T> = Result<T, KvError>;

// =============================================================================
// Key-Value Store Errors
// =============================================================================

/// Failures reported by a [`KeyValueStore`](crate::kv::KeyValueStore).
#[derive(Debug, Error)]
pub enum KvError {
    /// Reading or writing the backing medium failed.
    #[error("Storage I/O failed: {0}")]
    Io(String),

    /// The backing medium holds data the adapter cannot read.
    #[error("Storage is corrupt: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for KvError {
    fn from(err: std::io::Error) -> Self {
        KvError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KvError {
    fn from(err: serde_json::Error) -> Self {
        KvError::Corrupt(err.to_string())
    }
}

// =============================================================================
// Store Errors
// =============================================================================

/// Store error type covering everything a store consumer can hit.
#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Context Errors
    // =========================================================================
    /// The cart was requested from a context no store was provided to.
    #[error("Cart store is not initialized; provide a CartStore to the context first")]
    NotInitialized,

    /// A second store was provided to a context that already has one.
    #[error("Cart store is already initialized")]
    AlreadyInitialized,

    // =========================================================================
    // Persistence Errors
    // =========================================================================
    /// The key-value store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    /// The stored cart could not be decoded or breaks a cart invariant.
    #[error("Malformed stored cart: {0}")]
    MalformedData(String),

    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid store configuration.
    #[error("Invalid cart configuration: {0}")]
    InvalidConfig(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Channel send/receive failed.
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// The persistence writer has stopped.
    #[error("Persistence writer is shutting down")]
    ShuttingDown,
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<CoreError> for StoreError {
    fn from(err: CoreError) -> Self {
        StoreError::MalformedData(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::ConfigSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl StoreError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidConfig(_)
                | StoreError::ConfigLoadFailed(_)
                | StoreError::ConfigSaveFailed(_)
        )
    }

    /// Returns true if this error came from reading or decoding storage.
    pub fn is_storage_error(&self) -> bool {
        matches!(self, StoreError::Storage(_) | StoreError::MalformedData(_))
    }
}
