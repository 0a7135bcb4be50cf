//! # cart-store: Cart State and Persistence
//!
//! This crate owns the live cart for a marketplace client and keeps a
//! durable copy of it in a key-value store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Cart Store Data Flow                            │
//! │                                                                         │
//! │  Host (cart-cli, UI shell)                                             │
//! │       │  context.cart()?.add_to_cart(item)                             │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    cart-store (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  CartContext  │    │   CartStore   │    │  Listeners   │  │   │
//! │  │   │ (context.rs)  │───►│  (store.rs)   │───►│(listener.rs) │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ snapshots                     │   │
//! │  │                        ┌───────▼───────┐    ┌──────────────┐  │   │
//! │  │                        │ PersistWriter │───►│ KeyValueStore│  │   │
//! │  │                        │  (writer.rs)  │    │   (kv/)      │  │   │
//! │  │                        └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cart.json  {"@GoMarketplace:cartProducts": "[...]"}                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`store`] - `CartStore`: serialized mutations, publish, load
//! - [`listener`] - `CartListener` observer interface
//! - [`writer`] - Background persistence task and its handle
//! - [`kv`] - `KeyValueStore` trait and adapters
//! - [`context`] - `CartContext` for handing the store to consumers
//! - [`config`] - Configuration (cart.toml + environment)
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use cart_store::{kv, CartConfig, CartContext, CartStore};
//! use cart_core::NewCartItem;
//!
//! let config = CartConfig::load_or_default(None);
//! let store = Arc::new(CartStore::new(kv::open_store(&config)?, config.storage_key()));
//! store.load().await?;
//!
//! let context = CartContext::new();
//! context.provide(store)?;
//!
//! context.cart()?.add_to_cart(NewCartItem::new("a", "Shirt", "", 10.0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod context;
pub mod error;
pub mod kv;
pub mod listener;
pub mod store;
pub mod writer;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{CartConfig, StorageBackend};
pub use context::CartContext;
pub use error::{KvError, StoreError, StoreResult};
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use listener::{CartListener, SubscriptionId};
pub use store::CartStore;
pub use writer::{PersistHandle, PersistStatus, PersistWriter};
