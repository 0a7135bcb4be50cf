//! # Cart Context
//!
//! The handle consumers use to reach the cart store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Context Lifecycle                                    │
//! │                                                                         │
//! │  Host startup                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  let context = Arc::new(CartContext::new());   ← passed to consumers   │
//! │       │                                                                 │
//! │       │   context.cart()  →  Err(NotInitialized)                       │
//! │       ▼                                                                 │
//! │  context.provide(Arc::new(CartStore::new(kv, key)))?                   │
//! │       │                                                                 │
//! │       │   context.cart()  →  Ok(Arc<CartStore>)                        │
//! │       │   context.provide(..) → Err(AlreadyInitialized)                │
//! │       ▼                                                                 │
//! │  Process exit (no teardown)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Asking for the cart before a store was provided is a call-order bug in
//! the host, so it fails loudly instead of handing out an empty cart.

use std::sync::{Arc, OnceLock};

use crate::error::{StoreError, StoreResult};
use crate::store::CartStore;

/// Holder for the single cart store of a host.
#[derive(Debug, Default)]
pub struct CartContext {
    store: OnceLock<Arc<CartStore>>,
}

impl CartContext {
    /// Creates a context with no store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the store. Fails if one is already installed.
    pub fn provide(&self, store: Arc<CartStore>) -> StoreResult<()> {
        self.store
            .set(store)
            .map_err(|_| StoreError::AlreadyInitialized)
    }

    /// Returns the store, or [`StoreError::NotInitialized`] if none was
    /// provided.
    pub fn cart(&self) -> StoreResult<Arc<CartStore>> {
        self.store.get().cloned().ok_or(StoreError::NotInitialized)
    }

    /// Returns true once a store has been provided.
    pub fn is_initialized(&self) -> bool {
        self.store.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[tokio::test]
    async fn test_cart_before_provide_fails() {
        let context = CartContext::new();

        assert!(!context.is_initialized());
        assert!(matches!(context.cart(), Err(StoreError::NotInitialized)));
    }

    #[tokio::test]
    async fn test_provide_once() {
        let context = CartContext::new();
        let store = Arc::new(CartStore::new(Arc::new(MemoryStore::new()), "k"));

        context.provide(Arc::clone(&store)).unwrap();
        assert!(context.is_initialized());
        assert!(Arc::ptr_eq(&context.cart().unwrap(), &store));

        let second = Arc::new(CartStore::new(Arc::new(MemoryStore::new()), "k"));
        assert!(matches!(
            context.provide(second),
            Err(StoreError::AlreadyInitialized)
        ));
    }
}
