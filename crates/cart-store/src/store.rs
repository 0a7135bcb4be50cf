//! # Cart Store
//!
//! Holds the live cart, serializes mutations, publishes to listeners and
//! hands every new cart to the persistence writer.
//!
//! ## Mutation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  Caller                 CartStore                    Side Effects       │
//! │  ──────                 ─────────                    ────────────       │
//! │                                                                         │
//! │  add_to_cart(item) ──┐                                                  │
//! │  increment(id) ──────┼─► publish lock (one mutation at a time)          │
//! │  decrement(id) ──────┘        │                                         │
//! │                               ▼                                         │
//! │                         state lock:                                     │
//! │                           read latest cart                              │
//! │                           cart.apply(op)  (cart-core, pure)             │
//! │                           replace cart                                  │
//! │                           enqueue snapshot ────────► PersistWriter      │
//! │                               │                      (async, FIFO)      │
//! │                               ▼                                         │
//! │                         notify listeners ──────────► on_cart_changed    │
//! │                               │                                         │
//! │                               ▼                                         │
//! │                         return CartChange (never waits for storage)     │
//! │                                                                         │
//! │  View cart ──────────► products() / with_cart()  (state lock only)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The publish lock makes read-compute-publish a single step, so no mutation
//! computes from a stale cart. The state lock is held only while the cart is
//! read or replaced, which lets listeners call [`CartStore::products`].
//! Snapshots are enqueued under the state lock, so storage receives them in
//! publish order.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use cart_core::{Cart, CartChange, CartOp, NewCartItem};

use crate::error::StoreResult;
use crate::kv::KeyValueStore;
use crate::listener::{CartListener, ListenerRegistry, SubscriptionId};
use crate::writer::{PersistHandle, PersistStatus, PersistWriter};

/// The cart state manager.
pub struct CartStore {
    /// Current cart.
    state: Mutex<Cart>,

    /// Serializes mutations, including listener notification.
    publish: Mutex<()>,

    /// Registered observers.
    listeners: ListenerRegistry,

    /// Store the cart is loaded from.
    kv: Arc<dyn KeyValueStore>,

    /// Storage key, fixed for the lifetime of the store.
    key: String,

    /// Persistence writer handle.
    persist: PersistHandle,
}

impl CartStore {
    /// Creates a store with an empty cart and spawns its persistence writer.
    ///
    /// Must be called from within a Tokio runtime. Call [`CartStore::load`]
    /// once afterwards to restore a previously saved cart.
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let persist = PersistWriter::spawn(Arc::clone(&kv), key.clone());
        Self::with_writer(kv, key, persist)
    }

    /// Creates a store that persists through an existing writer handle.
    pub fn with_writer(
        kv: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        persist: PersistHandle,
    ) -> Self {
        CartStore {
            state: Mutex::new(Cart::new()),
            publish: Mutex::new(()),
            listeners: ListenerRegistry::new(),
            kv,
            key: key.into(),
            persist,
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Restores the saved cart from the key-value store.
    ///
    /// ## Behavior
    /// - Nothing stored: the cart stays as it is, returns `Ok(false)`
    /// - Valid cart stored: replaces the whole cart, queues it for writing
    ///   like any other publish, notifies listeners, returns `Ok(true)`
    /// - Storage error or malformed value: returns the error and leaves the
    ///   cart untouched
    pub async fn load(&self) -> StoreResult<bool> {
        debug!(key = %self.key, "Loading cart");

        let Some(raw) = self.kv.get(&self.key).await? else {
            debug!(key = %self.key, "No saved cart");
            return Ok(false);
        };

        let loaded = Cart::from_json(&raw)?;

        let _publish = lock(&self.publish);
        let snapshot = {
            let mut cart = lock(&self.state);
            *cart = loaded;

            // Storage ends on this cart even if a mutation ran during `get`
            if let Err(e) = self.persist.enqueue(cart.clone()) {
                warn!(?e, "Loaded cart not queued for persistence");
            }

            cart.clone()
        };
        self.listeners.notify(&snapshot);

        info!(
            items = snapshot.len(),
            quantity = snapshot.total_quantity(),
            "Cart restored"
        );
        Ok(true)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Adds one unit of a product.
    ///
    /// A product already in the cart takes the incoming title, image and
    /// price and gains one unit in place; a new product is appended with
    /// quantity 1.
    pub fn add_to_cart(&self, item: NewCartItem) -> CartChange {
        self.mutate(CartOp::Add(item))
    }

    /// Adds one unit to a product in the cart. Unknown ids are a no-op.
    pub fn increment(&self, id: &str) -> CartChange {
        self.mutate(CartOp::Increment(id.to_string()))
    }

    /// Removes one unit of a product, dropping the line when it reaches
    /// zero. Unknown ids are a no-op.
    pub fn decrement(&self, id: &str) -> CartChange {
        self.mutate(CartOp::Decrement(id.to_string()))
    }

    /// Applies an operation: compute, publish, enqueue one persist.
    ///
    /// Every call, including a no-op, publishes and persists the resulting
    /// cart exactly once.
    pub fn mutate(&self, op: CartOp) -> CartChange {
        let _publish = lock(&self.publish);

        let (snapshot, change) = {
            let mut cart = lock(&self.state);
            let (next, change) = cart.apply(&op);
            *cart = next;

            if let Err(e) = self.persist.enqueue(cart.clone()) {
                warn!(?e, op = op.name(), "Cart change not queued for persistence");
            }

            (cart.clone(), change)
        };

        debug!(
            op = op.name(),
            id = %op.id(),
            ?change,
            items = snapshot.len(),
            "Cart updated"
        );

        self.listeners.notify(&snapshot);
        change
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Returns a snapshot of the current cart.
    pub fn products(&self) -> Cart {
        lock(&self.state).clone()
    }

    /// Executes a function with read access to the cart.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let units = store.with_cart(|cart| cart.total_quantity());
    /// ```
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        let cart = lock(&self.state);
        f(&cart)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    /// Registers a listener for every future publish.
    pub fn subscribe(&self, listener: impl CartListener + 'static) -> SubscriptionId {
        self.listeners.add(Arc::new(listener))
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.remove(id)
    }

    // =========================================================================
    // Persistence Control
    // =========================================================================

    /// Waits until every change made so far has been written (or failed).
    pub async fn flush(&self) -> StoreResult<()> {
        self.persist.flush().await
    }

    /// Returns persistence counters.
    pub async fn persist_status(&self) -> PersistStatus {
        self.persist.status().await
    }

    /// Writes pending changes and stops the persistence writer.
    ///
    /// Later mutations still update and publish the cart but are not saved.
    pub async fn shutdown(&self) -> StoreResult<()> {
        self.persist.shutdown().await
    }
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("items", &self.with_cart(|cart| cart.len()))
            .field("listeners", &self.listeners)
            .finish()
    }
}

/// Locks a mutex, recovering the value if a panicking holder poisoned it.
///
/// Every holder swaps in a complete `Cart`, so a poisoned value is still a
/// valid cart.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const KEY: &str = "@GoMarketplace:cartProducts";

    fn shirt() -> NewCartItem {
        NewCartItem::new("a", "Shirt", "shirt.png", 10.0)
    }

    #[tokio::test]
    async fn test_add_publishes_synchronously() {
        let store = CartStore::new(Arc::new(MemoryStore::new()), KEY);

        let change = store.add_to_cart(shirt());

        assert_eq!(change, CartChange::Appended);
        assert_eq!(store.products().items(), &[shirt().with_quantity(1)]);
    }

    #[tokio::test]
    async fn test_listener_sees_each_publish() {
        let store = CartStore::new(Arc::new(MemoryStore::new()), KEY);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        store.subscribe(move |cart: &Cart| {
            sink.lock().unwrap().push(cart.total_quantity());
        });

        store.add_to_cart(shirt());
        store.increment("a");
        store.decrement("missing");
        store.decrement("a");

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 2, 1]);
    }

    #[tokio::test]
    async fn test_listener_may_read_store() {
        let store = Arc::new(CartStore::new(Arc::new(MemoryStore::new()), KEY));
        let reads = Arc::new(AtomicUsize::new(0));

        let reader = Arc::downgrade(&store);
        let counter = Arc::clone(&reads);
        store.subscribe(move |_: &Cart| {
            if let Some(store) = reader.upgrade() {
                counter.fetch_add(store.products().len(), Ordering::SeqCst);
            }
        });

        store.add_to_cart(shirt());
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let store = CartStore::new(Arc::new(MemoryStore::new()), KEY);
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let id = store.subscribe(move |_: &Cart| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        store.add_to_cart(shirt());
        assert!(store.unsubscribe(id));
        store.add_to_cart(shirt());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_every_operation_persists_once() {
        let kv = Arc::new(MemoryStore::new());
        let store = CartStore::new(kv.clone(), KEY);

        store.add_to_cart(shirt());
        store.decrement("missing");
        store.increment("missing");
        store.decrement("a");
        store.flush().await.unwrap();

        let status = store.persist_status().await;
        assert_eq!(status.writes_completed, 4);

        let stored = kv.get(KEY).await.unwrap().unwrap();
        assert_eq!(stored, "[]");
    }

    #[tokio::test]
    async fn test_load_missing_key_keeps_empty_cart() {
        let store = CartStore::new(Arc::new(MemoryStore::new()), KEY);

        assert!(!store.load().await.unwrap());
        assert!(store.products().is_empty());
    }

    #[tokio::test]
    async fn test_load_queues_loaded_cart() {
        let saved = r#"[{"id":"x","title":"Mug","image_url":"","price":8.5,"quantity":3}]"#;
        let store = CartStore::new(Arc::new(MemoryStore::with_entry(KEY, saved)), KEY);

        store.load().await.unwrap();
        store.flush().await.unwrap();

        assert_eq!(store.persist_status().await.writes_completed, 1);
    }

    #[tokio::test]
    async fn test_debug_output() {
        let store = CartStore::new(Arc::new(MemoryStore::new()), KEY);
        store.add_to_cart(shirt());

        let debug = format!("{:?}", store);
        assert!(debug.contains("cartProducts"));
        assert!(debug.contains("items: 1"));
    }
}
