//! # Cart Listeners
//!
//! Observer interface for cart changes.
//!
//! Listeners run synchronously on the thread that performed the mutation,
//! in subscription order, before the mutating call returns. They receive
//! the published cart by reference and may read the store, but must not
//! call its mutation methods.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use cart_core::Cart;

/// Receives every published cart.
pub trait CartListener: Send + Sync {
    /// Called after each publish with the new cart.
    fn on_cart_changed(&self, cart: &Cart);
}

impl<F> CartListener for F
where
    F: Fn(&Cart) + Send + Sync,
{
    fn on_cart_changed(&self, cart: &Cart) {
        self(cart)
    }
}

/// Identifies a subscription for [`ListenerRegistry::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Ordered set of listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Arc<dyn CartListener>)>>,
}

impl ListenerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener and returns its id.
    pub fn add(&self, listener: Arc<dyn CartListener>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, listener));
        id
    }

    /// Removes a listener. Returns false if the id was not registered.
    pub fn remove(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Returns the number of registered listeners.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Checks if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Calls every listener with the cart.
    pub fn notify(&self, cart: &Cart) {
        // Snapshot so listeners may subscribe/unsubscribe while being notified
        let listeners: Vec<Arc<dyn CartListener>> = self
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener.on_cart_changed(cart);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Arc<dyn CartListener>)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_notify_in_subscription_order() {
        let registry = ListenerRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            registry.add(Arc::new(move |_: &Cart| seen.lock().unwrap().push(tag)));
        }

        registry.notify(&Cart::new());
        assert_eq!(*seen.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_remove_stops_notifications() {
        let registry = ListenerRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&calls);
        let id = registry.add(Arc::new(move |_: &Cart| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        registry.notify(&Cart::new());
        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        registry.notify(&Cart::new());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }
}
