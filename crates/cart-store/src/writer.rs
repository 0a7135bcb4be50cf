//! # Persistence Writer
//!
//! Background task that writes cart snapshots to the key-value store.
//!
//! ## Write Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Persistence Writer Flow                              │
//! │                                                                         │
//! │  CartStore mutation (sync, holds state lock)                           │
//! │       │                                                                 │
//! │       │ PersistHandle::enqueue(snapshot)   ← never blocks              │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               unbounded mpsc (FIFO, publish order)              │   │
//! │  │   Save(cart#1) │ Save(cart#2) │ Flush(ack) │ Save(cart#3) │ ... │   │
//! │  └────────────────────────────┬────────────────────────────────────┘   │
//! │                               │                                         │
//! │                               ▼                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    PersistWriter::run                           │   │
//! │  │                                                                 │   │
//! │  │  Save(cart)   → encode JSON → kv.set(key, json)                 │   │
//! │  │                 ok:  writes_completed += 1                      │   │
//! │  │                 err: writes_failed += 1, last_error, log        │   │
//! │  │  Flush(ack)   → ack once every earlier Save finished            │   │
//! │  │  Shutdown(ack)→ ack and stop                                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  RULES:                                                                │
//! │  • One write per mutation, no batching or coalescing                   │
//! │  • No retry: a failed write leaves storage behind until the next one   │
//! │  • No timeout, no cancellation of an in-flight write                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes are applied strictly in the order they were enqueued, so once the
//! queue drains the stored value equals the last published cart.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, error, info};

use cart_core::Cart;

use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;

// =============================================================================
// Persist Status
// =============================================================================

/// Counters describing how persistence has gone so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistStatus {
    /// Writes that reached the key-value store.
    pub writes_completed: u64,

    /// Writes that failed.
    pub writes_failed: u64,

    /// Message of the most recent failure.
    pub last_error: Option<String>,
}

impl PersistStatus {
    /// Returns true if the last write attempt failed.
    pub fn is_diverged(&self) -> bool {
        self.last_error.is_some()
    }
}

// =============================================================================
// Requests
// =============================================================================

enum PersistRequest {
    Save(Cart),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

// =============================================================================
// Persist Writer
// =============================================================================

/// Owns the key-value store writes for one cart key.
pub struct PersistWriter {
    /// Destination store.
    kv: Arc<dyn KeyValueStore>,

    /// Storage key for the cart.
    key: String,

    /// Incoming requests.
    rx: mpsc::UnboundedReceiver<PersistRequest>,

    /// Shared status, also read through the handle.
    status: Arc<RwLock<PersistStatus>>,
}

/// Handle for feeding and controlling the writer.
#[derive(Clone)]
pub struct PersistHandle {
    tx: mpsc::UnboundedSender<PersistRequest>,
    status: Arc<RwLock<PersistStatus>>,
}

impl std::fmt::Debug for PersistHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistHandle")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl PersistHandle {
    /// Queues a snapshot for writing. Returns immediately.
    pub fn enqueue(&self, cart: Cart) -> StoreResult<()> {
        self.tx
            .send(PersistRequest::Save(cart))
            .map_err(|_| StoreError::ShuttingDown)
    }

    /// Waits until every snapshot queued before this call has been written
    /// (or has failed).
    pub async fn flush(&self) -> StoreResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(PersistRequest::Flush(ack_tx))
            .map_err(|_| StoreError::ShuttingDown)?;
        ack_rx
            .await
            .map_err(|_| StoreError::ChannelError("Flush ack dropped".into()))
    }

    /// Writes everything queued so far, then stops the writer.
    pub async fn shutdown(&self) -> StoreResult<()> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(PersistRequest::Shutdown(ack_tx))
            .map_err(|_| StoreError::ShuttingDown)?;
        ack_rx
            .await
            .map_err(|_| StoreError::ChannelError("Shutdown ack dropped".into()))
    }

    /// Returns the current persistence status.
    pub async fn status(&self) -> PersistStatus {
        self.status.read().await.clone()
    }

    /// Returns true once the writer has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl PersistWriter {
    /// Creates a writer and returns it with its handle.
    pub fn new(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> (Self, PersistHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let status = Arc::new(RwLock::new(PersistStatus::default()));

        let writer = PersistWriter {
            kv,
            key: key.into(),
            rx,
            status: Arc::clone(&status),
        };

        (writer, PersistHandle { tx, status })
    }

    /// Creates a writer and spawns it on the current Tokio runtime.
    ///
    /// Must be called from within a runtime.
    pub fn spawn(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> PersistHandle {
        let (writer, handle) = Self::new(kv, key);
        tokio::spawn(writer.run());
        handle
    }

    /// Runs the writer loop until shutdown or until every handle is dropped.
    ///
    /// This should be spawned as a background task.
    pub async fn run(mut self) {
        info!(key = %self.key, "Persistence writer starting");

        while let Some(request) = self.rx.recv().await {
            match request {
                PersistRequest::Save(cart) => self.write(&cart).await,
                PersistRequest::Flush(ack) => {
                    let _ = ack.send(());
                }
                PersistRequest::Shutdown(ack) => {
                    info!("Persistence writer shutting down");
                    self.rx.close();
                    // Saves queued before close still go out
                    while let Some(request) = self.rx.recv().await {
                        match request {
                            PersistRequest::Save(cart) => self.write(&cart).await,
                            PersistRequest::Flush(ack) | PersistRequest::Shutdown(ack) => {
                                let _ = ack.send(());
                            }
                        }
                    }
                    let _ = ack.send(());
                    break;
                }
            }
        }

        info!("Persistence writer stopped");
    }

    async fn write(&self, cart: &Cart) {
        let result = match cart.to_json() {
            Ok(json) => self.kv.set(&self.key, &json).await.map_err(StoreError::from),
            Err(e) => Err(StoreError::from(e)),
        };

        let mut status = self.status.write().await;
        match result {
            Ok(()) => {
                status.writes_completed += 1;
                status.last_error = None;
                debug!(items = cart.len(), "Persisted cart");
            }
            Err(e) => {
                status.writes_failed += 1;
                status.last_error = Some(e.to_string());
                error!(?e, key = %self.key, "Failed to persist cart");
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;
    use cart_core::{CartOp, NewCartItem};

    fn cart_with(ids: &[&str]) -> Cart {
        ids.iter().fold(Cart::new(), |cart, id| {
            cart.apply(&CartOp::Add(NewCartItem::new(*id, "T", "", 1.0))).0
        })
    }

    #[tokio::test]
    async fn test_last_write_wins_after_flush() {
        let kv = Arc::new(MemoryStore::new());
        let handle = PersistWriter::spawn(kv.clone(), "k");

        handle.enqueue(cart_with(&["a"])).unwrap();
        handle.enqueue(cart_with(&["a", "b"])).unwrap();
        handle.flush().await.unwrap();

        let stored = kv.get("k").await.unwrap().unwrap();
        assert_eq!(Cart::from_json(&stored).unwrap(), cart_with(&["a", "b"]));

        let status = handle.status().await;
        assert_eq!(status.writes_completed, 2);
        assert_eq!(status.writes_failed, 0);
        assert!(!status.is_diverged());
    }

    #[tokio::test]
    async fn test_shutdown_drains_queue() {
        let kv = Arc::new(MemoryStore::new());
        let handle = PersistWriter::spawn(kv.clone(), "k");

        handle.enqueue(cart_with(&["a"])).unwrap();
        handle.shutdown().await.unwrap();

        assert!(kv.get("k").await.unwrap().is_some());
        assert!(matches!(
            handle.enqueue(Cart::new()),
            Err(StoreError::ShuttingDown)
        ));
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_writer_stops_when_handles_dropped() {
        let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let (writer, handle) = PersistWriter::new(kv, "k");
        let task = tokio::spawn(writer.run());

        drop(handle);
        task.await.unwrap();
    }
}
