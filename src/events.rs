//! Change Notification
//!
//! Lets any renderer (or a test) observe state transitions of the catalog
//! and completion state without depending on a UI runtime. Subscribers get
//! events over a broadcast channel; pollers compare `version()`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 256;

/// State transition emitted by the catalog store or the completion tracker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    CatalogReloaded,
    CategoryInserted(String),
    CategoryRemoved(String),
    ProblemInserted(String),
    ProblemRemoved(String),
    CompletionsReloaded,
    CompletionsCleared,
    CompletionChanged { problem_id: String, completed: bool },
}

/// Shared fan-out of `StoreEvent`s plus a monotonically increasing version
#[derive(Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<StoreEvent>,
    version: Arc<AtomicU64>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            version: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Receive every event emitted after this call
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    /// Bumped once per emitted event
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    pub(crate) fn notify(&self, event: StoreEvent) {
        self.version.fetch_add(1, Ordering::SeqCst);
        log::debug!("store event: {:?}", event);
        // No receivers is fine
        let _ = self.tx.send(event);
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
