//! Change notifications for the query cache

use super::key::QueryKey;
use tokio::sync::broadcast;
use tracing::debug;

/// Default broadcast channel capacity
const DEFAULT_CAPACITY: usize = 256;

/// What happened to a cache entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEventKind {
    /// New data was stored (fetch, `set_data` or hydration)
    Updated,
    /// A fetch failed; previous data, if any, is kept
    Failed,
    /// Entry was marked stale
    Invalidated,
    /// Entry was removed
    Removed,
}

/// A change to one cache entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    pub key: QueryKey,
    pub kind: CacheEventKind,
}

/// Broadcasts [`CacheEvent`]s to whoever re-renders on cache changes.
///
/// Fire-and-forget: emitting never blocks, never panics.
/// If no subscribers are connected, events are silently dropped.
#[derive(Debug, Clone)]
pub struct CacheEventBus {
    sender: broadcast::Sender<CacheEvent>,
}

impl CacheEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn emit(&self, key: &QueryKey, kind: CacheEventKind) {
        let event = CacheEvent {
            key: key.clone(),
            kind,
        };
        if let Ok(n) = self.sender.send(event) {
            debug!(key = %key, kind = ?kind, subscribers = n, "CacheEvent emitted");
        }
    }
}

impl Default for CacheEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
