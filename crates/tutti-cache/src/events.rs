//! Cache notifications for render schedulers.

use crate::id::{CacheId, ContextId};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use tutti_core::TimeRange;

/// Something a render scheduler may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// Data in `range` is stale.
    Invalidated { cache: CacheId, range: TimeRange },
    /// Data in `range` is now current.
    Validated { cache: CacheId, range: TimeRange },
    /// `range` should be filled on behalf of `context`.
    Requested {
        cache: CacheId,
        context: ContextId,
        range: TimeRange,
    },
    /// Pending fills for this cache should be abandoned.
    CancelAll { cache: CacheId },
}

impl CacheEvent {
    pub fn cache(&self) -> CacheId {
        match self {
            CacheEvent::Invalidated { cache, .. }
            | CacheEvent::Validated { cache, .. }
            | CacheEvent::Requested { cache, .. }
            | CacheEvent::CancelAll { cache } => *cache,
        }
    }
}

/// Broadcasts [`CacheEvent`]s to every live subscriber.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<CacheEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Receiver<CacheEvent> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    /// Send to all subscribers, dropping those whose receiver is gone.
    pub fn publish(&self, event: CacheEvent) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
