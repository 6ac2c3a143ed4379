use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;

/// Handle returned by `OverrideCache::subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Change-notification subscribers, kept outside the record lock so that
/// dispatch never holds it and a listener can re-enter the cache.
pub(crate) struct SubscriberSet {
    listeners: DashMap<u64, Arc<dyn Fn() + Send + Sync>>,
    next_id: AtomicU64,
}

impl SubscriberSet {
    pub(crate) fn new() -> Self {
        Self {
            listeners: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn insert(
        &self,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.insert(id, Arc::new(listener));
        SubscriptionId(id)
    }

    pub(crate) fn remove(
        &self,
        id: SubscriptionId,
    ) -> bool {
        self.listeners.remove(&id.0).is_some()
    }

    pub(crate) fn clear(&self) {
        self.listeners.clear();
    }

    /// Callers must have released the record lock before invoking this.
    /// Listeners are snapshot first so a listener that subscribes or
    /// unsubscribes during dispatch cannot deadlock the set.
    pub(crate) fn notify(&self) {
        let snapshot: Vec<Arc<dyn Fn() + Send + Sync>> =
            self.listeners.iter().map(|entry| Arc::clone(entry.value())).collect();
        for listener in snapshot {
            listener();
        }
    }
}
