//! Consumer dependency tracking and change notification
//!
//! Every scope node keeps, per consumer, the set of token keys that consumer
//! last read. When the node's resolved table changes, only consumers whose
//! tracked keys intersect the changed-key set are notified; consumers with
//! disjoint read-sets are skipped. Structural subscribers (class-name watchers)
//! fire whenever at least one tracked consumer was affected.

use crate::registry::TokenTable;
use crate::scope::ScopeNode;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Opaque caller-owned consumer handle, typically one per rendered element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConsumerId(u64);

static NEXT_CONSUMER: AtomicU64 = AtomicU64::new(1);

impl ConsumerId {
    /// Allocate a fresh, process-unique consumer id.
    pub fn fresh() -> Self {
        Self(NEXT_CONSUMER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle for removing a structural change subscriber.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback invoked with the new scope name and the node that changed.
pub type ThemeCallback = Arc<dyn Fn(&str, &ScopeNode) + Send + Sync>;

/// Per-node dependency bookkeeping.
#[derive(Default)]
pub(crate) struct DependencyTracker {
    /// Token keys each consumer last read, replaced wholesale on re-read.
    keys: RwLock<FxHashMap<ConsumerId, FxHashSet<String>>>,
    /// Per-consumer change callbacks.
    callbacks: RwLock<FxHashMap<ConsumerId, ThemeCallback>>,
    /// Structural subscribers, in registration order.
    listeners: RwLock<Vec<(ListenerId, ThemeCallback)>>,
    next_listener: AtomicU64,
}

impl DependencyTracker {
    pub(crate) fn track(&self, consumer: ConsumerId, keys: FxHashSet<String>) {
        self.keys.write().unwrap().insert(consumer, keys);
    }

    /// Drop all bookkeeping for an unmounted consumer.
    pub(crate) fn untrack(&self, consumer: ConsumerId) {
        self.keys.write().unwrap().remove(&consumer);
        self.callbacks.write().unwrap().remove(&consumer);
    }

    pub(crate) fn is_tracking(&self, consumer: ConsumerId) -> bool {
        self.keys
            .read()
            .unwrap()
            .get(&consumer)
            .is_some_and(|keys| !keys.is_empty())
    }

    pub(crate) fn listen(&self, consumer: ConsumerId, callback: ThemeCallback) {
        self.callbacks.write().unwrap().insert(consumer, callback);
    }

    pub(crate) fn subscribe(&self, callback: ThemeCallback) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().unwrap().push((id, callback));
        id
    }

    pub(crate) fn unsubscribe(&self, id: ListenerId) {
        self.listeners
            .write()
            .unwrap()
            .retain(|(listener, _)| *listener != id);
    }

    /// Dispatch a committed state change.
    ///
    /// Callbacks are collected first and invoked with no locks held, so a
    /// callback may re-enter the node (re-track, re-read values) safely.
    pub(crate) fn notify(&self, changed: &FxHashSet<String>, name: &str, node: &ScopeNode) {
        if changed.is_empty() {
            return;
        }

        let affected: Vec<ConsumerId> = self
            .keys
            .read()
            .unwrap()
            .iter()
            .filter(|(_, keys)| !keys.is_disjoint(changed))
            .map(|(consumer, _)| *consumer)
            .collect();
        if affected.is_empty() {
            tracing::trace!(scope = name, "theme change affects no tracked consumers");
            return;
        }

        let consumer_callbacks: Vec<ThemeCallback> = {
            let callbacks = self.callbacks.read().unwrap();
            affected
                .iter()
                .filter_map(|consumer| callbacks.get(consumer).cloned())
                .collect()
        };
        let structural: Vec<ThemeCallback> = self
            .listeners
            .read()
            .unwrap()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        tracing::trace!(
            scope = name,
            affected = affected.len(),
            changed = changed.len(),
            "notifying theme consumers"
        );
        for callback in consumer_callbacks {
            callback(name, node);
        }
        for callback in structural {
            callback(name, node);
        }
    }
}

/// Keys whose values differ between two token tables.
///
/// Covers added, removed, and value-changed keys; this is the set the
/// intersection test in [`DependencyTracker::notify`] runs against.
pub(crate) fn changed_keys(old: Option<&TokenTable>, new: Option<&TokenTable>) -> FxHashSet<String> {
    let mut changed = FxHashSet::default();
    if let Some(new) = new {
        for (key, value) in new {
            if old.and_then(|table| table.get(key)) != Some(value) {
                changed.insert(key.clone());
            }
        }
    }
    if let Some(old) = old {
        for key in old.keys() {
            if new.map_or(true, |table| !table.contains_key(key)) {
                changed.insert(key.clone());
            }
        }
    }
    changed
}
