// ── Generic reactive entity collection ──
//
// Concurrent storage with O(1) lookups, insertion-ordered snapshots,
// and push-based change notification via a `watch` channel.

use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tokio::sync::watch;

use crate::stream::Snapshot;

struct Slot<T> {
    /// Insertion sequence number; drives snapshot ordering.
    seq: u64,
    value: Arc<T>,
}

/// A reactive collection for a single entity type.
///
/// Reads go straight to the `DashMap`. Every write runs inside the
/// snapshot channel's `send_if_modified` critical section, which
/// serializes writers, bumps the version and rebuilds the snapshot in
/// one step. Subscribers therefore never observe a version without the
/// mutations committed before it.
pub(crate) struct EntityCollection<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    by_key: DashMap<K, Slot<T>>,
    next_seq: AtomicU64,
    snapshot: watch::Sender<Snapshot<T>>,
}

impl<K, T> EntityCollection<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Snapshot::empty());

        Self {
            by_key: DashMap::new(),
            next_seq: AtomicU64::new(0),
            snapshot,
        }
    }

    /// Insert a new entity. Replaces silently if the key already exists,
    /// keeping the original insertion position.
    pub(crate) fn insert(&self, key: K, entity: T) {
        self.commit(|map| {
            let seq = map
                .get(&key)
                .map_or_else(|| self.next_seq(), |slot| slot.seq);
            map.insert(
                key,
                Slot {
                    seq,
                    value: Arc::new(entity),
                },
            );
            true
        });
    }

    /// Insert every entity in order, but only if the collection is empty.
    /// Returns `false` (and changes nothing) otherwise.
    pub(crate) fn insert_all_if_empty(&self, entities: Vec<(K, T)>) -> bool {
        self.commit(|map| {
            if !map.is_empty() {
                return false;
            }
            for (key, entity) in entities {
                let seq = self.next_seq();
                map.insert(
                    key,
                    Slot {
                        seq,
                        value: Arc::new(entity),
                    },
                );
            }
            true
        })
    }

    /// Apply `f` to the entity under `key`.
    ///
    /// `f` returns the replacement, or `None` to leave the entity as is.
    /// Returns `None` if the key is absent, otherwise whether a change
    /// was committed.
    pub(crate) fn update(&self, key: &K, f: impl FnOnce(&T) -> Option<T>) -> Option<bool> {
        let mut found = false;
        let changed = self.commit(|map| {
            let Some(mut slot) = map.get_mut(key) else {
                return false;
            };
            found = true;
            match f(&slot.value) {
                Some(next) => {
                    slot.value = Arc::new(next);
                    true
                }
                None => false,
            }
        });
        found.then_some(changed)
    }

    /// Remove an entity by key. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, key: &K) -> Option<Arc<T>> {
        let mut removed = None;
        self.commit(|map| {
            removed = map.remove(key).map(|(_, slot)| slot.value);
            removed.is_some()
        });
        removed
    }

    /// Replace the whole contents, preserving the given order.
    pub(crate) fn replace_all(&self, entities: Vec<(K, T)>) {
        self.commit(|map| {
            map.clear();
            for (key, entity) in entities {
                let seq = self.next_seq();
                map.insert(
                    key,
                    Slot {
                        seq,
                        value: Arc::new(entity),
                    },
                );
            }
            true
        });
    }

    pub(crate) fn get(&self, key: &K) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(&r.value))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Snapshot<T> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        self.snapshot.borrow().version()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Run `mutate` under the snapshot write lock. When it reports a
    /// change, rebuild the ordered snapshot and bump the version.
    fn commit(&self, mutate: impl FnOnce(&DashMap<K, Slot<T>>) -> bool) -> bool {
        // `send_if_modified` updates unconditionally, even with zero receivers.
        self.snapshot.send_if_modified(|snap| {
            if !mutate(&self.by_key) {
                return false;
            }
            *snap = Snapshot::new(snap.version() + 1, self.ordered_values());
            true
        })
    }

    fn ordered_values(&self) -> Vec<Arc<T>> {
        let mut slots: Vec<(u64, Arc<T>)> = self
            .by_key
            .iter()
            .map(|r| (r.seq, Arc::clone(&r.value)))
            .collect();
        slots.sort_unstable_by_key(|(seq, _)| *seq);
        slots.into_iter().map(|(_, value)| value).collect()
    }
}
