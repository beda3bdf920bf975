use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::hash::Hash;
use std::sync::Arc;

/// Number of bound classes kept by the process-wide binder table.
pub const BINDER_TABLE_CAPACITY: usize = 100;

/// A bounded map evicting the least recently used entry once full.
///
/// Every entry carries the tick of its last use. Hits only restamp the entry;
/// the scan for the oldest stamp happens when a new key arrives at a full
/// table.
#[derive(Debug)]
pub struct LruTable<K, V> {
    capacity: usize,
    inner: Mutex<Stamped<K, V>>,
}

#[derive(Debug)]
struct Stamped<K, V> {
    tick: u64,
    entries: IndexMap<K, (V, u64)>,
}

impl<K, V> Stamped<K, V> {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

impl<K: Hash + Eq + Clone, V: Clone> LruTable<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(Stamped {
                tick: 0,
                entries: IndexMap::with_capacity(capacity),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().entries.contains_key(key)
    }

    /// Looks up `key` and marks it as most recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut inner = self.inner.lock();
        let tick = inner.next_tick();
        let (value, stamp) = inner.entries.get_mut(key)?;
        *stamp = tick;
        Some(value.clone())
    }

    /// Inserts `value` unless `key` is already present, and returns the value
    /// stored under `key` afterwards.
    ///
    /// Of two racing inserts for one key, the first wins and both callers
    /// get its value back.
    pub fn get_or_insert(&self, key: K, value: V) -> V {
        let mut inner = self.inner.lock();
        let tick = inner.next_tick();

        if let Some((existing, stamp)) = inner.entries.get_mut(&key) {
            *stamp = tick;
            return existing.clone();
        }

        if inner.entries.len() >= self.capacity {
            let oldest = inner
                .entries
                .values()
                .enumerate()
                .min_by_key(|(_, (_, stamp))| *stamp)
                .map(|(index, _)| index);
            if let Some(index) = oldest {
                inner.entries.swap_remove_index(index);
                tracing::debug!("Binder table full, evicted least recently used entry.");
            }
        }

        inner.entries.insert(key, (value.clone(), tick));
        value
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }
}

/// Identity of one bound class: interface type, backend type and binder
/// function address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BinderKey {
    pub interface: TypeId,
    pub backend: TypeId,
    pub binder: usize,
}

pub(crate) type ClassEntry = Arc<dyn Any + Send + Sync>;

static BINDER_TABLE: Lazy<LruTable<BinderKey, ClassEntry>> =
    Lazy::new(|| LruTable::new(BINDER_TABLE_CAPACITY));

pub(crate) fn binder_table() -> &'static LruTable<BinderKey, ClassEntry> {
    &BINDER_TABLE
}

/// Number of classes currently held by the process-wide binder table.
pub fn cached_classes() -> usize {
    BINDER_TABLE.len()
}
