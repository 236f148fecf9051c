use std::collections::hash_map::{self, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use tracing::{debug, warn};

use super::entry::Entry;
use crate::config::MapConfig;
use crate::error::Result;

/// Upper bound on preallocation driven by a deserializer's size hint.
const MAX_PREALLOCATED_ENTRIES: usize = 4096;

/// State guarded by the map's lock.
///
/// Every method here assumes the caller already holds the appropriate
/// guard, which is what lets stamp issuance trigger a reindex without
/// locking twice.
struct Inner<V> {
    store: HashMap<String, Entry<V>>,
    /// Last stamp handed out. Zero means none has been issued yet.
    next_stamp: u64,
}

impl<V> Inner<V> {
    fn with_capacity(capacity: usize) -> Self {
        let mut store = HashMap::new();
        if let Err(err) = store.try_reserve(capacity) {
            warn!(capacity, %err, "Capacity hint not honoured, using default allocation");
        }
        Self {
            store,
            next_stamp: 0,
        }
    }

    fn issue_stamp(&mut self) -> u64 {
        if self.next_stamp == u64::MAX {
            warn!(
                entries = self.store.len(),
                "Order stamp counter exhausted, compacting stamps"
            );
            self.reindex("overflow");
        }
        self.next_stamp += 1;
        self.next_stamp
    }

    fn set(&mut self, key: String, value: V) {
        let stamp = self.issue_stamp();
        match self.store.entry(key) {
            hash_map::Entry::Occupied(mut occupied) => occupied.get_mut().touch(value, stamp),
            hash_map::Entry::Vacant(vacant) => {
                vacant.insert(Entry::new(value, stamp));
            }
        }
    }

    /// Entries from least to most recently touched.
    fn ordered(&self) -> Vec<(&String, &Entry<V>)> {
        let mut entries: Vec<_> = self.store.iter().collect();
        // Stamps are unique among live entries, so an unstable sort is deterministic.
        entries.sort_unstable_by_key(|(_, entry)| entry.stamp);
        entries
    }

    /// Renumber all entries 1..=N keeping their relative order.
    fn reindex(&mut self, trigger: &'static str) {
        let mut entries: Vec<&mut Entry<V>> = self.store.values_mut().collect();
        entries.sort_unstable_by_key(|entry| entry.stamp);

        let count = entries.len() as u64;
        for (entry, stamp) in entries.into_iter().zip(1u64..) {
            entry.stamp = stamp;
        }
        self.next_stamp = count;

        debug!(entries = count, trigger, "Reindexed order stamps");
    }
}

/// A thread-safe map from string keys to values that remembers the order
/// in which keys were last inserted or updated.
///
/// Every [`set`](Self::set) moves its key to the most recent position,
/// whether the key was new or not. [`key_order`](Self::key_order) returns a
/// snapshot of all keys from least to most recently touched. Values are
/// fetched individually by key.
///
/// Writers (`set`, `delete`, `reindex`) take the lock exclusively; readers
/// (`get`, `len`, `key_order`, serialization) share it. The map is meant to
/// be shared behind an `Arc`.
///
/// ```
/// use ordered_string_map::OrderedStringMap;
///
/// let map = OrderedStringMap::new();
/// map.set("x", 1);
/// map.set("y", 2);
/// map.set("x", 3);
///
/// assert_eq!(map.key_order(), vec!["y", "x"]);
/// assert_eq!(map.get("x"), Some(3));
/// assert_eq!(map.len(), 2);
/// ```
pub struct OrderedStringMap<V> {
    inner: RwLock<Inner<V>>,
}

impl<V> OrderedStringMap<V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty map with room for `capacity` entries. The hint only
    /// affects allocation.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_inner(Inner::with_capacity(capacity))
    }

    pub fn with_config(config: &MapConfig) -> Self {
        Self::with_capacity(config.capacity_hint)
    }

    fn from_inner(inner: Inner<V>) -> Self {
        Self {
            inner: RwLock::new(inner),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner<V>> {
        self.inner.read().unwrap_or_else(|poisoned| {
            warn!("Recovering ordered map from a poisoned lock");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<V>> {
        self.inner.write().unwrap_or_else(|poisoned| {
            warn!("Recovering ordered map from a poisoned lock");
            poisoned.into_inner()
        })
    }

    /// Insert or replace the value for `key` and mark it most recent.
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.write().set(key.into(), value);
    }

    /// Remove `key` if present.
    pub fn delete(&self, key: &str) {
        self.write().store.remove(key);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read().store.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.read().store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().store.is_empty()
    }

    /// Keys from least to most recently touched, as of one instant.
    pub fn key_order(&self) -> Vec<String> {
        self.read()
            .ordered()
            .into_iter()
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// Compact the order stamps to a dense range without changing the
    /// key order.
    pub fn reindex(&self) {
        self.write().reindex("manual");
    }
}

impl<V: Clone> OrderedStringMap<V> {
    /// Current value for `key`. Reading does not change the key order.
    pub fn get(&self, key: &str) -> Option<V> {
        self.read().store.get(key).map(|entry| entry.value.clone())
    }
}

impl<V: Serialize> OrderedStringMap<V> {
    /// Encode the map as a JSON object of key to value.
    ///
    /// Member order in the output is unspecified; use
    /// [`key_order`](Self::key_order) when order matters.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl<V> Default for OrderedStringMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for OrderedStringMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.read();
        let mut map = f.debug_map();
        for (key, entry) in inner.ordered() {
            map.entry(key, &entry.value);
        }
        map.finish()
    }
}

impl<K: Into<String>, V> Extend<(K, V)> for OrderedStringMap<V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        for (key, value) in iter {
            inner.set(key.into(), value);
        }
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedStringMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<V: Serialize> Serialize for OrderedStringMap<V> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let inner = self.read();
        serializer.collect_map(inner.store.iter())
    }
}

/// Members are inserted in document order, so the resulting key order
/// follows the input.
impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedStringMap<V> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedStringMapVisitor(PhantomData))
    }
}

struct OrderedStringMapVisitor<V>(PhantomData<fn() -> V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedStringMapVisitor<V> {
    type Value = OrderedStringMap<V>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map with string keys")
    }

    fn visit_map<A>(self, mut access: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let capacity = access
            .size_hint()
            .unwrap_or(0)
            .min(MAX_PREALLOCATED_ENTRIES);
        let mut inner = Inner::with_capacity(capacity);
        while let Some((key, value)) = access.next_entry::<String, V>()? {
            inner.set(key, value);
        }
        Ok(OrderedStringMap::from_inner(inner))
    }
}
