//! # Least Recently Used (LRU) Cache
//!
//! Bounded key-value cache that keeps its entries in recency order and evicts
//! the least recently used entry when a new key would exceed the capacity.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                           LruCache<K, V>                             │
//!   │                                                                      │
//!   │   ┌──────────────────────────────────────────────────────────────┐   │
//!   │   │  KeyIndex<K>: FxHashMap<K, SlotId>                           │   │
//!   │   │                                                              │   │
//!   │   │  ┌─────────┬───────────────────────────────────────────┐     │   │
//!   │   │  │   Key   │  SlotId                                   │     │   │
//!   │   │  ├─────────┼───────────────────────────────────────────┤     │   │
//!   │   │  │  key_a  │  ─────────────────────────────────────┐   │     │   │
//!   │   │  │  key_b  │  ───────────────────────────────┐     │   │     │   │
//!   │   │  │  key_c  │  ─────────────────────────┐     │     │   │     │   │
//!   │   │  └─────────┴───────────────────────────┼─────┼─────┼───┘     │   │
//!   │   └────────────────────────────────────────┼─────┼─────┼─────────┘   │
//!   │                                            │     │     │             │
//!   │   ┌────────────────────────────────────────┼─────┼─────┼─────────┐   │
//!   │   │  RecencyList<Entry<K, V>>              ▼     ▼     ▼         │   │
//!   │   │                                                              │   │
//!   │   │  head ──► ┌───────┐ ◄──► ┌───────┐ ◄──► ┌───────┐ ◄── tail   │   │
//!   │   │   (MRU)   │ key_c │      │ key_b │      │ key_a │    (LRU)   │   │
//!   │   │           │ value │      │ value │      │ value │            │   │
//!   │   │           └───────┘      └───────┘      └───────┘            │   │
//!   │   └──────────────────────────────────────────────────────────────┘   │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The nodes (key + value) live in the list's slot arena; the index only maps
//! keys to node handles. Every mutation touches both structures in the same
//! call, so `index.keys() == list.keys()` holds between calls.
//!
//! ## Operations
//!
//! | Method              | Promotes | Evicts | Description                         |
//! |---------------------|----------|--------|-------------------------------------|
//! | `insert(k, v)`      | yes      | yes    | Insert or replace                   |
//! | `index_set(k, v)`   | yes      | **no** | Keyed write, bypasses the bound     |
//! | `get(&k)`           | yes      | -      | `Err(KeyNotFound)` on miss          |
//! | `index_get(&k)`     | yes      | -      | Keyed read, same as `get`           |
//! | `try_get(&k)`       | yes      | -      | `None` on miss                      |
//! | `contains_key(&k)`  | **yes**  | -      | A hit counts as a use               |
//! | `peek(&k)`          | no       | -      | Lookup without reordering           |
//! | `remove(&k)`        | no       | -      | Unlink entry, others keep order     |
//! | `most_recent()`     | no       | -      | Head value, `Err(EmptySequence)`    |
//! | `least_recent()`    | no       | -      | Tail value, `Err(EmptySequence)`    |
//! | `set_capacity(n)`   | -        | no     | Changes the bound only              |
//! | `enforce_capacity()`| -        | yes    | Evicts until `len <= capacity`      |
//!
//! ## Behaviors worth knowing
//!
//! - `contains_key` promotes on a hit. Probing for presence changes which
//!   entry is evicted next. Use [`peek`](LruCache::peek) for a probe that does
//!   not.
//! - `index_set` admits a new key without the eviction check that `insert`
//!   performs, so the cache can grow past its capacity through it. The next
//!   `insert` of a new key evicts a single entry, it does not shrink the
//!   cache back to the bound.
//! - `set_capacity` never evicts. Call [`enforce_capacity`](LruCache::enforce_capacity)
//!   to trim immediately.
//!
//! ## Example
//!
//! ```
//! use lrukit::policy::lru::LruCache;
//!
//! let mut cache = LruCache::new(2);
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//!
//! // "a" becomes most recently used
//! assert_eq!(cache.get(&"a"), Ok(&1));
//!
//! // "b" is evicted
//! cache.insert("c", 3);
//! assert!(cache.peek(&"b").is_none());
//! assert_eq!(cache.to_vec(), vec![("c", 3), ("a", 1)]);
//! ```
//!
//! ## Thread Safety
//!
//! `LruCache` is single-owner. Every read mutates recency order, so shared
//! access needs one lock around the whole cache; see
//! [`ConcurrentLruCache`](crate::sync::ConcurrentLruCache) behind the
//! `concurrency` feature.

use std::fmt;
use std::hash::Hash;
use std::iter::FusedIterator;
use std::mem;

use tracing::{debug, trace};

use crate::builder::LruConfig;
use crate::ds::key_index::KeyIndex;
use crate::ds::recency_list::{self, RecencyList};
use crate::ds::slot_arena::SlotId;
use crate::error::{CacheError, ConfigError, InvariantError};
use crate::traits::{CoreCache, LruCacheTrait, MutableCache};

/// Capacity used by [`LruCache::default`] and [`LruConfig::default`].
pub const DEFAULT_CAPACITY: usize = 32;

/// Upper bound on slots reserved up front when preallocation is enabled.
const MAX_PREALLOC: usize = 1 << 16;

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Bounded LRU cache.
///
/// `K` needs `Eq + Hash` for the index and `Clone` because the key is held by
/// both the index and the node. `V` is unconstrained.
pub struct LruCache<K, V> {
    list: RecencyList<Entry<K, V>>,
    index: KeyIndex<K>,
    capacity: usize,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a cache that holds at most `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0. Use [`try_new`](Self::try_new) for
    /// user-supplied values.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates a cache, rejecting a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config(LruConfig {
            capacity,
            ..LruConfig::default()
        })
    }

    /// Creates a cache from a full configuration.
    pub fn with_config(config: LruConfig) -> Result<Self, ConfigError> {
        validate_capacity(config.capacity)?;
        let (list, index) = if config.prealloc {
            let reserve = config.capacity.min(MAX_PREALLOC);
            (
                RecencyList::with_capacity(reserve),
                KeyIndex::with_capacity(reserve),
            )
        } else {
            (RecencyList::new(), KeyIndex::new())
        };
        Ok(Self {
            list,
            index,
            capacity: config.capacity,
        })
    }

    /// Returns the number of entries in the cache.
    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns the current capacity bound.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changes the capacity bound.
    ///
    /// Does not evict when the cache already holds more than `capacity`
    /// entries; only later insertions are affected. See
    /// [`enforce_capacity`](Self::enforce_capacity).
    pub fn set_capacity(&mut self, capacity: usize) -> Result<(), ConfigError> {
        validate_capacity(capacity)?;
        debug!(
            old = self.capacity,
            new = capacity,
            len = self.list.len(),
            "lru capacity changed"
        );
        self.capacity = capacity;
        Ok(())
    }

    /// Evicts least recently used entries until `len() <= capacity()`.
    ///
    /// Returns the evicted entries, least recent first.
    pub fn enforce_capacity(&mut self) -> Vec<(K, V)> {
        let excess = self.list.len().saturating_sub(self.capacity);
        let mut evicted = Vec::with_capacity(excess);
        while self.list.len() > self.capacity {
            match self.pop_lru() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        if !evicted.is_empty() {
            debug!(
                evicted = evicted.len(),
                capacity = self.capacity,
                "lru capacity enforced"
            );
        }
        evicted
    }

    /// Inserts or replaces the value for `key`, marking it most recently used.
    ///
    /// Replacing an existing key returns the old value and never evicts. A new
    /// key evicts the least recently used entry first when the cache is full.
    ///
    /// ```
    /// use lrukit::policy::lru::LruCache;
    ///
    /// let mut cache = LruCache::new(1);
    /// assert_eq!(cache.insert("a", 1), None);
    /// assert_eq!(cache.insert("a", 2), Some(1));
    /// assert_eq!(cache.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(id) = self.index.get(&key) {
            return self.replace(id, value);
        }

        if self.list.len() >= self.capacity {
            self.evict();
        }
        self.admit(key, value);
        None
    }

    /// Keyed write: replaces and promotes an existing key, or admits a new key
    /// at the head **without** checking the capacity bound.
    ///
    /// ```
    /// use lrukit::policy::lru::LruCache;
    ///
    /// let mut cache = LruCache::new(1);
    /// cache.insert("a", 1);
    /// cache.index_set("b", 2);
    /// assert_eq!(cache.len(), 2);
    /// ```
    pub fn index_set(&mut self, key: K, value: V) -> Option<V> {
        if let Some(id) = self.index.get(&key) {
            return self.replace(id, value);
        }

        self.admit(key, value);
        if self.list.len() > self.capacity {
            debug!(
                len = self.list.len(),
                capacity = self.capacity,
                "indexed write grew lru cache past its capacity"
            );
        }
        None
    }

    /// Returns the value for `key` and marks it most recently used.
    pub fn get(&mut self, key: &K) -> Result<&V, CacheError> {
        let id = self.index.get(key).ok_or(CacheError::KeyNotFound)?;
        self.promote(id)?;
        self.list
            .get(id)
            .map(|entry| &entry.value)
            .ok_or(CacheError::InvalidHandle(id))
    }

    /// Mutable form of [`get`](Self::get).
    pub fn get_mut(&mut self, key: &K) -> Result<&mut V, CacheError> {
        let id = self.index.get(key).ok_or(CacheError::KeyNotFound)?;
        self.promote(id)?;
        self.list
            .get_mut(id)
            .map(|entry| &mut entry.value)
            .ok_or(CacheError::InvalidHandle(id))
    }

    /// Keyed read. Same contract as [`get`](Self::get).
    #[inline]
    pub fn index_get(&mut self, key: &K) -> Result<&V, CacheError> {
        self.get(key)
    }

    /// Like [`get`](Self::get), but a miss is `None` rather than an error.
    #[inline]
    pub fn try_get(&mut self, key: &K) -> Option<&V> {
        self.get(key).ok()
    }

    /// Returns `true` if `key` is cached, promoting it on a hit.
    ///
    /// ```
    /// use lrukit::policy::lru::LruCache;
    ///
    /// let mut cache = LruCache::new(2);
    /// cache.insert("a", 1);
    /// cache.insert("b", 2);
    ///
    /// assert!(cache.contains_key(&"a"));
    /// cache.insert("c", 3);
    ///
    /// // the probe saved "a"; "b" was evicted instead
    /// assert!(cache.peek(&"a").is_some());
    /// assert!(cache.peek(&"b").is_none());
    /// ```
    pub fn contains_key(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(id) => self.promote(id).is_ok(),
            None => false,
        }
    }

    /// Returns the value for `key` without changing recency order.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let id = self.index.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    /// Removes `key`. Returns whether it was present.
    ///
    /// The remaining entries keep their relative order.
    pub fn remove(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    /// Removes `key` and returns its value.
    pub fn take(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        let entry = self.list.remove(id);
        debug_assert!(entry.is_ok(), "key index pointed at a dead node {id:?}");
        entry.ok().map(|entry| entry.value)
    }

    /// Value of the most recently used entry. Does not promote.
    pub fn most_recent(&self) -> Result<&V, CacheError> {
        self.list.front().map(|entry| &entry.value)
    }

    /// Value of the least recently used entry. Does not promote.
    pub fn least_recent(&self) -> Result<&V, CacheError> {
        self.list.back().map(|entry| &entry.value)
    }

    /// Removes and returns the least recently used entry.
    pub fn pop_lru(&mut self) -> Option<(K, V)> {
        let entry = self.list.pop_back().ok()?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    /// Least recently used entry without removing or promoting it.
    pub fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().ok().map(|entry| (&entry.key, &entry.value))
    }

    /// Marks `key` as most recently used. Returns `false` on a miss.
    pub fn touch(&mut self, key: &K) -> bool {
        self.contains_key(key)
    }

    /// Position of `key` in recency order, 0 being the most recent.
    pub fn recency_rank(&self, key: &K) -> Option<usize> {
        let id = self.index.get(key)?;
        self.list
            .iter_entries()
            .position(|(entry_id, _)| entry_id == id)
    }

    /// Drops every entry. The capacity bound is kept.
    pub fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
    }

    /// Iterates `(key, value)` pairs from most to least recently used.
    ///
    /// Does not promote anything.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.list.iter(),
        }
    }

    /// Iterates keys in index order.
    ///
    /// The order is unspecified but stable while the cache is not mutated.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.index.keys()
    }

    /// Iterates values from most to least recently used.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.list.iter().map(|entry| &entry.value)
    }

    /// Copies out every pair, most recently used first.
    pub fn to_vec(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Verifies that the key index and the recency list describe the same
    /// set of entries.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "index holds {} keys but recency list holds {} nodes",
                self.index.len(),
                self.list.len()
            )));
        }
        for (id, entry) in self.list.iter_entries() {
            match self.index.get(&entry.key) {
                Some(indexed) if indexed == id => {},
                Some(indexed) => {
                    return Err(InvariantError::new(format!(
                        "key indexed to {indexed:?} but linked at {id:?}"
                    )));
                },
                None => {
                    return Err(InvariantError::new(format!(
                        "node {id:?} holds a key missing from the index"
                    )));
                },
            }
        }
        Ok(())
    }

    fn promote(&mut self, id: SlotId) -> Result<(), CacheError> {
        let result = self.list.move_to_front(id);
        debug_assert!(result.is_ok(), "key index pointed at a dead node {id:?}");
        result
    }

    fn replace(&mut self, id: SlotId, value: V) -> Option<V> {
        self.promote(id).ok()?;
        let entry = self.list.get_mut(id)?;
        Some(mem::replace(&mut entry.value, value))
    }

    fn admit(&mut self, key: K, value: V) {
        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.set(key, id);
    }

    fn evict(&mut self) {
        if self.pop_lru().is_some() {
            trace!(
                len = self.list.len(),
                capacity = self.capacity,
                "evicted least recently used entry"
            );
        }
    }
}

fn validate_capacity(capacity: usize) -> Result<(), ConfigError> {
    if capacity == 0 {
        return Err(ConfigError::new("capacity must be greater than 0"));
    }
    Ok(())
}

impl<K, V> fmt::Debug for LruCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("entries", &DebugEntries(self))
            .finish()
    }
}

struct DebugEntries<'a, K, V>(&'a LruCache<K, V>);

impl<K, V> fmt::Debug for DebugEntries<'_, K, V>
where
    K: Eq + Hash + Clone + fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

impl<K, V> Default for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an LRU cache with a capacity of [`DEFAULT_CAPACITY`].
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K, V> Extend<(K, V)> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'a, K, V> IntoIterator for &'a LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(&K, &V)` from most to least recently used.
pub struct Iter<'a, K, V> {
    inner: recency_list::Iter<'a, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|entry| (&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> CoreCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        LruCache::insert(self, key, value)
    }

    #[inline]
    fn try_get(&mut self, key: &K) -> Option<&V> {
        LruCache::try_get(self, key)
    }

    #[inline]
    fn contains_key(&mut self, key: &K) -> bool {
        LruCache::contains_key(self, key)
    }

    #[inline]
    fn len(&self) -> usize {
        LruCache::len(self)
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        LruCache::clear(self);
    }
}

impl<K, V> MutableCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    #[inline]
    fn take(&mut self, key: &K) -> Option<V> {
        LruCache::take(self, key)
    }
}

impl<K, V> LruCacheTrait<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        LruCache::pop_lru(self)
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        LruCache::peek_lru(self)
    }

    fn touch(&mut self, key: &K) -> bool {
        LruCache::touch(self, key)
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        LruCache::recency_rank(self, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys_mru<K: Eq + Hash + Clone + Copy, V>(cache: &LruCache<K, V>) -> Vec<K> {
        cache.iter().map(|(k, _)| *k).collect()
    }

    // ==============================================
    // CORRECTNESS TESTS MODULE
    // ==============================================
    mod correctness {
        use super::*;

        mod basic_behavior {
            use super::*;

            #[test]
            fn test_new_cache_creation() {
                let cache: LruCache<i32, i32> = LruCache::new(10);
                assert_eq!(cache.capacity(), 10);
                assert_eq!(cache.len(), 0);
                assert!(cache.is_empty());
            }

            #[test]
            fn test_default_capacity() {
                let cache: LruCache<u8, u8> = LruCache::default();
                assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
                assert_eq!(DEFAULT_CAPACITY, 32);
            }

            #[test]
            fn test_zero_capacity_rejected() {
                let err = LruCache::<u8, u8>::try_new(0).unwrap_err();
                assert!(err.message().contains("capacity"));
            }

            #[test]
            #[should_panic(expected = "capacity must be greater than 0")]
            fn test_new_zero_capacity_panics() {
                let _ = LruCache::<u8, u8>::new(0);
            }

            #[test]
            fn test_round_trip() {
                let mut cache = LruCache::new(8);
                for i in 0..8 {
                    cache.insert(i, i * 10);
                }
                for i in 0..8 {
                    assert_eq!(cache.get(&i), Ok(&(i * 10)));
                }
            }

            #[test]
            fn test_get_missing_key() {
                let mut cache: LruCache<i32, i32> = LruCache::new(2);
                cache.insert(1, 1);
                assert_eq!(cache.get(&2), Err(CacheError::KeyNotFound));
                assert_eq!(cache.index_get(&2), Err(CacheError::KeyNotFound));
                assert_eq!(cache.try_get(&2), None);
                assert!(!cache.contains_key(&2));
            }

            #[test]
            fn test_get_mut_updates_and_promotes() {
                let mut cache = LruCache::new(3);
                cache.insert("a", 1);
                cache.insert("b", 2);

                *cache.get_mut(&"a").unwrap() += 10;
                assert_eq!(cache.most_recent(), Ok(&11));
                assert_eq!(cache.peek(&"a"), Some(&11));
                assert_eq!(cache.get_mut(&"z"), Err(CacheError::KeyNotFound));
            }
        }

        mod eviction {
            use super::*;

            #[test]
            fn test_evicts_least_recently_inserted() {
                let mut cache = LruCache::new(2);
                cache.insert("a", 1);
                cache.insert("b", 2);
                cache.insert("c", 3);

                assert_eq!(cache.len(), 2);
                assert_eq!(cache.peek(&"a"), None);
                assert_eq!(cache.peek(&"b"), Some(&2));
                assert_eq!(cache.peek(&"c"), Some(&3));
            }

            #[test]
            fn test_access_refreshes_recency() {
                let mut cache = LruCache::new(2);
                cache.insert("a", 1);
                cache.insert("b", 2);
                assert_eq!(cache.get(&"a"), Ok(&1));
                cache.insert("c", 3);

                assert_eq!(cache.peek(&"b"), None);
                assert_eq!(cache.to_vec(), vec![("c", 3), ("a", 1)]);
            }

            #[test]
            fn test_try_get_refreshes_recency() {
                let mut cache = LruCache::new(2);
                cache.insert("a", 1);
                cache.insert("b", 2);
                assert_eq!(cache.try_get(&"a"), Some(&1));
                cache.insert("c", 3);
                assert_eq!(keys_mru(&cache), vec!["c", "a"]);
            }

            #[test]
            fn test_contains_key_probe_changes_eviction_order() {
                let mut cache = LruCache::new(2);
                cache.insert("a", 1);
                cache.insert("b", 2);

                // "a" is LRU until probed
                assert_eq!(cache.least_recent(), Ok(&1));
                assert!(cache.contains_key(&"a"));
                assert_eq!(cache.least_recent(), Ok(&2));

                cache.insert("c", 3);
                assert!(cache.peek(&"a").is_some());
                assert!(cache.peek(&"b").is_none());
            }

            #[test]
            fn test_replacement_does_not_evict() {
                let mut cache = LruCache::new(1);
                cache.insert("a", 1);
                assert_eq!(cache.insert("a", 2), Some(1));
                assert_eq!(cache.len(), 1);
                assert_eq!(cache.get(&"a"), Ok(&2));
            }

            #[test]
            fn test_replacement_promotes() {
                let mut cache = LruCache::new(2);
                cache.insert("a", 1);
                cache.insert("b", 2);
                cache.insert("a", 10);
                cache.insert("c", 3);
                assert_eq!(keys_mru(&cache), vec!["c", "a"]);
            }

            #[test]
            fn test_len_never_exceeds_capacity() {
                let mut cache = LruCache::new(4);
                for i in 0..100 {
                    cache.insert(i, i);
                    assert!(cache.len() <= 4);
                }
                assert_eq!(keys_mru(&cache), vec![99, 98, 97, 96]);
            }

            #[test]
            fn test_each_new_key_at_capacity_evicts_exactly_the_lru() {
                let mut cache = LruCache::new(3);
                for i in 0..3 {
                    cache.insert(i, i);
                }
                for i in 3..10 {
                    let (lru, _) = cache.peek_lru().map(|(k, v)| (*k, *v)).unwrap();
                    cache.insert(i, i);
                    assert_eq!(cache.len(), 3);
                    assert!(cache.peek(&lru).is_none());
                }
            }
        }

        mod removal {
            use super::*;

            #[test]
            fn test_remove_reports_presence() {
                let mut cache = LruCache::new(3);
                cache.insert("a", 1);
                assert!(cache.remove(&"a"));
                assert!(!cache.remove(&"a"));
                assert!(cache.is_empty());
            }

            #[test]
            fn test_remove_does_not_affect_others() {
                let mut cache = LruCache::new(3);
                cache.insert("a", 1);
                cache.insert("b", 2);
                assert!(cache.remove(&"a"));
                assert_eq!(cache.most_recent(), Ok(&2));
            }

            #[test]
            fn test_remove_middle_keeps_order() {
                let mut cache = LruCache::new(4);
                for k in ["a", "b", "c", "d"] {
                    cache.insert(k, 0);
                }
                cache.remove(&"b");
                assert_eq!(keys_mru(&cache), vec!["d", "c", "a"]);
                assert!(cache.check_invariants().is_ok());
            }

            #[test]
            fn test_take_returns_value() {
                let mut cache = LruCache::new(2);
                cache.insert(1, String::from("one"));
                assert_eq!(cache.take(&1), Some(String::from("one")));
                assert_eq!(cache.take(&1), None);
            }

            #[test]
            fn test_removed_key_can_be_reinserted() {
                let mut cache = LruCache::new(2);
                cache.insert("a", 1);
                cache.insert("b", 2);
                cache.remove(&"a");
                cache.insert("a", 3);
                assert_eq!(keys_mru(&cache), vec!["a", "b"]);
                assert!(cache.check_invariants().is_ok());
            }
        }

        mod peeking {
            use super::*;

            #[test]
            fn test_most_and_least_recent() {
                let mut cache = LruCache::new(3);
                cache.insert("a", 1);
                cache.insert("b", 2);
                cache.insert("c", 3);
                assert_eq!(cache.most_recent(), Ok(&3));
                assert_eq!(cache.least_recent(), Ok(&1));
            }

            #[test]
            fn test_peeks_do_not_promote() {
                let mut cache = LruCache::new(2);
                cache.insert("a", 1);
                cache.insert("b", 2);

                assert_eq!(cache.least_recent(), Ok(&1));
                assert_eq!(cache.peek(&"a"), Some(&1));
                assert_eq!(cache.peek_lru(), Some((&"a", &1)));
                assert_eq!(cache.recency_rank(&"a"), Some(1));

                cache.insert("c", 3);
                assert!(cache.peek(&"a").is_none());
            }

            #[test]
            fn test_empty_cache_peeks_fail() {
                let cache: LruCache<u8, u8> = LruCache::new(2);
                assert_eq!(cache.most_recent(), Err(CacheError::EmptySequence));
                assert_eq!(cache.least_recent(), Err(CacheError::EmptySequence));
                assert_eq!(cache.peek_lru(), None);
            }

            #[test]
            fn test_promotion_law() {
                let mut cache = LruCache::new(4);
                for (k, v) in [("a", 1), ("b", 2), ("c", 3)] {
                    cache.insert(k, v);
                }
                cache.get(&"a").unwrap();
                assert_eq!(cache.most_recent(), Ok(&1));
                cache.contains_key(&"b");
                assert_eq!(cache.most_recent(), Ok(&2));
                cache.touch(&"c");
                assert_eq!(cache.most_recent(), Ok(&3));
            }
        }

        mod clearing {
            use super::*;

            #[test]
            fn test_clear_empties_cache() {
                let mut cache = LruCache::new(3);
                cache.insert("a", 1);
                cache.insert("b", 2);
                cache.clear();

                assert_eq!(cache.len(), 0);
                assert_eq!(cache.capacity(), 3);
                assert_eq!(cache.most_recent(), Err(CacheError::EmptySequence));
                assert_eq!(cache.least_recent(), Err(CacheError::EmptySequence));
                assert_eq!(cache.get(&"a"), Err(CacheError::KeyNotFound));
                assert!(cache.check_invariants().is_ok());
            }

            #[test]
            fn test_usable_after_clear() {
                let mut cache = LruCache::new(2);
                cache.insert(1, 1);
                cache.clear();
                cache.insert(2, 2);
                cache.insert(3, 3);
                cache.insert(4, 4);
                assert_eq!(keys_mru(&cache), vec![4, 3]);
            }
        }
    }

    // ==============================================
    // CAPACITY & INDEXED WRITE
    // ==============================================
    mod capacity {
        use super::*;

        #[test]
        fn test_set_capacity_does_not_evict() {
            let mut cache = LruCache::new(4);
            for i in 0..4 {
                cache.insert(i, i);
            }
            cache.set_capacity(2).unwrap();
            assert_eq!(cache.capacity(), 2);
            assert_eq!(cache.len(), 4);
        }

        #[test]
        fn test_insert_after_shrink_evicts_one() {
            let mut cache = LruCache::new(4);
            for i in 0..4 {
                cache.insert(i, i);
            }
            cache.set_capacity(2).unwrap();
            cache.insert(4, 4);
            assert_eq!(cache.len(), 4);
            assert_eq!(keys_mru(&cache), vec![4, 3, 2, 1]);
        }

        #[test]
        fn test_set_capacity_zero_rejected() {
            let mut cache: LruCache<u8, u8> = LruCache::new(4);
            assert!(cache.set_capacity(0).is_err());
            assert_eq!(cache.capacity(), 4);
        }

        #[test]
        fn test_grow_capacity() {
            let mut cache = LruCache::new(1);
            cache.insert(1, 1);
            cache.set_capacity(3).unwrap();
            cache.insert(2, 2);
            cache.insert(3, 3);
            assert_eq!(cache.len(), 3);
        }

        #[test]
        fn test_enforce_capacity_evicts_lru_first() {
            let mut cache = LruCache::new(4);
            for i in 0..4 {
                cache.insert(i, i * 10);
            }
            cache.set_capacity(2).unwrap();
            let evicted = cache.enforce_capacity();
            assert_eq!(evicted, vec![(0, 0), (1, 10)]);
            assert_eq!(cache.len(), 2);
            assert!(cache.enforce_capacity().is_empty());
        }

        #[test]
        fn test_index_set_bypasses_eviction() {
            let mut cache = LruCache::new(2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            assert_eq!(cache.index_set("c", 3), None);

            assert_eq!(cache.len(), 3);
            assert_eq!(cache.most_recent(), Ok(&3));
            assert_eq!(cache.least_recent(), Ok(&1));
            assert!(cache.check_invariants().is_ok());
        }

        #[test]
        fn test_index_set_existing_key_replaces_and_promotes() {
            let mut cache = LruCache::new(2);
            cache.insert("a", 1);
            cache.insert("b", 2);
            assert_eq!(cache.index_set("a", 5), Some(1));
            assert_eq!(cache.len(), 2);
            assert_eq!(keys_mru(&cache), vec!["a", "b"]);
        }

        #[test]
        fn test_insert_after_index_set_overflow_evicts_single_entry() {
            let mut cache = LruCache::new(1);
            cache.insert("a", 1);
            cache.index_set("b", 2);
            cache.insert("c", 3);
            assert_eq!(cache.len(), 2);
            assert_eq!(keys_mru(&cache), vec!["c", "b"]);
        }
    }

    // ==============================================
    // ENUMERATION
    // ==============================================
    mod enumeration {
        use super::*;

        #[test]
        fn test_iter_is_mru_first_and_does_not_promote() {
            let mut cache = LruCache::new(3);
            cache.insert(1, "a");
            cache.insert(2, "b");
            cache.insert(3, "c");
            cache.get(&1).unwrap();

            let pairs: Vec<_> = cache.iter().map(|(k, v)| (*k, *v)).collect();
            assert_eq!(pairs, vec![(1, "a"), (3, "c"), (2, "b")]);
            assert_eq!(cache.iter().len(), 3);
            assert_eq!(cache.least_recent(), Ok(&"b"));
        }

        #[test]
        fn test_values_follow_recency() {
            let mut cache = LruCache::new(3);
            cache.insert(1, 10);
            cache.insert(2, 20);
            cache.insert(3, 30);
            let values: Vec<_> = cache.values().copied().collect();
            assert_eq!(values, vec![30, 20, 10]);
        }

        #[test]
        fn test_keys_cover_live_set() {
            let mut cache = LruCache::new(3);
            for i in 0..5 {
                cache.insert(i, ());
            }
            let mut keys: Vec<_> = cache.keys().copied().collect();
            keys.sort_unstable();
            assert_eq!(keys, vec![2, 3, 4]);

            let again: Vec<_> = cache.keys().copied().collect();
            let first: Vec<_> = cache.keys().copied().collect();
            assert_eq!(first, again);
        }

        #[test]
        fn test_into_iterator_for_ref() {
            let mut cache = LruCache::new(2);
            cache.insert("x", 1);
            cache.insert("y", 2);
            let mut seen = Vec::new();
            for (k, v) in &cache {
                seen.push((*k, *v));
            }
            assert_eq!(seen, vec![("y", 2), ("x", 1)]);
        }

        #[test]
        fn test_extend_goes_through_insert() {
            let mut cache = LruCache::new(2);
            cache.extend([(1, 1), (2, 2), (3, 3)]);
            assert_eq!(cache.len(), 2);
            assert_eq!(keys_mru(&cache), vec![3, 2]);
        }

        #[test]
        fn test_debug_lists_entries() {
            let mut cache = LruCache::new(2);
            cache.insert(1, "one");
            let dbg = format!("{:?}", cache);
            assert!(dbg.contains("LruCache"));
            assert!(dbg.contains("\"one\""));
        }
    }

    // ==============================================
    // TRAIT SURFACE
    // ==============================================
    mod trait_surface {
        use super::*;

        fn fill<C: CoreCache<u32, u32>>(cache: &mut C, n: u32) {
            for i in 0..n {
                cache.insert(i, i);
            }
        }

        #[test]
        fn test_core_cache_via_generic() {
            let mut cache = LruCache::new(3);
            fill(&mut cache, 5);
            assert_eq!(CoreCache::len(&cache), 3);
            assert_eq!(CoreCache::capacity(&cache), 3);
            assert!(CoreCache::contains_key(&mut cache, &4));
            assert_eq!(CoreCache::try_get(&mut cache, &0), None);
            CoreCache::clear(&mut cache);
            assert!(CoreCache::is_empty(&cache));
        }

        #[test]
        fn test_mutable_cache_take_batch() {
            let mut cache = LruCache::new(4);
            fill(&mut cache, 3);
            let taken = cache.take_batch(&[0, 7, 2]);
            assert_eq!(taken, vec![Some(0), None, Some(2)]);
            assert_eq!(cache.len(), 1);
        }

        #[test]
        fn test_lru_trait_ops() {
            let mut cache = LruCache::new(3);
            fill(&mut cache, 3);
            assert_eq!(LruCacheTrait::recency_rank(&cache, &2), Some(0));
            assert_eq!(LruCacheTrait::recency_rank(&cache, &0), Some(2));
            assert!(LruCacheTrait::touch(&mut cache, &0));
            assert!(!LruCacheTrait::touch(&mut cache, &9));
            assert_eq!(LruCacheTrait::peek_lru(&cache), Some((&1, &1)));
            assert_eq!(LruCacheTrait::pop_lru(&mut cache), Some((1, 1)));
            assert_eq!(cache.len(), 2);
        }
    }

    // ==============================================
    // INVARIANTS
    // ==============================================
    mod invariants {
        use super::*;

        #[test]
        fn test_invariants_hold_through_mixed_ops() {
            let mut cache = LruCache::new(3);
            for i in 0..10 {
                cache.insert(i % 5, i);
                if i % 3 == 0 {
                    cache.remove(&(i % 4));
                }
                if i % 2 == 0 {
                    cache.contains_key(&(i % 5));
                }
                cache.check_invariants().unwrap();
                cache.list.debug_validate_invariants();
            }
        }

        #[test]
        fn test_invariant_violation_is_reported() {
            let mut cache = LruCache::new(3);
            cache.insert(1, 1);
            cache.insert(2, 2);
            // break lockstep on purpose
            cache.index.remove(&1);
            let err = cache.check_invariants().unwrap_err();
            assert!(err.message().contains("index holds 1 keys"));
        }
    }
}
