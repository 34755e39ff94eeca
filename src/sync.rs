//! Thread-safe wrapper around [`LruCache`].
//!
//! Every operation on an LRU cache, reads included, can reorder the recency
//! list, so the whole cache sits behind one `parking_lot::Mutex` held for the
//! duration of each call. There is no reader/writer split and no sharding.
//!
//! References cannot escape the lock, so reads either clone the value out
//! (`get_cloned`) or run a closure against it while the lock is held
//! (`get_with`).
//!
//! ```
//! use lrukit::sync::ConcurrentLruCache;
//!
//! let cache = ConcurrentLruCache::new(2);
//! let worker = cache.clone();
//! std::thread::spawn(move || {
//!     worker.insert(1, "one".to_string());
//! })
//! .join()
//! .unwrap();
//!
//! assert_eq!(cache.get_with(&1, |v| v.len()), Ok(3));
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{CacheError, ConfigError};
use crate::policy::lru::LruCache;
use crate::traits::ConcurrentCache;

/// Shared LRU cache; clones share the same underlying cache.
pub struct ConcurrentLruCache<K, V> {
    inner: Arc<Mutex<LruCache<K, V>>>,
}

impl<K, V> Clone for ConcurrentLruCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates a shared cache.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        Self::from_cache(LruCache::new(capacity))
    }

    /// Creates a shared cache, rejecting a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        LruCache::try_new(capacity).map(Self::from_cache)
    }

    /// Wraps an existing cache.
    pub fn from_cache(cache: LruCache<K, V>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(cache)),
        }
    }

    /// See [`LruCache::insert`].
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().insert(key, value)
    }

    /// See [`LruCache::index_set`].
    pub fn index_set(&self, key: K, value: V) -> Option<V> {
        self.inner.lock().index_set(key, value)
    }

    /// Runs `f` on the value for `key`, promoting it.
    pub fn get_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Result<R, CacheError> {
        let mut cache = self.inner.lock();
        cache.get(key).map(f)
    }

    /// Clones the value for `key` out of the cache, promoting it.
    pub fn get_cloned(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        let mut cache = self.inner.lock();
        cache.try_get(key).cloned()
    }

    /// See [`LruCache::contains_key`]; a hit promotes the entry.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// See [`LruCache::remove`].
    pub fn remove(&self, key: &K) -> bool {
        self.inner.lock().remove(key)
    }

    /// See [`LruCache::take`].
    pub fn take(&self, key: &K) -> Option<V> {
        self.inner.lock().take(key)
    }

    /// Runs `f` on the most recently used value.
    pub fn most_recent_with<R>(&self, f: impl FnOnce(&V) -> R) -> Result<R, CacheError> {
        let cache = self.inner.lock();
        cache.most_recent().map(f)
    }

    /// Runs `f` on the least recently used value.
    pub fn least_recent_with<R>(&self, f: impl FnOnce(&V) -> R) -> Result<R, CacheError> {
        let cache = self.inner.lock();
        cache.least_recent().map(f)
    }

    /// See [`LruCache::set_capacity`].
    pub fn set_capacity(&self, capacity: usize) -> Result<(), ConfigError> {
        self.inner.lock().set_capacity(capacity)
    }

    /// See [`LruCache::enforce_capacity`].
    pub fn enforce_capacity(&self) -> Vec<(K, V)> {
        self.inner.lock().enforce_capacity()
    }

    /// See [`LruCache::pop_lru`].
    pub fn pop_lru(&self) -> Option<(K, V)> {
        self.inner.lock().pop_lru()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.lock().capacity()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Snapshot of all pairs, most recently used first.
    pub fn to_vec(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.inner.lock().to_vec()
    }

    /// Runs `f` with exclusive access to the underlying cache, for sequences
    /// of operations that must not interleave with other threads.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut LruCache<K, V>) -> R) -> R {
        let mut cache = self.inner.lock();
        f(&mut cache)
    }
}

impl<K, V> fmt::Debug for ConcurrentLruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.inner.lock();
        f.debug_struct("ConcurrentLruCache")
            .field("len", &cache.len())
            .field("capacity", &cache.capacity())
            .finish_non_exhaustive()
    }
}

impl<K, V> ConcurrentCache for ConcurrentLruCache<K, V>
where
    K: Send,
    V: Send,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_ops_through_lock() {
        let cache = ConcurrentLruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.get_cloned(&"a"), Some(1));
        cache.insert("c", 3);

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains_key(&"b"));
        assert_eq!(cache.most_recent_with(|v| *v), Ok(3));
        assert_eq!(cache.least_recent_with(|v| *v), Ok(1));
        assert_eq!(cache.get_with(&"z", |v| *v), Err(CacheError::KeyNotFound));
    }

    #[test]
    fn clones_share_state() {
        let a = ConcurrentLruCache::new(4);
        let b = a.clone();
        a.insert(1, 1);
        assert!(b.contains_key(&1));
        b.clear();
        assert!(a.is_empty());
    }

    #[test]
    fn capacity_changes_and_enforcement() {
        let cache = ConcurrentLruCache::new(4);
        for i in 0..4 {
            cache.insert(i, i);
        }
        cache.set_capacity(1).unwrap();
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.enforce_capacity().len(), 3);
        assert_eq!(cache.to_vec(), vec![(3, 3)]);
        assert!(cache.set_capacity(0).is_err());
    }

    #[test]
    fn with_lock_runs_atomically() {
        let cache = ConcurrentLruCache::new(2);
        let len = cache.with_lock(|inner| {
            inner.insert(1, "x");
            inner.insert(2, "y");
            inner.insert(3, "z");
            inner.len()
        });
        assert_eq!(len, 2);
        assert_eq!(cache.pop_lru(), Some((2, "y")));
    }

    #[test]
    fn is_concurrent_cache() {
        fn assert_concurrent<C: ConcurrentCache>() {}
        assert_concurrent::<ConcurrentLruCache<u64, String>>();
    }
}
