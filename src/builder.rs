//! Cache configuration and builder.
//!
//! ## Example
//!
//! ```rust
//! use lrukit::builder::LruCacheBuilder;
//!
//! let mut cache = LruCacheBuilder::new(100).build::<u64, String>();
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Ok(&"hello".to_string()));
//! ```
//!
//! ## LruConfig
//!
//! | Field      | Type    | Default | Description                            |
//! |------------|---------|---------|----------------------------------------|
//! | `capacity` | `usize` | 32      | Maximum entries admitted by `insert`   |
//! | `prealloc` | `bool`  | true    | Reserve slots for `capacity` up front  |

use std::hash::Hash;

use crate::error::ConfigError;
use crate::policy::lru::{DEFAULT_CAPACITY, LruCache};
#[cfg(feature = "concurrency")]
use crate::sync::ConcurrentLruCache;

/// Configuration for an [`LruCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LruConfig {
    /// Maximum number of entries the cache holds before `insert` evicts.
    pub capacity: usize,

    /// Reserve index and arena space for `capacity` entries at construction.
    ///
    /// Large capacities are only partially reserved.
    pub prealloc: bool,
}

impl Default for LruConfig {
    /// Defaults:
    /// - `capacity`: 32
    /// - `prealloc`: true
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            prealloc: true,
        }
    }
}

/// Builder for [`LruCache`] (and `ConcurrentLruCache` with the
/// `concurrency` feature).
#[derive(Debug, Clone, Default)]
pub struct LruCacheBuilder {
    config: LruConfig,
}

impl LruCacheBuilder {
    /// Starts a builder with the given capacity and default settings.
    pub fn new(capacity: usize) -> Self {
        Self {
            config: LruConfig {
                capacity,
                ..LruConfig::default()
            },
        }
    }

    /// Sets the capacity bound.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Enables or disables up-front reservation.
    pub fn prealloc(mut self, prealloc: bool) -> Self {
        self.config.prealloc = prealloc;
        self
    }

    /// Returns the configuration assembled so far.
    pub fn config(&self) -> LruConfig {
        self.config
    }

    /// Builds the cache.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. Use [`try_build`](Self::try_build)
    /// to handle the error.
    pub fn build<K, V>(self) -> LruCache<K, V>
    where
        K: Eq + Hash + Clone,
    {
        match self.try_build() {
            Ok(cache) => cache,
            Err(err) => panic!("{err}"),
        }
    }

    /// Builds the cache, returning an error for an invalid configuration.
    pub fn try_build<K, V>(self) -> Result<LruCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        LruCache::with_config(self.config)
    }

    /// Builds a thread-safe cache guarded by a single lock.
    #[cfg(feature = "concurrency")]
    pub fn try_build_concurrent<K, V>(self) -> Result<ConcurrentLruCache<K, V>, ConfigError>
    where
        K: Eq + Hash + Clone,
    {
        self.try_build().map(ConcurrentLruCache::from_cache)
    }
}
