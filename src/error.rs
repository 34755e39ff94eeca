//! Error types for the lrukit library.
//!
//! ## Key Components
//!
//! - [`CacheError`]: Returned by failing accessors on the cache and by the
//!   structural operations of the recency list.
//! - [`ConfigError`]: Returned when cache configuration parameters are invalid
//!   (e.g. zero capacity).
//! - [`InvariantError`]: Returned when the key index and the recency list
//!   have drifted apart (`check_invariants` methods).
//!
//! ## Example Usage
//!
//! ```
//! use lrukit::error::{CacheError, ConfigError};
//! use lrukit::policy::lru::LruCache;
//!
//! // Fallible constructor for user-configurable parameters
//! let bad: Result<LruCache<u64, u64>, ConfigError> = LruCache::try_new(0);
//! assert!(bad.is_err());
//!
//! let mut cache = LruCache::new(4);
//! cache.insert(1, "one");
//! assert_eq!(cache.get(&2), Err(CacheError::KeyNotFound));
//! ```

use thiserror::Error;

use crate::ds::slot_arena::SlotId;

// ---------------------------------------------------------------------------
// CacheError
// ---------------------------------------------------------------------------

/// Error returned by cache and recency-list operations.
///
/// `KeyNotFound` and `EmptySequence` are ordinary outcomes of the failing
/// accessors. `InvalidHandle` only surfaces when the key index points at a
/// node that is no longer linked, which is a bug in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CacheError {
    /// A failing accessor was called for a key that is not cached.
    #[error("key not found")]
    KeyNotFound,

    /// A peek was attempted on a cache (or list) with no entries.
    #[error("sequence is empty")]
    EmptySequence,

    /// A node handle does not refer to a live node.
    #[error("invalid node handle: {0:?}")]
    InvalidHandle(SlotId),
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`LruCache::try_new`](crate::policy::lru::LruCache::try_new),
/// [`LruCache::set_capacity`](crate::policy::lru::LruCache::set_capacity) and
/// [`LruCacheBuilder::try_build`](crate::builder::LruCacheBuilder::try_build).
///
/// # Example
///
/// ```
/// use lrukit::policy::lru::LruCache;
///
/// let err = LruCache::<u64, u64>::try_new(0).unwrap_err();
/// assert!(err.to_string().contains("capacity"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by [`LruCache::check_invariants`](crate::policy::lru::LruCache::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
