//! lrukit: a bounded, recency-ordered key-value cache.
//!
//! [`LruCache`](policy::lru::LruCache) keeps at most `capacity` entries and
//! evicts the least recently used one when a new key would exceed that bound.
//! Lookups and writes promote the touched entry to most recently used.
//!
//! Internally the cache pairs a [`KeyIndex`](ds::KeyIndex) (key → node handle)
//! with a [`RecencyList`](ds::RecencyList) whose nodes live in a generational
//! [`SlotArena`](ds::SlotArena), so the cache owns every node and the index
//! and the list are two views over the same arena.
//!
//! ## Feature flags
//!
//! - `concurrency`: enables [`sync::ConcurrentLruCache`], a single-lock
//!   wrapper for shared access.

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;
pub mod prelude;
#[cfg(feature = "concurrency")]
pub mod sync;
pub mod traits;
