pub use crate::builder::{LruCacheBuilder, LruConfig};
pub use crate::ds::{KeyIndex, RecencyList, SlotArena, SlotId};
pub use crate::error::{CacheError, ConfigError, InvariantError};
pub use crate::policy::lru::{DEFAULT_CAPACITY, LruCache};
#[cfg(feature = "concurrency")]
pub use crate::sync::ConcurrentLruCache;
pub use crate::traits::{ConcurrentCache, CoreCache, LruCacheTrait, MutableCache};
