//! Cache Module
//!
//! The key-value cache tier: an in-memory store with TTL expiration, LRU
//! eviction and glob key scans, exposed through the [`KeyValueCache`] trait.

mod backend;
mod entry;
mod lru;
mod pattern;
mod stats;
mod store;


// Re-export public types
pub use backend::{KeyValueCache, MemoryCache};
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::CacheStore;

use crate::error::CacheError;

/// Result type for cache tier operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Maximum allowed value size in bytes
pub const MAX_VALUE_SIZE: usize = 1024 * 1024; // 1 MB
