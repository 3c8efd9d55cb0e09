//! Cache backend seam.
//!
//! The engine only needs four primitives from a cache. [`MemoryCache`] is the
//! in-process implementation; a networked cache plugs in behind the same trait.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheResult, CacheStats, CacheStore};
use crate::error::CacheError;

// == Key Value Cache ==
/// Minimal cache contract. Single-key operations are atomic; nothing spans keys.
#[async_trait]
pub trait KeyValueCache: Send + Sync {
    /// `Ok(None)` on a miss (absent or expired).
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()>;

    /// Idempotent: deleting an absent key succeeds.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Live keys matching a glob pattern (`*`, `?`).
    async fn keys_matching_pattern(&self, pattern: &str) -> CacheResult<Vec<String>>;
}

// == Memory Cache ==
/// Shared handle to an in-process [`CacheStore`].
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<RwLock<CacheStore>>,
}

impl MemoryCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: Arc::new(RwLock::new(CacheStore::new(max_entries))),
        }
    }

    /// Underlying store, used by the cleanup task.
    pub fn store(&self) -> Arc<RwLock<CacheStore>> {
        self.store.clone()
    }

    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueCache for MemoryCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        // Write lock: reads update LRU order and stats
        let mut store = self.store.write().await;
        match store.get(key) {
            Ok(value) => Ok(Some(value)),
            Err(CacheError::NotFound(_)) | Err(CacheError::Expired(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        let mut store = self.store.write().await;
        store.set(key.to_string(), value, Some(ttl))
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut store = self.store.write().await;
        match store.delete(key) {
            Ok(()) | Err(CacheError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn keys_matching_pattern(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let store = self.store.read().await;
        Ok(store.keys_matching(pattern))
    }
}
