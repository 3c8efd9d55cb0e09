//! Durable flag definition store seam.
//!
//! The engine reads definitions through [`DefinitionStore`]. The in-memory
//! implementation backs the binary and the tests, and counts reads so cache
//! behaviour can be observed from the outside.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::FlagDefinition;

// == Definition Store ==
#[async_trait]
pub trait DefinitionStore: Send + Sync {
    /// `Ok(None)` when no flag with this key exists.
    async fn find_definition(&self, flag_key: &str) -> Result<Option<FlagDefinition>, StoreError>;
}

// == Memory Definition Store ==
#[derive(Debug, Default)]
pub struct MemoryDefinitionStore {
    flags: RwLock<HashMap<String, FlagDefinition>>,
    reads: AtomicU64,
    offline: AtomicBool,
}

impl MemoryDefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(flags: impl IntoIterator<Item = FlagDefinition>) -> Self {
        let map = flags.into_iter().map(|f| (f.key.clone(), f)).collect();
        Self {
            flags: RwLock::new(map),
            ..Self::default()
        }
    }

    /// Inserts or replaces a definition, returning the previous one.
    pub async fn upsert(&self, flag: FlagDefinition) -> Option<FlagDefinition> {
        self.flags.write().await.insert(flag.key.clone(), flag)
    }

    /// Inserts only if the key is free. Returns false on conflict.
    pub async fn insert_new(&self, flag: FlagDefinition) -> bool {
        let mut flags = self.flags.write().await;
        if flags.contains_key(&flag.key) {
            return false;
        }
        flags.insert(flag.key.clone(), flag);
        true
    }

    /// Applies `change` to an existing definition and returns the new snapshot.
    pub async fn modify<F>(&self, flag_key: &str, change: F) -> Option<FlagDefinition>
    where
        F: FnOnce(&mut FlagDefinition),
    {
        let mut flags = self.flags.write().await;
        let flag = flags.get_mut(flag_key)?;
        change(flag);
        Some(flag.clone())
    }

    pub async fn remove(&self, flag_key: &str) -> Option<FlagDefinition> {
        self.flags.write().await.remove(flag_key)
    }

    /// Definitions accepted by `filter`, ordered by key, skipping `offset`
    /// and keeping at most `limit`. Also returns how many matched in total.
    pub async fn list<F>(&self, filter: F, offset: usize, limit: usize) -> (Vec<FlagDefinition>, usize)
    where
        F: Fn(&FlagDefinition) -> bool,
    {
        let flags = self.flags.read().await;
        let mut matched: Vec<&FlagDefinition> = flags.values().filter(|&f| filter(f)).collect();
        matched.sort_by(|a, b| a.key.cmp(&b.key));

        let total = matched.len();
        let page = matched.into_iter().skip(offset).take(limit).cloned().collect();
        (page, total)
    }

    /// Definition lookups served so far.
    pub fn reads(&self) -> u64 {
        self.reads.load(Ordering::SeqCst)
    }

    /// Simulates an outage: every read fails while offline.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

#[async_trait]
impl DefinitionStore for MemoryDefinitionStore {
    async fn find_definition(&self, flag_key: &str) -> Result<Option<FlagDefinition>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("store is offline".to_string()));
        }
        Ok(self.flags.read().await.get(flag_key).cloned())
    }
}
