//! Cache Store Module
//!
//! In-memory key space combining an ordered map with LRU tracking and TTL
//! expiration. Ordered keys let prefix patterns run as range scans.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::time::Duration;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::pattern;
use crate::cache::{CacheEntry, CacheResult, CacheStats, LruTracker, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::CacheError;

// == Cache Store ==
/// Main cache storage with LRU eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore {
    entries: BTreeMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    max_entries: usize,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` keys.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries,
        }
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous entry and its TTL.
    ///
    /// At capacity, the least recently used entry is evicted first.
    pub fn set(&mut self, key: String, value: Vec<u8>, ttl: Option<Duration>) -> CacheResult<()> {
        if key.is_empty() || key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidRequest(format!(
                "Key must be 1..={} bytes",
                MAX_KEY_LENGTH
            )));
        }

        if value.len() > MAX_VALUE_SIZE {
            return Err(CacheError::InvalidRequest(format!(
                "Value exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            match self.lru.evict_oldest() {
                Some(evicted) => {
                    self.entries.remove(&evicted);
                    self.stats.record_eviction();
                }
                None => {
                    return Err(CacheError::CacheFull(
                        "Cache is full and eviction failed".to_string(),
                    ))
                }
            }
        }

        self.lru.touch(&key);
        self.entries.insert(key, CacheEntry::new(value, ttl));
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired.
    ///
    /// Expired entries are dropped on access and count as misses.
    pub fn get(&mut self, key: &str) -> CacheResult<Vec<u8>> {
        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return Err(CacheError::NotFound(key.to_string()));
        };

        if entry.is_expired() {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            self.stats.set_total_entries(self.entries.len());
            return Err(CacheError::Expired(key.to_string()));
        }

        let value = entry.value.clone();
        self.stats.record_hit();
        self.lru.touch(key);
        Ok(value)
    }

    // == Delete ==
    pub fn delete(&mut self, key: &str) -> CacheResult<()> {
        if self.entries.remove(key).is_some() {
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
            Ok(())
        } else {
            Err(CacheError::NotFound(key.to_string()))
        }
    }

    // == Keys Matching ==
    /// Lists live keys matching a glob `pattern`, in key order.
    ///
    /// Only the range starting at the pattern's literal prefix is visited.
    pub fn keys_matching(&self, pattern: &str) -> Vec<String> {
        let prefix = pattern::literal_prefix(pattern);
        let now = current_timestamp_ms();

        self.entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(prefix))
            .filter(|(key, entry)| !entry.is_expired_at(now) && pattern::matches(pattern, key))
            .map(|(key, _)| key.clone())
            .collect()
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Cleanup Expired ==
    /// Removes all expired entries and returns how many were dropped.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.entries.remove(key);
            self.lru.remove(key);
        }

        self.stats.record_expirations(expired.len());
        self.stats.set_total_entries(self.entries.len());
        expired.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
