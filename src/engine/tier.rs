//! Bounded, typed access to the cache tier.
//!
//! Every call carries a deadline. Reads come back as a tri-state
//! [`CacheLookup`] so callers can treat errors exactly like misses.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{CacheResult, KeyValueCache};
use crate::error::CacheError;

// == Cache Lookup ==
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
    /// Unreachable, timed out, or undecodable. Handled like a miss.
    Error(CacheError),
}

impl<T> CacheLookup<T> {
    pub fn hit(self) -> Option<T> {
        match self {
            CacheLookup::Hit(value) => Some(value),
            _ => None,
        }
    }
}

/// Runs a cache call under `timeout`, folding the elapsed deadline into `CacheError`.
pub async fn bounded<T, F>(timeout: Duration, call: F) -> CacheResult<T>
where
    F: Future<Output = CacheResult<T>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .unwrap_or(Err(CacheError::Timeout(timeout)))
}

pub async fn read_json<T: DeserializeOwned>(
    cache: &dyn KeyValueCache,
    key: &str,
    timeout: Duration,
) -> CacheLookup<T> {
    match bounded(timeout, cache.get(key)).await {
        Ok(None) => CacheLookup::Miss,
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => CacheLookup::Hit(value),
            Err(e) => CacheLookup::Error(CacheError::Serialization(e.to_string())),
        },
        Err(e) => CacheLookup::Error(e),
    }
}

pub async fn write_json<T: Serialize>(
    cache: &dyn KeyValueCache,
    key: &str,
    value: &T,
    ttl: Duration,
    timeout: Duration,
) -> CacheResult<()> {
    let bytes = serde_json::to_vec(value).map_err(|e| CacheError::Serialization(e.to_string()))?;
    bounded(timeout, cache.set_with_ttl(key, bytes, ttl)).await
}
