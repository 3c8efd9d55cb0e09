//! Cache and store doubles for engine unit tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::cache::{CacheResult, KeyValueCache};
use crate::error::{CacheError, StoreError};
use crate::models::FlagDefinition;
use crate::store::{DefinitionStore, MemoryDefinitionStore};

/// Every operation fails as if the cache host were down.
pub struct FailingCache;

#[async_trait]
impl KeyValueCache for FailingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn set_with_ttl(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> CacheResult<()> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }

    async fn keys_matching_pattern(&self, _pattern: &str) -> CacheResult<Vec<String>> {
        Err(CacheError::Unavailable("connection refused".to_string()))
    }
}

/// Every operation hangs far beyond any test deadline.
pub struct StallingCache;

const STALL: Duration = Duration::from_secs(30);

#[async_trait]
impl KeyValueCache for StallingCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        tokio::time::sleep(STALL).await;
        Ok(None)
    }

    async fn set_with_ttl(&self, _key: &str, _value: Vec<u8>, _ttl: Duration) -> CacheResult<()> {
        tokio::time::sleep(STALL).await;
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        tokio::time::sleep(STALL).await;
        Ok(())
    }

    async fn keys_matching_pattern(&self, _pattern: &str) -> CacheResult<Vec<String>> {
        tokio::time::sleep(STALL).await;
        Ok(Vec::new())
    }
}

/// A store that never answers in time.
pub struct StallingStore;

#[async_trait]
impl DefinitionStore for StallingStore {
    async fn find_definition(&self, _flag_key: &str) -> Result<Option<FlagDefinition>, StoreError> {
        tokio::time::sleep(STALL).await;
        Ok(None)
    }
}

/// Takes its snapshot immediately but replies only after `delay`.
pub struct SlowReplyStore {
    pub inner: MemoryDefinitionStore,
    pub delay: Duration,
}

#[async_trait]
impl DefinitionStore for SlowReplyStore {
    async fn find_definition(&self, flag_key: &str) -> Result<Option<FlagDefinition>, StoreError> {
        let snapshot = self.inner.find_definition(flag_key).await;
        tokio::time::sleep(self.delay).await;
        snapshot
    }
}
