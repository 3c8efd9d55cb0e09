//! Flag Definition Cache
//!
//! Cache-aside reads of flag definitions in front of the durable store.
//! Cache trouble degrades to a direct store read; only store failures
//! propagate. Absent flags are never cached, so a flag created right after
//! a miss is visible on the next read.
//!
//! Each flag carries an invalidation generation. A read that started before
//! an invalidation and writes back afterwards deletes its own write again, so
//! a definition loaded from the pre-mutation store cannot outlive the
//! invalidation that was meant to remove it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use crate::cache::{CacheResult, KeyValueCache};
use crate::config::EngineSettings;
use crate::engine::tier::{self, CacheLookup};
use crate::error::StoreError;
use crate::models::FlagDefinition;
use crate::store::DefinitionStore;

/// Cache key holding a flag's definition snapshot.
pub fn definition_key(flag_key: &str) -> String {
    format!("flag:data:{}", flag_key)
}

// == Flag Definition Cache ==
pub struct FlagDefinitionCache {
    cache: Arc<dyn KeyValueCache>,
    store: Arc<dyn DefinitionStore>,
    ttl: Duration,
    cache_timeout: Duration,
    store_timeout: Duration,
    generations: RwLock<HashMap<String, u64>>,
}

impl FlagDefinitionCache {
    pub fn new(
        cache: Arc<dyn KeyValueCache>,
        store: Arc<dyn DefinitionStore>,
        settings: &EngineSettings,
    ) -> Self {
        Self {
            cache,
            store,
            ttl: settings.definition_ttl,
            cache_timeout: settings.cache_timeout,
            store_timeout: settings.store_timeout,
            generations: RwLock::new(HashMap::new()),
        }
    }

    /// Number of invalidations seen for `flag_key` by this process.
    pub async fn generation(&self, flag_key: &str) -> u64 {
        self.generations
            .read()
            .await
            .get(flag_key)
            .copied()
            .unwrap_or(0)
    }

    // == Get ==
    /// Returns the definition for `flag_key`, or `None` if the store has none.
    pub async fn get(&self, flag_key: &str) -> Result<Option<FlagDefinition>, StoreError> {
        let key = definition_key(flag_key);

        match tier::read_json::<FlagDefinition>(self.cache.as_ref(), &key, self.cache_timeout).await {
            CacheLookup::Hit(definition) => {
                debug!(flag_key, "definition cache hit");
                return Ok(Some(definition));
            }
            CacheLookup::Miss => debug!(flag_key, "definition cache miss"),
            CacheLookup::Error(e) => {
                warn!(flag_key, error = %e, "definition cache read failed, falling back to store")
            }
        }

        let generation = self.generation(flag_key).await;
        let definition = self.load(flag_key).await?;

        if let Some(definition) = &definition {
            let written =
                tier::write_json(self.cache.as_ref(), &key, definition, self.ttl, self.cache_timeout)
                    .await;
            match written {
                Ok(()) => self.retract_if_invalidated(flag_key, &key, generation).await,
                Err(e) => warn!(flag_key, error = %e, "definition cache write failed"),
            }
        }

        Ok(definition)
    }

    // == Invalidate ==
    /// Bumps the flag's generation, then evicts the cached definition.
    /// Evicting an absent entry succeeds.
    pub async fn invalidate(&self, flag_key: &str) -> CacheResult<()> {
        *self
            .generations
            .write()
            .await
            .entry(flag_key.to_string())
            .or_insert(0) += 1;

        let key = definition_key(flag_key);
        tier::bounded(self.cache_timeout, self.cache.delete(&key)).await
    }

    /// Deletes a just-written entry if an invalidation ran since `generation`
    /// was read. Bump happens before delete in `invalidate`, so either this
    /// check sees the new generation or the invalidation's delete lands after
    /// the write.
    async fn retract_if_invalidated(&self, flag_key: &str, key: &str, generation: u64) {
        if self.generation(flag_key).await == generation {
            return;
        }
        debug!(flag_key, "definition invalidated during load, retracting cache write");
        if let Err(e) = tier::bounded(self.cache_timeout, self.cache.delete(key)).await {
            warn!(flag_key, error = %e, "retracting stale definition failed");
        }
    }

    async fn load(&self, flag_key: &str) -> Result<Option<FlagDefinition>, StoreError> {
        let result = tokio::time::timeout(self.store_timeout, self.store.find_definition(flag_key))
            .await
            .unwrap_or(Err(StoreError::Timeout(self.store_timeout)));

        if let Err(e) = &result {
            error!(flag_key, error = %e, "definition store read failed");
        }
        result
    }
}
