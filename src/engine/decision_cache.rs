//! Decision Cache
//!
//! Caches final decisions per (flag key, identity) with a short TTL.
//! Entries are pure functions of a definition snapshot, never a source of truth.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::{CacheResult, KeyValueCache};
use crate::config::EngineSettings;
use crate::engine::tier::{self, CacheLookup};
use crate::models::EvaluationDecision;

pub fn decision_key(flag_key: &str, identity: &str) -> String {
    format!("flag:eval:{}:{}", flag_key, identity)
}

/// Pattern covering every cached decision of one flag.
///
/// Flag keys cannot contain `:`, `*` or `?`, so the pattern is exact.
pub fn flag_decisions_pattern(flag_key: &str) -> String {
    format!("flag:eval:{}:*", flag_key)
}

// == Decision Cache ==
pub struct DecisionCache {
    cache: Arc<dyn KeyValueCache>,
    ttl: Duration,
    timeout: Duration,
}

impl DecisionCache {
    pub fn new(cache: Arc<dyn KeyValueCache>, settings: &EngineSettings) -> Self {
        Self {
            cache,
            ttl: settings.decision_ttl,
            timeout: settings.cache_timeout,
        }
    }

    pub async fn get(&self, flag_key: &str, identity: &str) -> CacheLookup<EvaluationDecision> {
        let key = decision_key(flag_key, identity);
        let lookup = tier::read_json(self.cache.as_ref(), &key, self.timeout).await;

        match &lookup {
            CacheLookup::Hit(_) => debug!(flag_key, identity, "decision cache hit"),
            CacheLookup::Miss => debug!(flag_key, identity, "decision cache miss"),
            CacheLookup::Error(e) => {
                warn!(flag_key, identity, error = %e, "decision cache read failed")
            }
        }
        lookup
    }

    /// Best-effort write; failures are logged and dropped.
    pub async fn put(&self, identity: &str, decision: &EvaluationDecision) {
        let key = decision_key(&decision.flag_key, identity);
        if let Err(e) = tier::write_json(self.cache.as_ref(), &key, decision, self.ttl, self.timeout).await {
            warn!(flag_key = %decision.flag_key, identity, error = %e, "decision cache write failed");
        }
    }

    /// Drops one cached decision, best-effort.
    pub async fn discard(&self, flag_key: &str, identity: &str) {
        let key = decision_key(flag_key, identity);
        if let Err(e) = tier::bounded(self.timeout, self.cache.delete(&key)).await {
            warn!(flag_key, identity, error = %e, "decision cache delete failed");
        }
    }

    // == Evict Flag ==
    /// Deletes every cached decision for `flag_key` and returns how many went.
    ///
    /// All matching keys are attempted even if some deletes fail; the first
    /// failure is returned afterwards.
    pub async fn evict_flag(&self, flag_key: &str) -> CacheResult<usize> {
        let pattern = flag_decisions_pattern(flag_key);
        let keys = tier::bounded(self.timeout, self.cache.keys_matching_pattern(&pattern)).await?;

        let mut evicted = 0;
        let mut first_error = None;
        for key in &keys {
            match tier::bounded(self.timeout, self.cache.delete(key)).await {
                Ok(()) => evicted += 1,
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(evicted),
        }
    }
}
