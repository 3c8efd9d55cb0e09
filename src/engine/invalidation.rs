//! Invalidation Gateway
//!
//! Called by the mutation path after a durable write commits and before the
//! mutation responds. Bumps the flag's generation, evicts its definition
//! entry, then every decision cached for it.
//!
//! Consistency guarantee: when invalidation completes without `degraded`, no
//! entry derived from the old definition stays servable. Evaluations that
//! read the old definition before the invalidation and write back after it
//! see the bumped generation and delete their own writes. Generations are
//! per process: engines in other processes sharing the same cache, and a
//! degraded invalidation, fall back to TTL expiry, which the decision TTL
//! bounds because it never exceeds the definition TTL.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::engine::{DecisionCache, FlagDefinitionCache};

// == Invalidation Report ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidationReport {
    pub flag_key: String,
    pub definition_evicted: bool,
    pub decisions_evicted: usize,
    /// A cache error occurred; stale entries may live until their TTL.
    pub degraded: bool,
}

// == Invalidation Gateway ==
pub struct InvalidationGateway {
    definitions: Arc<FlagDefinitionCache>,
    decisions: Arc<DecisionCache>,
}

impl InvalidationGateway {
    pub fn new(definitions: Arc<FlagDefinitionCache>, decisions: Arc<DecisionCache>) -> Self {
        Self {
            definitions,
            decisions,
        }
    }

    /// Never fails: cache outages are logged and reported as `degraded`.
    pub async fn invalidate(&self, flag_key: &str) -> InvalidationReport {
        let mut report = InvalidationReport {
            flag_key: flag_key.to_string(),
            definition_evicted: false,
            decisions_evicted: 0,
            degraded: false,
        };

        match self.definitions.invalidate(flag_key).await {
            Ok(()) => report.definition_evicted = true,
            Err(e) => {
                report.degraded = true;
                warn!(flag_key, error = %e, "definition eviction failed");
            }
        }

        match self.decisions.evict_flag(flag_key).await {
            Ok(count) => report.decisions_evicted = count,
            Err(e) => {
                report.degraded = true;
                warn!(flag_key, error = %e, "decision eviction failed");
            }
        }

        if report.degraded {
            warn!(flag_key, "invalidation degraded, staleness bounded by cache TTLs");
        } else {
            info!(
                flag_key,
                decisions = report.decisions_evicted,
                "flag cache invalidated"
            );
        }

        report
    }
}
