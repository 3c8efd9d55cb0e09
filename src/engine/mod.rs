//! Evaluation & cache-consistency engine.
//!
//! Read path: decision cache → definition cache → definition store.
//! Write path: the mutation path commits to the store, then calls the
//! [`InvalidationGateway`] before it responds.

mod decision_cache;
mod definition_cache;
mod evaluator;
mod invalidation;
mod tier;

#[cfg(test)]
mod test_support;

pub use decision_cache::{decision_key, flag_decisions_pattern, DecisionCache};
pub use definition_cache::{definition_key, FlagDefinitionCache};
pub use evaluator::{decide, EvaluationEngine};
pub use invalidation::{InvalidationGateway, InvalidationReport};
pub use tier::CacheLookup;

use std::sync::Arc;

use crate::cache::KeyValueCache;
use crate::config::EngineSettings;
use crate::store::DefinitionStore;

// == Flag Engine ==
/// The evaluator and the invalidation gateway, sharing one pair of cache tiers.
///
/// Built once per process and passed around by `Arc`.
#[derive(Clone)]
pub struct FlagEngine {
    pub evaluator: Arc<EvaluationEngine>,
    pub invalidation: Arc<InvalidationGateway>,
}

impl FlagEngine {
    pub fn new(
        cache: Arc<dyn KeyValueCache>,
        store: Arc<dyn DefinitionStore>,
        settings: &EngineSettings,
    ) -> Self {
        let definitions = Arc::new(FlagDefinitionCache::new(cache.clone(), store, settings));
        let decisions = Arc::new(DecisionCache::new(cache, settings));

        Self {
            evaluator: Arc::new(EvaluationEngine::new(
                definitions.clone(),
                decisions.clone(),
                settings.max_batch_size,
            )),
            invalidation: Arc::new(InvalidationGateway::new(definitions, decisions)),
        }
    }
}
