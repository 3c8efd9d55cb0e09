//! Evaluation Engine
//!
//! Resolves one (flag key, identity) pair through the decision cache, the
//! definition cache and finally the store, then applies the evaluation rule.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::bucketing;
use crate::engine::tier::CacheLookup;
use crate::engine::{DecisionCache, FlagDefinitionCache};
use crate::error::{EngineError, Result};
use crate::models::{validate_flag_key, validate_identity, EvaluationDecision, FlagDefinition, FlagType, Reason};

// == Evaluation Rule ==
/// Pure decision for `identity` given the definition snapshot (if any).
pub fn decide(flag_key: &str, definition: Option<&FlagDefinition>, identity: &str) -> EvaluationDecision {
    let Some(flag) = definition else {
        return EvaluationDecision::not_found(flag_key);
    };

    if !flag.enabled {
        return EvaluationDecision::disabled(flag_key);
    }

    match flag.flag_type {
        FlagType::Boolean => EvaluationDecision::new(flag_key, true, Reason::BooleanOn),
        FlagType::Percentage => {
            let matched = bucketing::bucket(identity, flag_key, flag.percentage);
            let reason = if matched {
                Reason::PercentageMatch
            } else {
                Reason::PercentageMiss
            };
            EvaluationDecision::new(flag_key, matched, reason)
        }
        FlagType::UserTarget => {
            let targeted = flag.target_identities.contains(identity);
            let reason = if targeted {
                Reason::UserTargeted
            } else {
                Reason::UserNotTargeted
            };
            EvaluationDecision::new(flag_key, targeted, reason)
        }
        FlagType::Unknown => EvaluationDecision::disabled(flag_key),
    }
}

// == Evaluation Engine ==
pub struct EvaluationEngine {
    definitions: Arc<FlagDefinitionCache>,
    decisions: Arc<DecisionCache>,
    max_batch_size: usize,
}

impl EvaluationEngine {
    pub fn new(
        definitions: Arc<FlagDefinitionCache>,
        decisions: Arc<DecisionCache>,
        max_batch_size: usize,
    ) -> Self {
        Self {
            definitions,
            decisions,
            max_batch_size,
        }
    }

    // == Evaluate One ==
    /// Decision for one flag. Unknown flags yield `FLAG_NOT_FOUND`; only
    /// invalid input and store outages are errors.
    pub async fn evaluate_one(&self, flag_key: &str, identity: &str) -> Result<EvaluationDecision> {
        validate_flag_key(flag_key)?;
        validate_identity(identity)?;
        self.resolve(flag_key, identity).await
    }

    // == Evaluate Batch ==
    /// Decisions for several flags, in the order the keys were given.
    ///
    /// All input is validated before any lookup. Keys are resolved
    /// concurrently; a store outage on any key fails the whole batch.
    pub async fn evaluate_batch<S: AsRef<str>>(
        &self,
        flag_keys: &[S],
        identity: &str,
    ) -> Result<Vec<EvaluationDecision>> {
        validate_identity(identity)?;
        if flag_keys.is_empty() {
            return Err(EngineError::InvalidInput(
                "At least one flagKey is required".to_string(),
            ));
        }
        if flag_keys.len() > self.max_batch_size {
            return Err(EngineError::InvalidInput(format!(
                "At most {} flagKeys per batch, got {}",
                self.max_batch_size,
                flag_keys.len()
            )));
        }
        for key in flag_keys {
            validate_flag_key(key.as_ref())?;
        }

        // join_all keeps results in input order regardless of completion order
        join_all(flag_keys.iter().map(|key| self.resolve(key.as_ref(), identity)))
            .await
            .into_iter()
            .collect()
    }

    async fn resolve(&self, flag_key: &str, identity: &str) -> Result<EvaluationDecision> {
        if let CacheLookup::Hit(decision) = self.decisions.get(flag_key, identity).await {
            return Ok(decision);
        }

        let generation = self.definitions.generation(flag_key).await;
        let definition = self.definitions.get(flag_key).await.map_err(|e| {
            warn!(flag_key, identity, "evaluation failed: {}", e);
            EngineError::from(e)
        })?;

        let decision = decide(flag_key, definition.as_ref(), identity);
        self.decisions.put(identity, &decision).await;

        // Invalidated mid-flight: the decision may come from the old definition
        if self.definitions.generation(flag_key).await != generation {
            debug!(flag_key, identity, "flag invalidated during evaluation, discarding decision");
            self.decisions.discard(flag_key, identity).await;
        }
        Ok(decision)
    }
}
