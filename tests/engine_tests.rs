//! Engine Integration Tests
//!
//! Drives the evaluator and invalidation gateway through the public API with
//! cache and store doubles.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use flag_engine::cache::{CacheResult, KeyValueCache, MemoryCache};
use flag_engine::error::{CacheError, StoreError};
use flag_engine::models::{EvaluationDecision, FlagDefinition, Reason};
use flag_engine::store::{DefinitionStore, MemoryDefinitionStore};
use flag_engine::{EngineError, EngineSettings, FlagEngine};

// == Test Doubles ==

/// Wraps a [`MemoryCache`] and can be switched into an outage.
#[derive(Clone)]
struct FlakyCache {
    inner: MemoryCache,
    down: Arc<AtomicBool>,
}

impl FlakyCache {
    fn new() -> Self {
        Self {
            inner: MemoryCache::new(1000),
            down: Arc::new(AtomicBool::new(false)),
        }
    }

    fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> CacheResult<()> {
        if self.down.load(Ordering::SeqCst) {
            Err(CacheError::Unavailable("cache host unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl KeyValueCache for FlakyCache {
    async fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        self.check()?;
        self.inner.get(key).await
    }

    async fn set_with_ttl(&self, key: &str, value: Vec<u8>, ttl: Duration) -> CacheResult<()> {
        self.check()?;
        self.inner.set_with_ttl(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.check()?;
        self.inner.delete(key).await
    }

    async fn keys_matching_pattern(&self, pattern: &str) -> CacheResult<Vec<String>> {
        self.check()?;
        self.inner.keys_matching_pattern(pattern).await
    }
}

/// Answers each flag after a per-key delay and records completion order.
struct DelayedStore {
    inner: MemoryDefinitionStore,
    delays: HashMap<String, Duration>,
    completed: Mutex<Vec<String>>,
}

#[async_trait]
impl DefinitionStore for DelayedStore {
    async fn find_definition(&self, flag_key: &str) -> Result<Option<FlagDefinition>, StoreError> {
        if let Some(delay) = self.delays.get(flag_key) {
            tokio::time::sleep(*delay).await;
        }
        let result = self.inner.find_definition(flag_key).await;
        self.completed.lock().unwrap().push(flag_key.to_string());
        result
    }
}

/// Reads its snapshot immediately, replies after `delay`.
struct SlowReplyStore {
    inner: MemoryDefinitionStore,
    delay: Duration,
}

#[async_trait]
impl DefinitionStore for SlowReplyStore {
    async fn find_definition(&self, flag_key: &str) -> Result<Option<FlagDefinition>, StoreError> {
        let snapshot = self.inner.find_definition(flag_key).await;
        tokio::time::sleep(self.delay).await;
        snapshot
    }
}

fn settings() -> EngineSettings {
    EngineSettings {
        cache_timeout: Duration::from_millis(100),
        store_timeout: Duration::from_millis(500),
        ..EngineSettings::default()
    }
}

// == Cache Coherence ==

#[tokio::test]
async fn test_invalidate_forces_fresh_definition_read() {
    let cache = MemoryCache::new(1000);
    let store = Arc::new(MemoryDefinitionStore::with_flags([FlagDefinition::percentage(
        "rollout", true, 100,
    )]));
    let engine = FlagEngine::new(Arc::new(cache), store.clone(), &settings());
    let identities = ["u1", "u2", "u3"];

    for identity in identities {
        let decision = engine.evaluator.evaluate_one("rollout", identity).await.unwrap();
        assert_eq!(decision.reason, Reason::PercentageMatch);
    }
    assert_eq!(store.reads(), 1);

    store.modify("rollout", |f| f.percentage = 0).await;
    let report = engine.invalidation.invalidate("rollout").await;
    assert_eq!(report.decisions_evicted, identities.len());

    for identity in identities {
        let decision = engine.evaluator.evaluate_one("rollout", identity).await.unwrap();
        assert_eq!(decision.reason, Reason::PercentageMiss);
    }
    assert_eq!(store.reads(), 2);
}

#[tokio::test]
async fn test_invalidation_leaves_other_flags_cached() {
    let store = Arc::new(MemoryDefinitionStore::with_flags([
        FlagDefinition::boolean("a", true),
        FlagDefinition::boolean("a-2", true),
    ]));
    let engine = FlagEngine::new(Arc::new(MemoryCache::new(1000)), store.clone(), &settings());

    engine.evaluator.evaluate_batch(&["a", "a-2"], "u1").await.unwrap();
    assert_eq!(store.reads(), 2);

    engine.invalidation.invalidate("a").await;
    engine.evaluator.evaluate_batch(&["a", "a-2"], "u1").await.unwrap();

    assert_eq!(store.reads(), 3);
}

#[tokio::test]
async fn test_in_flight_evaluation_cannot_recache_old_definition() {
    let store = Arc::new(SlowReplyStore {
        inner: MemoryDefinitionStore::with_flags([FlagDefinition::boolean("a", true)]),
        delay: Duration::from_millis(100),
    });
    let engine = FlagEngine::new(Arc::new(MemoryCache::new(1000)), store.clone(), &settings());

    let evaluator = engine.evaluator.clone();
    let in_flight = tokio::spawn(async move { evaluator.evaluate_one("a", "u1").await });
    tokio::time::sleep(Duration::from_millis(30)).await;

    store.inner.modify("a", |f| f.enabled = false).await;
    let report = engine.invalidation.invalidate("a").await;
    assert!(!report.degraded);

    // Answered from the pre-mutation snapshot, but nothing of it stays cached
    assert!(in_flight.await.unwrap().unwrap().enabled);

    for identity in ["u1", "u2"] {
        let decision = engine.evaluator.evaluate_one("a", identity).await.unwrap();
        assert_eq!(decision, EvaluationDecision::disabled("a"));
    }
}

#[tokio::test]
async fn test_degraded_invalidation_is_reported() {
    let cache = FlakyCache::new();
    let store = Arc::new(MemoryDefinitionStore::with_flags([FlagDefinition::boolean("a", true)]));
    let engine = FlagEngine::new(Arc::new(cache.clone()), store.clone(), &settings());

    engine.evaluator.evaluate_one("a", "u1").await.unwrap();

    cache.set_down(true);
    let report = engine.invalidation.invalidate("a").await;
    assert!(report.degraded);

    // Cache outage during evaluation degrades to the store, not to an error
    store.modify("a", |f| f.enabled = false).await;
    let decision = engine.evaluator.evaluate_one("a", "u1").await.unwrap();
    assert_eq!(decision.reason, Reason::FlagDisabled);
}

#[tokio::test]
async fn test_decisions_self_heal_after_ttl() {
    let settings = EngineSettings {
        decision_ttl: Duration::from_millis(50),
        definition_ttl: Duration::from_millis(50),
        ..settings()
    };
    let store = Arc::new(MemoryDefinitionStore::with_flags([FlagDefinition::boolean("a", true)]));
    let engine = FlagEngine::new(Arc::new(MemoryCache::new(1000)), store.clone(), &settings);

    assert!(engine.evaluator.evaluate_one("a", "u1").await.unwrap().enabled);

    // Mutation without invalidation: bounded staleness only
    store.modify("a", |f| f.enabled = false).await;
    assert!(engine.evaluator.evaluate_one("a", "u1").await.unwrap().enabled);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!engine.evaluator.evaluate_one("a", "u1").await.unwrap().enabled);
}

// == Batch Ordering ==

#[tokio::test]
async fn test_batch_order_independent_of_completion_order() {
    let inner = MemoryDefinitionStore::with_flags([
        FlagDefinition::boolean("k1", true),
        FlagDefinition::boolean("k2", false),
        FlagDefinition::percentage("k3", true, 100),
    ]);
    let delays = HashMap::from([
        ("k1".to_string(), Duration::from_millis(120)),
        ("k2".to_string(), Duration::from_millis(60)),
        ("k3".to_string(), Duration::from_millis(0)),
    ]);
    let store = Arc::new(DelayedStore {
        inner,
        delays,
        completed: Mutex::new(Vec::new()),
    });
    let engine = FlagEngine::new(Arc::new(MemoryCache::new(1000)), store.clone(), &settings());

    let decisions = engine
        .evaluator
        .evaluate_batch(&["k1", "k2", "k3"], "u1")
        .await
        .unwrap();

    assert_eq!(*store.completed.lock().unwrap(), ["k3", "k2", "k1"]);

    let keys: Vec<&str> = decisions.iter().map(|d| d.flag_key.as_str()).collect();
    assert_eq!(keys, ["k1", "k2", "k3"]);
    assert_eq!(decisions[0].reason, Reason::BooleanOn);
    assert_eq!(decisions[1].reason, Reason::FlagDisabled);
    assert_eq!(decisions[2].reason, Reason::PercentageMatch);
}

#[tokio::test]
async fn test_batch_runs_keys_concurrently() {
    let keys: Vec<String> = (0..10).map(|i| format!("slow-{}", i)).collect();
    let delays = keys
        .iter()
        .map(|k| (k.clone(), Duration::from_millis(100)))
        .collect();
    let store = Arc::new(DelayedStore {
        inner: MemoryDefinitionStore::new(),
        delays,
        completed: Mutex::new(Vec::new()),
    });
    let engine = FlagEngine::new(Arc::new(MemoryCache::new(1000)), store, &settings());

    let started = std::time::Instant::now();
    let decisions = engine.evaluator.evaluate_batch(&keys, "u1").await.unwrap();

    assert_eq!(decisions.len(), 10);
    assert!(decisions.iter().all(|d| d.reason == Reason::FlagNotFound));
    assert!(started.elapsed() < Duration::from_millis(600));
}

// == Failure Modes ==

#[tokio::test]
async fn test_store_timeout_is_failure_not_not_found() {
    let store = Arc::new(DelayedStore {
        inner: MemoryDefinitionStore::with_flags([FlagDefinition::boolean("slow", true)]),
        delays: HashMap::from([("slow".to_string(), Duration::from_secs(5))]),
        completed: Mutex::new(Vec::new()),
    });
    let engine = FlagEngine::new(Arc::new(MemoryCache::new(1000)), store, &settings());

    let result = engine.evaluator.evaluate_one("slow", "u1").await;

    assert_eq!(
        result,
        Err(EngineError::Store(StoreError::Timeout(Duration::from_millis(500))))
    );
}

#[tokio::test]
async fn test_total_cache_outage_still_answers() {
    let cache = FlakyCache::new();
    cache.set_down(true);
    let store = Arc::new(MemoryDefinitionStore::with_flags([FlagDefinition::user_target(
        "beta",
        true,
        ["vip_user"],
    )]));
    let engine = FlagEngine::new(Arc::new(cache), store.clone(), &settings());

    let decisions = engine
        .evaluator
        .evaluate_batch(&["beta", "missing"], "vip_user")
        .await
        .unwrap();

    assert_eq!(decisions[0].reason, Reason::UserTargeted);
    assert_eq!(decisions[1].reason, Reason::FlagNotFound);
    assert_eq!(store.reads(), 2);
}
