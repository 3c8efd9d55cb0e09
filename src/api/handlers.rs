//! API Handlers
//!
//! Thin HTTP adapters over the evaluation engine and flag management.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::admin::FlagAdmin;
use crate::cache::MemoryCache;
use crate::config::Config;
use crate::engine::{FlagEngine, InvalidationReport};
use crate::error::Result;
use crate::models::{
    BulkEvaluateRequest, BulkEvaluateResponse, CreateFlagRequest, EvaluateRequest, EvaluateResponse,
    FlagDefinition, FlagListResponse, FlagResponse, HealthResponse, ListFlagsQuery, StatsResponse,
    UpdateFlagRequest,
};
use crate::store::MemoryDefinitionStore;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: FlagEngine,
    pub admin: Arc<FlagAdmin>,
    pub cache: MemoryCache,
    pub store: Arc<MemoryDefinitionStore>,
}

impl AppState {
    /// Wires the engine and the management path over one cache and store.
    pub fn new(cache: MemoryCache, store: Arc<MemoryDefinitionStore>, config: &Config) -> Self {
        let engine = FlagEngine::new(
            Arc::new(cache.clone()),
            store.clone(),
            &config.engine_settings(),
        );
        let admin = Arc::new(FlagAdmin::new(store.clone(), engine.invalidation.clone()));

        Self {
            engine,
            admin,
            cache,
            store,
        }
    }

    /// Fresh in-memory cache and empty store sized from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            MemoryCache::new(config.max_entries),
            Arc::new(MemoryDefinitionStore::new()),
            config,
        )
    }
}

/// Handler for POST /api/v1/evaluate
pub async fn evaluate_handler(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>> {
    let decision = state
        .engine
        .evaluator
        .evaluate_one(&req.flag_key, &req.context.user_id)
        .await?;

    Ok(Json(EvaluateResponse::new(decision)))
}

/// Handler for POST /api/v1/evaluate/bulk
pub async fn bulk_evaluate_handler(
    State(state): State<AppState>,
    Json(req): Json<BulkEvaluateRequest>,
) -> Result<Json<BulkEvaluateResponse>> {
    let evaluations = state
        .engine
        .evaluator
        .evaluate_batch(req.flag_keys.as_slice(), &req.context.user_id)
        .await?;

    Ok(Json(BulkEvaluateResponse::new(evaluations)))
}

/// Handler for POST /api/v1/flags
pub async fn create_flag_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateFlagRequest>,
) -> Result<(StatusCode, Json<FlagResponse>)> {
    let flag = state.admin.create(FlagDefinition::try_from(req)?).await?;
    Ok((StatusCode::CREATED, Json(flag.into())))
}

/// Handler for GET /api/v1/flags
pub async fn list_flags_handler(
    State(state): State<AppState>,
    Query(query): Query<ListFlagsQuery>,
) -> Result<Json<FlagListResponse>> {
    let page = state.admin.list(query.into()).await?;
    Ok(Json(page.into()))
}

/// Handler for GET /api/v1/flags/:key
pub async fn get_flag_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<FlagResponse>> {
    let flag = state.admin.get(&key).await?;
    Ok(Json(flag.into()))
}

/// Handler for PATCH /api/v1/flags/:key
pub async fn update_flag_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<UpdateFlagRequest>,
) -> Result<Json<FlagResponse>> {
    let flag = state.admin.update(&key, req.into()).await?;
    Ok(Json(flag.into()))
}

/// Handler for POST /api/v1/flags/:key/toggle
pub async fn toggle_flag_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<FlagResponse>> {
    let flag = state.admin.toggle(&key).await?;
    Ok(Json(flag.into()))
}

/// Handler for DELETE /api/v1/flags/:key
pub async fn delete_flag_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode> {
    state.admin.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for POST /api/v1/flags/:key/invalidate
pub async fn invalidate_flag_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<InvalidationReport>> {
    let report = state.admin.invalidate(&key).await?;
    Ok(Json(report))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(state.cache.stats().await.into())
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::models::{EvaluationContext, FlagType, Reason};

    fn state_with(flags: Vec<FlagDefinition>) -> AppState {
        AppState::new(
            MemoryCache::new(100),
            Arc::new(MemoryDefinitionStore::with_flags(flags)),
            &Config::default(),
        )
    }

    fn context(user_id: &str) -> EvaluationContext {
        EvaluationContext {
            user_id: user_id.to_string(),
            attributes: None,
        }
    }

    #[tokio::test]
    async fn test_evaluate_handler() {
        let state = state_with(vec![FlagDefinition::percentage("rollout", true, 100)]);

        let req = EvaluateRequest {
            flag_key: "rollout".to_string(),
            context: context("anyone"),
        };
        let response = evaluate_handler(State(state), Json(req)).await.unwrap();

        assert!(response.decision.enabled);
        assert_eq!(response.decision.reason, Reason::PercentageMatch);
    }

    #[tokio::test]
    async fn test_evaluate_handler_rejects_empty_user() {
        let state = state_with(vec![]);

        let req = EvaluateRequest {
            flag_key: "rollout".to_string(),
            context: context(""),
        };
        let result = evaluate_handler(State(state), Json(req)).await;

        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_bulk_evaluate_handler() {
        let state = state_with(vec![FlagDefinition::boolean("a", true)]);

        let req = BulkEvaluateRequest {
            flag_keys: vec!["missing".to_string(), "a".to_string()],
            context: context("u1"),
        };
        let response = bulk_evaluate_handler(State(state), Json(req)).await.unwrap();

        assert_eq!(response.evaluations.len(), 2);
        assert_eq!(response.evaluations[0].reason, Reason::FlagNotFound);
        assert_eq!(response.evaluations[1].reason, Reason::BooleanOn);
    }

    #[tokio::test]
    async fn test_create_then_toggle_handler() {
        let state = state_with(vec![]);

        let req = CreateFlagRequest {
            key: "new-flag".to_string(),
            flag_type: FlagType::Boolean,
            enabled: true,
            percentage: None,
            target_user_ids: vec![],
        };
        let (status, _) = create_flag_handler(State(state.clone()), Json(req)).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);

        let toggled = toggle_flag_handler(State(state), Path("new-flag".to_string()))
            .await
            .unwrap();
        assert!(!toggled.enabled);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
