//! API Routes
//!
//! Configures the Axum router with the evaluation and management endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    bulk_evaluate_handler, create_flag_handler, delete_flag_handler, evaluate_handler,
    get_flag_handler, health_handler, invalidate_flag_handler, list_flags_handler, stats_handler,
    toggle_flag_handler, update_flag_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `POST /api/v1/evaluate` - Evaluate one flag for a user
/// - `POST /api/v1/evaluate/bulk` - Evaluate several flags, order preserved
/// - `GET /api/v1/flags` - List flags (`page`, `limit`, `search`, `type`)
/// - `POST /api/v1/flags` - Create a flag
/// - `GET|PATCH|DELETE /api/v1/flags/:key` - Read, update or delete a flag
/// - `POST /api/v1/flags/:key/toggle` - Flip a flag's enabled state
/// - `POST /api/v1/flags/:key/invalidate` - Evict a flag's cache entries
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/evaluate", post(evaluate_handler))
        .route("/evaluate/bulk", post(bulk_evaluate_handler))
        .route("/flags", get(list_flags_handler).post(create_flag_handler))
        .route(
            "/flags/:key",
            get(get_flag_handler)
                .patch(update_flag_handler)
                .delete(delete_flag_handler),
        )
        .route("/flags/:key/toggle", post(toggle_flag_handler))
        .route("/flags/:key/invalidate", post(invalidate_flag_handler));

    Router::new()
        .nest("/api/v1", api)
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
