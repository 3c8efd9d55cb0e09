//! Error types for the flag engine
//!
//! Each layer has its own error enum. Cache errors never cross the engine
//! boundary, store errors surface as `EngineError::Store`.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by the key-value cache tier.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key has expired
    #[error("Key expired: {0}")]
    Expired(String),

    /// Invalid key or value
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cache is full and eviction failed
    #[error("Cache full: {0}")]
    CacheFull(String),

    /// Cache backend could not be reached
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    /// Cache call exceeded its deadline
    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),

    /// Stored bytes could not be encoded or decoded
    #[error("Cache serialization failed: {0}")]
    Serialization(String),
}

// == Store Error Enum ==
/// Errors raised by the durable flag definition store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Definition store unavailable: {0}")]
    Unavailable(String),

    #[error("Definition store read timed out after {0:?}")]
    Timeout(Duration),
}

// == Engine Error Enum ==
/// Caller-facing error type for evaluation and flag management.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed flag key, identity, or request body
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Durable store could not answer, so no decision could be made
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Flag does not exist (management operations only)
    #[error("Flag not found: {0}")]
    NotFound(String),

    /// Flag key already taken
    #[error("Flag already exists: {0}")]
    Conflict(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match &self {
            EngineError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            EngineError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Conflict(_) => StatusCode::CONFLICT,
            EngineError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
