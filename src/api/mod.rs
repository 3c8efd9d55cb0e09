//! API Module
//!
//! HTTP handlers and routing for the flag evaluation service.
//!
//! # Endpoints
//! - `POST /api/v1/evaluate` - Evaluate one flag
//! - `POST /api/v1/evaluate/bulk` - Evaluate several flags
//! - `/api/v1/flags/...` - Flag listing and management with cache invalidation
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
