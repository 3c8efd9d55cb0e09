//! Flag Engine - feature-flag evaluation with a two-tier cache
//!
//! Deterministic percentage bucketing, cache-aside definition and decision
//! caches in front of a definition store, and invalidation that keeps both
//! cache tiers coherent with flag mutations.

pub mod admin;
pub mod api;
pub mod bucketing;
pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::{Config, EngineSettings};
pub use engine::{EvaluationEngine, FlagEngine, InvalidationGateway};
pub use error::{EngineError, Result};
pub use tasks::spawn_cleanup_task;
