//! Domain types and the HTTP request/response DTOs built on them.

pub mod flag;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use flag::{
    validate_flag_key, validate_identity, validate_percentage, EvaluationDecision, FlagDefinition,
    FlagType, Reason,
};
pub use requests::{
    BulkEvaluateRequest, CreateFlagRequest, EvaluateRequest, EvaluationContext, ListFlagsQuery,
    UpdateFlagRequest,
};
pub use responses::{
    BulkEvaluateResponse, EvaluateResponse, FlagListResponse, FlagResponse, HealthResponse,
    Pagination, StatsResponse,
};
