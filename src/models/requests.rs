//! Request DTOs for the evaluation and flag management API.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::admin::{FlagListQuery, FlagPatch};
use crate::error::EngineError;
use crate::models::{FlagDefinition, FlagType};

/// Who is asking. Only `userId` takes part in evaluation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationContext {
    pub user_id: String,
    /// Accepted and ignored: there is no attribute matching.
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
}

/// Body of `POST /api/v1/evaluate`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    pub flag_key: String,
    pub context: EvaluationContext,
}

/// Body of `POST /api/v1/evaluate/bulk`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEvaluateRequest {
    pub flag_keys: Vec<String>,
    pub context: EvaluationContext,
}

/// Body of `POST /api/v1/flags`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFlagRequest {
    pub key: String,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    #[serde(default)]
    pub enabled: bool,
    /// Required for `percentage` flags.
    pub percentage: Option<i32>,
    #[serde(default)]
    pub target_user_ids: Vec<String>,
}

impl TryFrom<CreateFlagRequest> for FlagDefinition {
    type Error = EngineError;

    fn try_from(req: CreateFlagRequest) -> Result<Self, Self::Error> {
        if req.flag_type == FlagType::Percentage && req.percentage.is_none() {
            return Err(EngineError::InvalidInput(
                "percentage is required when type is \"percentage\"".to_string(),
            ));
        }

        // Targets only mean something on user_target flags
        let target_identities = match req.flag_type {
            FlagType::UserTarget => req.target_user_ids.into_iter().collect(),
            _ => BTreeSet::new(),
        };
        Ok(FlagDefinition {
            key: req.key,
            flag_type: req.flag_type,
            enabled: req.enabled,
            percentage: req.percentage.unwrap_or(0),
            target_identities,
        })
    }
}

/// Query string of `GET /api/v1/flags`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFlagsQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub flag_type: Option<FlagType>,
}

impl From<ListFlagsQuery> for FlagListQuery {
    fn from(query: ListFlagsQuery) -> Self {
        FlagListQuery {
            page: query.page,
            limit: query.limit,
            search: query.search,
            flag_type: query.flag_type,
        }
    }
}

/// Body of `PATCH /api/v1/flags/:key`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFlagRequest {
    pub enabled: Option<bool>,
    pub percentage: Option<i32>,
    pub target_user_ids: Option<Vec<String>>,
}

impl From<UpdateFlagRequest> for FlagPatch {
    fn from(req: UpdateFlagRequest) -> Self {
        FlagPatch {
            enabled: req.enabled,
            percentage: req.percentage,
            target_identities: req.target_user_ids,
        }
    }
}
