//! Response DTOs for the evaluation and flag management API.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::admin::FlagPage;
use crate::cache::CacheStats;
use crate::models::{EvaluationDecision, FlagDefinition, FlagType};

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Response body for `POST /api/v1/evaluate`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateResponse {
    #[serde(flatten)]
    pub decision: EvaluationDecision,
    pub evaluated_at: String,
}

impl EvaluateResponse {
    pub fn new(decision: EvaluationDecision) -> Self {
        Self {
            decision,
            evaluated_at: now_rfc3339(),
        }
    }
}

/// Response body for `POST /api/v1/evaluate/bulk`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEvaluateResponse {
    pub evaluations: Vec<EvaluationDecision>,
    pub evaluated_at: String,
}

impl BulkEvaluateResponse {
    pub fn new(evaluations: Vec<EvaluationDecision>) -> Self {
        Self {
            evaluations,
            evaluated_at: now_rfc3339(),
        }
    }
}

/// A flag as shown by the management endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagResponse {
    pub key: String,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub enabled: bool,
    pub percentage: i32,
    pub target_user_ids: Vec<String>,
}

impl From<FlagDefinition> for FlagResponse {
    fn from(flag: FlagDefinition) -> Self {
        Self {
            key: flag.key,
            flag_type: flag.flag_type,
            enabled: flag.enabled,
            percentage: flag.percentage,
            target_user_ids: flag.target_identities.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Response body for `GET /api/v1/flags`
#[derive(Debug, Clone, Serialize)]
pub struct FlagListResponse {
    pub data: Vec<FlagResponse>,
    pub pagination: Pagination,
}

impl From<FlagPage> for FlagListResponse {
    fn from(page: FlagPage) -> Self {
        let pagination = Pagination {
            page: page.page,
            limit: page.limit,
            total_items: page.total_items,
            total_pages: page.total_pages(),
        };
        Self {
            data: page.flags.into_iter().map(FlagResponse::from).collect(),
            pagination,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Reason;

    #[test]
    fn test_evaluate_response_is_flat() {
        let resp = EvaluateResponse::new(EvaluationDecision::new("a", true, Reason::BooleanOn));
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["flagKey"], "a");
        assert_eq!(json["enabled"], true);
        assert_eq!(json["reason"], "BOOLEAN_ON");
        assert!(json["evaluatedAt"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_flag_response_from_definition() {
        let resp = FlagResponse::from(FlagDefinition::user_target("t", true, ["b", "a"]));
        let json = serde_json::to_value(&resp).unwrap();

        assert_eq!(json["type"], "user_target");
        assert_eq!(json["targetUserIds"], serde_json::json!(["a", "b"]));
    }

    #[test]
    fn test_stats_response_hit_rate() {
        let mut stats = CacheStats::new();
        for _ in 0..4 {
            stats.record_hit();
        }
        stats.record_miss();

        let resp = StatsResponse::from(stats);
        assert!((resp.hit_rate - 0.8).abs() < 0.001);
    }

    #[test]
    fn test_health_response_serialize() {
        let json = serde_json::to_string(&HealthResponse::healthy()).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
