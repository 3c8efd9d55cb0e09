//! Flag definitions and evaluation decisions.
//!
//! `FlagDefinition` is the evaluation-relevant projection of a stored flag.
//! Both types are immutable snapshots once read and serialize to the JSON
//! held in the cache tier.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Longest accepted flag key (ASCII only, so characters equal bytes).
pub const MAX_FLAG_KEY_LENGTH: usize = 100;
/// Longest accepted identity, in UTF-8 bytes. Keeps every decision cache
/// key within the cache's key length limit.
pub const MAX_IDENTITY_LENGTH: usize = 100;

// == Flag Type ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagType {
    Boolean,
    Percentage,
    UserTarget,
    /// Any type this engine does not know how to evaluate; always off.
    #[serde(other)]
    Unknown,
}

// == Flag Definition ==
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagDefinition {
    pub key: String,
    #[serde(rename = "type")]
    pub flag_type: FlagType,
    pub enabled: bool,
    /// Meaningful only for `Percentage` flags.
    #[serde(default)]
    pub percentage: i32,
    /// Meaningful only for `UserTarget` flags.
    #[serde(default)]
    pub target_identities: BTreeSet<String>,
}

impl FlagDefinition {
    pub fn boolean(key: impl Into<String>, enabled: bool) -> Self {
        Self {
            key: key.into(),
            flag_type: FlagType::Boolean,
            enabled,
            percentage: 0,
            target_identities: BTreeSet::new(),
        }
    }

    pub fn percentage(key: impl Into<String>, enabled: bool, percentage: i32) -> Self {
        Self {
            flag_type: FlagType::Percentage,
            percentage,
            ..Self::boolean(key, enabled)
        }
    }

    pub fn user_target<I, S>(key: impl Into<String>, enabled: bool, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flag_type: FlagType::UserTarget,
            target_identities: targets.into_iter().map(Into::into).collect(),
            ..Self::boolean(key, enabled)
        }
    }
}

// == Reason ==
/// Why a decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Reason {
    BooleanOn,
    PercentageMatch,
    PercentageMiss,
    UserTargeted,
    UserNotTargeted,
    FlagDisabled,
    FlagNotFound,
}

impl Reason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Reason::BooleanOn => "BOOLEAN_ON",
            Reason::PercentageMatch => "PERCENTAGE_MATCH",
            Reason::PercentageMiss => "PERCENTAGE_MISS",
            Reason::UserTargeted => "USER_TARGETED",
            Reason::UserNotTargeted => "USER_NOT_TARGETED",
            Reason::FlagDisabled => "FLAG_DISABLED",
            Reason::FlagNotFound => "FLAG_NOT_FOUND",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Evaluation Decision ==
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationDecision {
    pub flag_key: String,
    pub enabled: bool,
    pub reason: Reason,
}

impl EvaluationDecision {
    pub fn new(flag_key: impl Into<String>, enabled: bool, reason: Reason) -> Self {
        Self {
            flag_key: flag_key.into(),
            enabled,
            reason,
        }
    }

    pub fn not_found(flag_key: impl Into<String>) -> Self {
        Self::new(flag_key, false, Reason::FlagNotFound)
    }

    pub fn disabled(flag_key: impl Into<String>) -> Self {
        Self::new(flag_key, false, Reason::FlagDisabled)
    }
}

// == Validation ==
/// Flag keys are 1..=100 of `[A-Za-z0-9_.-]`.
///
/// `:` and `*` are excluded so one flag's cache key pattern can never match
/// another flag's entries.
pub fn validate_flag_key(key: &str) -> Result<(), EngineError> {
    if key.is_empty() {
        return Err(EngineError::InvalidInput("flagKey is required".to_string()));
    }
    if key.len() > MAX_FLAG_KEY_LENGTH {
        return Err(EngineError::InvalidInput(format!(
            "flagKey exceeds {} characters",
            MAX_FLAG_KEY_LENGTH
        )));
    }
    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    {
        return Err(EngineError::InvalidInput(format!(
            "flagKey '{}' may only contain letters, digits, '-', '_' and '.'",
            key
        )));
    }
    Ok(())
}

/// Identities are 1..=100 bytes without control characters.
pub fn validate_identity(identity: &str) -> Result<(), EngineError> {
    if identity.is_empty() {
        return Err(EngineError::InvalidInput("userId is required".to_string()));
    }
    if identity.len() > MAX_IDENTITY_LENGTH {
        return Err(EngineError::InvalidInput(format!(
            "userId exceeds {} bytes",
            MAX_IDENTITY_LENGTH
        )));
    }
    if identity.chars().any(char::is_control) {
        return Err(EngineError::InvalidInput(
            "userId must not contain control characters".to_string(),
        ));
    }
    Ok(())
}

/// Stored percentages must lie in 0..=100.
pub fn validate_percentage(percentage: i32) -> Result<(), EngineError> {
    if !(0..=100).contains(&percentage) {
        return Err(EngineError::InvalidInput(format!(
            "percentage must be between 0 and 100, got {}",
            percentage
        )));
    }
    Ok(())
}
