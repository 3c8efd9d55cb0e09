//! Flag management over the in-memory definition store.
//!
//! Every mutation validates, commits to the store, runs cache invalidation,
//! and only then returns. Invalidation trouble is logged by the gateway and
//! never fails the mutation.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::engine::{InvalidationGateway, InvalidationReport};
use crate::error::{EngineError, Result};
use crate::models::{validate_flag_key, validate_identity, validate_percentage, FlagDefinition, FlagType};
use crate::store::{DefinitionStore, MemoryDefinitionStore};

// == Flag Patch ==
/// Partial update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagPatch {
    pub enabled: Option<bool>,
    pub percentage: Option<i32>,
    pub target_identities: Option<Vec<String>>,
}

// == Flag Listing ==
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Listing filters. Pages are 1-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    /// Substring match on the flag key
    pub search: Option<String>,
    pub flag_type: Option<FlagType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlagPage {
    pub flags: Vec<FlagDefinition>,
    pub page: usize,
    pub limit: usize,
    pub total_items: usize,
}

impl FlagPage {
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(self.limit)
    }
}

// == Flag Admin ==
pub struct FlagAdmin {
    store: Arc<MemoryDefinitionStore>,
    invalidation: Arc<InvalidationGateway>,
}

impl FlagAdmin {
    pub fn new(store: Arc<MemoryDefinitionStore>, invalidation: Arc<InvalidationGateway>) -> Self {
        Self {
            store,
            invalidation,
        }
    }

    pub async fn create(&self, flag: FlagDefinition) -> Result<FlagDefinition> {
        validate_definition(&flag)?;

        if !self.store.insert_new(flag.clone()).await {
            return Err(EngineError::Conflict(flag.key));
        }
        info!(flag_key = %flag.key, flag_type = ?flag.flag_type, "flag created");

        // A cached FLAG_NOT_FOUND decision would otherwise hide the new flag
        self.invalidation.invalidate(&flag.key).await;
        Ok(flag)
    }

    pub async fn get(&self, flag_key: &str) -> Result<FlagDefinition> {
        validate_flag_key(flag_key)?;
        self.store
            .find_definition(flag_key)
            .await?
            .ok_or_else(|| EngineError::NotFound(flag_key.to_string()))
    }

    /// One page of flags ordered by key.
    pub async fn list(&self, query: FlagListQuery) -> Result<FlagPage> {
        let page = query.page.unwrap_or(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            return Err(EngineError::InvalidInput("page must be at least 1".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(EngineError::InvalidInput(format!(
                "limit must be between 1 and {}",
                MAX_PAGE_SIZE
            )));
        }
        if query.flag_type == Some(FlagType::Unknown) {
            return Err(EngineError::InvalidInput(
                "type must be one of boolean, percentage, user_target".to_string(),
            ));
        }

        let search = query.search.filter(|s| !s.is_empty());
        let offset = (page - 1).saturating_mul(limit);
        let (flags, total_items) = self
            .store
            .list(
                |flag| {
                    query.flag_type.map_or(true, |t| flag.flag_type == t)
                        && search.as_deref().map_or(true, |s| flag.key.contains(s))
                },
                offset,
                limit,
            )
            .await;

        Ok(FlagPage {
            flags,
            page,
            limit,
            total_items,
        })
    }

    pub async fn update(&self, flag_key: &str, patch: FlagPatch) -> Result<FlagDefinition> {
        validate_flag_key(flag_key)?;
        if let Some(percentage) = patch.percentage {
            validate_percentage(percentage)?;
        }
        if let Some(targets) = &patch.target_identities {
            for identity in targets {
                validate_identity(identity)?;
            }
        }

        let updated = self
            .store
            .modify(flag_key, |flag| {
                if let Some(enabled) = patch.enabled {
                    flag.enabled = enabled;
                }
                if let Some(percentage) = patch.percentage {
                    flag.percentage = percentage;
                }
                if let Some(targets) = patch.target_identities {
                    flag.target_identities = targets.into_iter().collect::<BTreeSet<_>>();
                }
            })
            .await
            .ok_or_else(|| EngineError::NotFound(flag_key.to_string()))?;
        info!(flag_key, "flag updated");

        self.invalidation.invalidate(flag_key).await;
        Ok(updated)
    }

    pub async fn toggle(&self, flag_key: &str) -> Result<FlagDefinition> {
        validate_flag_key(flag_key)?;

        let toggled = self
            .store
            .modify(flag_key, |flag| flag.enabled = !flag.enabled)
            .await
            .ok_or_else(|| EngineError::NotFound(flag_key.to_string()))?;
        info!(flag_key, enabled = toggled.enabled, "flag toggled");

        self.invalidation.invalidate(flag_key).await;
        Ok(toggled)
    }

    pub async fn delete(&self, flag_key: &str) -> Result<()> {
        validate_flag_key(flag_key)?;

        self.store
            .remove(flag_key)
            .await
            .ok_or_else(|| EngineError::NotFound(flag_key.to_string()))?;
        info!(flag_key, "flag deleted");

        self.invalidation.invalidate(flag_key).await;
        Ok(())
    }

    /// Manual invalidation, for out-of-band store edits.
    pub async fn invalidate(&self, flag_key: &str) -> Result<InvalidationReport> {
        validate_flag_key(flag_key)?;
        Ok(self.invalidation.invalidate(flag_key).await)
    }
}

fn validate_definition(flag: &FlagDefinition) -> Result<()> {
    validate_flag_key(&flag.key)?;
    validate_percentage(flag.percentage)?;
    if flag.flag_type == FlagType::Unknown {
        return Err(EngineError::InvalidInput(
            "type must be one of boolean, percentage, user_target".to_string(),
        ));
    }
    if flag.flag_type == FlagType::UserTarget && flag.target_identities.is_empty() {
        return Err(EngineError::InvalidInput(
            "targetUserIds is required when type is \"user_target\"".to_string(),
        ));
    }
    for identity in &flag.target_identities {
        validate_identity(identity)?;
    }
    Ok(())
}
