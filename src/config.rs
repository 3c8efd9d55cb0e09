//! Configuration Module
//!
//! Handles loading and managing server and engine configuration from
//! environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// TTL in seconds for cached flag definitions
    pub definition_ttl: u64,
    /// TTL in seconds for cached evaluation decisions
    pub decision_ttl: u64,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Deadline for a single cache call, in milliseconds
    pub cache_timeout_ms: u64,
    /// Deadline for a single definition store read, in milliseconds
    pub store_timeout_ms: u64,
    /// Maximum number of flag keys in one batch evaluation
    pub max_batch_size: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 10000)
    /// - `DEFINITION_TTL` - Flag definition TTL in seconds (default: 300)
    /// - `DECISION_TTL` - Decision TTL in seconds (default: 60)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    /// - `CACHE_TIMEOUT_MS` - Per-call cache deadline (default: 100)
    /// - `STORE_TIMEOUT_MS` - Per-read store deadline (default: 2000)
    /// - `MAX_BATCH_SIZE` - Keys allowed per batch (default: 50)
    ///
    /// A decision TTL longer than the definition TTL is clamped down.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            max_entries: env_or("MAX_ENTRIES", defaults.max_entries),
            definition_ttl: env_or("DEFINITION_TTL", defaults.definition_ttl),
            decision_ttl: env_or("DECISION_TTL", defaults.decision_ttl),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            cache_timeout_ms: env_or("CACHE_TIMEOUT_MS", defaults.cache_timeout_ms),
            store_timeout_ms: env_or("STORE_TIMEOUT_MS", defaults.store_timeout_ms),
            max_batch_size: env_or("MAX_BATCH_SIZE", defaults.max_batch_size),
        }
        .normalized()
    }

    /// Enforces decision TTL <= definition TTL.
    pub fn normalized(mut self) -> Self {
        if self.decision_ttl > self.definition_ttl {
            warn!(
                "DECISION_TTL ({}s) exceeds DEFINITION_TTL ({}s), clamping",
                self.decision_ttl, self.definition_ttl
            );
            self.decision_ttl = self.definition_ttl;
        }
        self
    }

    /// Engine-facing projection of this configuration.
    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            definition_ttl: Duration::from_secs(self.definition_ttl),
            decision_ttl: Duration::from_secs(self.decision_ttl),
            cache_timeout: Duration::from_millis(self.cache_timeout_ms),
            store_timeout: Duration::from_millis(self.store_timeout_ms),
            max_batch_size: self.max_batch_size,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            max_entries: 10_000,
            definition_ttl: 300,
            decision_ttl: 60,
            cleanup_interval: 1,
            cache_timeout_ms: 100,
            store_timeout_ms: 2000,
            max_batch_size: 50,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// == Engine Settings ==
/// Timing and sizing knobs consumed by the evaluation engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub definition_ttl: Duration,
    pub decision_ttl: Duration,
    pub cache_timeout: Duration,
    pub store_timeout: Duration,
    pub max_batch_size: usize,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Config::default().engine_settings()
    }
}
