//! Configuration structures
//!
//! Loaded by the infra config loader from environment variables or a
//! TOML/JSON file; consumed by the api binary at startup.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PENDING_MAX_CAPACITY, DEFAULT_PENDING_TTL_SECONDS};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub pending: PendingConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
}

/// SQLite database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file path
    pub path: String,
    /// Connection pool size
    pub pool_size: u32,
}

/// Chat-completions model configuration
///
/// Validated at client construction time; a missing key or model id is a
/// startup error, not a first-request surprise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub api_key: String,
    /// Base URL of an OpenAI-compatible chat completions endpoint
    pub base_url: String,
    /// Model identifier sent with every request
    pub model: String,
    /// Per-request timeout bounding the model invocation
    #[serde(default = "default_model_timeout")]
    pub timeout_seconds: u64,
}

fn default_model_timeout() -> u64 {
    30
}

/// Pending-proposal store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingConfig {
    /// Seconds a stored proposal stays confirmable
    pub ttl_seconds: u64,
    /// Maximum proposals held at once
    pub max_capacity: u64,
}

impl Default for PendingConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: DEFAULT_PENDING_TTL_SECONDS,
            max_capacity: DEFAULT_PENDING_MAX_CAPACITY,
        }
    }
}

/// Reminder job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// Six-field cron expression driving the reminder sweep
    pub cron_expression: String,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self { enabled: true, cron_expression: "0 * * * * *".into() }
    }
}
