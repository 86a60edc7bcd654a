//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CALENDAI_DB_PATH`: Database file path
//! - `CALENDAI_DB_POOL_SIZE`: Connection pool size
//! - `CALENDAI_MODEL_API_KEY`: Chat-completions API key
//! - `CALENDAI_MODEL_BASE_URL`: Chat-completions base URL
//! - `CALENDAI_MODEL_ID`: Model identifier
//! - `CALENDAI_MODEL_TIMEOUT_SECONDS`: Per-request model timeout (optional)
//! - `CALENDAI_PENDING_TTL_SECONDS`: Pending-proposal TTL (optional)
//! - `CALENDAI_PENDING_MAX_CAPACITY`: Pending-proposal capacity (optional)
//! - `CALENDAI_REMINDERS_ENABLED`: Whether the reminder job runs (optional)
//! - `CALENDAI_REMINDER_CRON`: Reminder cron expression (optional)

use std::path::{Path, PathBuf};

use calendai_domain::{
    CalendaiError, Config, DatabaseConfig, ModelConfig, PendingConfig, ReminderConfig, Result,
};

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The database and model variables are required; pending-store and reminder
/// variables fall back to their defaults.
pub fn load_from_env() -> Result<Config> {
    let db_path = env_var("CALENDAI_DB_PATH")?;
    let db_pool_size = env_var("CALENDAI_DB_POOL_SIZE").and_then(|s| {
        s.parse::<u32>().map_err(|e| CalendaiError::Config(format!("Invalid pool size: {}", e)))
    })?;

    let model_api_key = env_var("CALENDAI_MODEL_API_KEY")?;
    let model_base_url = env_var("CALENDAI_MODEL_BASE_URL")?;
    let model_id = env_var("CALENDAI_MODEL_ID")?;
    let model_timeout = env_parse("CALENDAI_MODEL_TIMEOUT_SECONDS", 30)?;

    let pending_defaults = PendingConfig::default();
    let pending_ttl = env_parse("CALENDAI_PENDING_TTL_SECONDS", pending_defaults.ttl_seconds)?;
    let pending_capacity =
        env_parse("CALENDAI_PENDING_MAX_CAPACITY", pending_defaults.max_capacity)?;

    let reminder_defaults = ReminderConfig::default();
    let reminders_enabled = env_bool("CALENDAI_REMINDERS_ENABLED", reminder_defaults.enabled);
    let reminder_cron = std::env::var("CALENDAI_REMINDER_CRON")
        .unwrap_or(reminder_defaults.cron_expression);

    Ok(Config {
        database: DatabaseConfig { path: db_path, pool_size: db_pool_size },
        model: ModelConfig {
            api_key: model_api_key,
            base_url: model_base_url,
            model: model_id,
            timeout_seconds: model_timeout,
        },
        pending: PendingConfig { ttl_seconds: pending_ttl, max_capacity: pending_capacity },
        reminders: ReminderConfig { enabled: reminders_enabled, cron_expression: reminder_cron },
    })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
pub fn load_from_file(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(path) => {
            if !path.exists() {
                return Err(CalendaiError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => probe_config_paths().ok_or_else(|| {
            CalendaiError::Config("no configuration found in environment or files".into())
        })?,
    };

    let contents = std::fs::read_to_string(&path)
        .map_err(|e| CalendaiError::Config(format!("failed to read config file: {}", e)))?;

    let config = if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&contents)
            .map_err(|e| CalendaiError::Config(format!("invalid TOML config: {}", e)))?
    } else {
        serde_json::from_str(&contents)
            .map_err(|e| CalendaiError::Config(format!("invalid JSON config: {}", e)))?
    };

    tracing::info!(path = %path.display(), "Configuration loaded from file");
    Ok(config)
}

/// Probe the conventional config file locations, nearest first.
fn probe_config_paths() -> Option<PathBuf> {
    let names = ["config.toml", "config.json", "calendai.toml", "calendai.json"];
    let bases = [".", "..", "../.."];
    for base in bases {
        for name in names {
            let candidate = Path::new(base).join(name);
            if candidate.exists() {
                return Some(candidate);
            }
        }
    }
    None
}

fn env_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| CalendaiError::Config(format!("missing environment variable {name}")))
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|e| CalendaiError::Config(format!("invalid value for {name}: {e}"))),
        Err(_) => Ok(default),
    }
}

fn env_bool(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .map(|raw| matches!(raw.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;

    #[test]
    fn loads_toml_file_with_defaults_for_optional_sections() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"
[database]
path = "data/calendai.db"
pool_size = 4

[model]
api_key = "k"
base_url = "https://api.example.com/v1"
model = "test-model"
"#
        )
        .unwrap();

        let config = load_from_file(Some(&path)).unwrap();
        assert_eq!(config.database.pool_size, 4);
        assert_eq!(config.model.model, "test-model");
        assert_eq!(config.model.timeout_seconds, 30, "serde default");
        assert_eq!(config.pending.ttl_seconds, PendingConfig::default().ttl_seconds);
        assert!(config.reminders.enabled);
    }

    #[test]
    fn loads_json_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{
                "database": {"path": "data/calendai.db", "pool_size": 2},
                "model": {"api_key": "k", "base_url": "https://api.example.com/v1", "model": "m"},
                "pending": {"ttl_seconds": 120, "max_capacity": 50}
            }"#,
        )
        .unwrap();

        let config = load_from_file(Some(&path)).unwrap();
        assert_eq!(config.pending.ttl_seconds, 120);
        assert_eq!(config.pending.max_capacity, 50);
    }

    #[test]
    fn missing_explicit_file_is_a_config_error() {
        let err = load_from_file(Some(Path::new("/nonexistent/config.toml"))).unwrap_err();
        assert!(matches!(err, CalendaiError::Config(_)));
    }
}
