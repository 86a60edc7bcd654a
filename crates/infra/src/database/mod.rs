//! SQLite implementations of the core storage ports.

pub mod event_repository;
pub mod manager;
pub mod notification_repository;
pub mod operation_log_repository;
pub mod user_directory_repository;

pub use event_repository::SqliteEventStore;
pub use manager::{DbConnection, DbManager, DbPool};
pub use notification_repository::SqliteNotificationStore;
pub use operation_log_repository::SqliteOperationLogStore;
pub use user_directory_repository::SqliteUserDirectory;

use chrono::{DateTime, Utc};
use calendai_core::events::ports::NewOperationLog;
use calendai_domain::{CalendaiError, Result};
use rusqlite::{params, Connection};

use crate::errors::InfraError;

/// Unix seconds → UTC timestamp; out-of-range values clamp to the epoch.
pub(crate) fn from_ts(ts: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(ts, 0).unwrap_or_default()
}

/// Escape LIKE wildcards so user keywords match literally.
pub(crate) fn escape_like(keyword: &str) -> String {
    keyword.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Append an operation-log row on the given connection, typically inside a
/// transaction. The tagged detail is serialized to JSON at this boundary.
pub(crate) fn insert_operation_log(
    conn: &Connection,
    log: &NewOperationLog,
    now: i64,
) -> Result<()> {
    let detail = serde_json::to_string(&log.detail).map_err(|err| {
        CalendaiError::Internal(format!("operation detail serialization failed: {err}"))
    })?;
    conn.execute(
        "INSERT INTO operation_logs (user_id, action, target_title, detail, created_at)
         VALUES (?, ?, ?, ?, ?)",
        params![log.user_id, log.detail.action(), log.target_title, detail, now],
    )
    .map_err(InfraError::from)?;
    Ok(())
}
