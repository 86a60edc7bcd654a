//! SQLite-backed implementation of the OperationLogStore port.
//!
//! Appends ride the event-store transactions; this repository only reads.

use async_trait::async_trait;
use calendai_core::events::ports::OperationLogStore;
use calendai_domain::constants::MAX_OPERATION_LOG_PAGE;
use calendai_domain::{OperationDetail, OperationLogEntry, Result};
use rusqlite::{params, Row};
use tracing::instrument;

use super::{from_ts, DbConnection, DbPool};
use crate::errors::InfraError;

/// SQLite implementation of OperationLogStore.
pub struct SqliteOperationLogStore {
    pool: DbPool,
}

impl SqliteOperationLogStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn connection(&self) -> Result<DbConnection> {
        self.pool.get().map_err(InfraError::from).map_err(Into::into)
    }
}

fn map_log_row(row: &Row<'_>) -> rusqlite::Result<OperationLogEntry> {
    let detail_raw: String = row.get(4)?;
    let detail: OperationDetail = serde_json::from_str(&detail_raw).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("malformed operation detail: {err}").into(),
        )
    })?;
    Ok(OperationLogEntry {
        id: row.get(0)?,
        user_id: row.get(1)?,
        action: row.get(2)?,
        target_title: row.get(3)?,
        detail,
        created_at: from_ts(row.get(5)?),
    })
}

#[async_trait]
impl OperationLogStore for SqliteOperationLogStore {
    #[instrument(skip(self))]
    async fn list_recent(&self, user_id: i64, limit: usize) -> Result<Vec<OperationLogEntry>> {
        let conn = self.connection()?;
        let capped = limit.min(MAX_OPERATION_LOG_PAGE);
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, action, target_title, detail, created_at
                 FROM operation_logs
                 WHERE user_id = ?
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?",
            )
            .map_err(InfraError::from)?;
        let entries = stmt
            .query_map(params![user_id, capped as i64], map_log_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<OperationLogEntry>>>()
            .map_err(InfraError::from)?;
        Ok(entries)
    }
}
