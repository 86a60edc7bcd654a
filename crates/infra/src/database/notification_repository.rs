//! SQLite-backed implementation of the NotificationStore port.

use async_trait::async_trait;
use chrono::Utc;
use calendai_core::events::ports::NotificationStore;
use calendai_domain::{CalendaiError, Notification, NotificationKind, Result};
use rusqlite::{params, Row};
use tracing::instrument;

use super::{from_ts, DbConnection, DbPool};
use crate::errors::InfraError;

/// SQLite implementation of NotificationStore.
pub struct SqliteNotificationStore {
    pool: DbPool,
}

impl SqliteNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn connection(&self) -> Result<DbConnection> {
        self.pool.get().map_err(InfraError::from).map_err(Into::into)
    }
}

fn map_notification_row(row: &Row<'_>) -> rusqlite::Result<Notification> {
    let kind_raw: String = row.get(2)?;
    let kind = NotificationKind::parse(&kind_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown notification kind: {kind_raw}").into(),
        )
    })?;
    Ok(Notification {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind,
        content: row.get(3)?,
        event_id: row.get(4)?,
        is_read: row.get(5)?,
        created_at: from_ts(row.get(6)?),
    })
}

#[async_trait]
impl NotificationStore for SqliteNotificationStore {
    #[instrument(skip(self, content))]
    async fn append(
        &self,
        user_id: i64,
        kind: NotificationKind,
        content: &str,
        event_id: i64,
    ) -> Result<()> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO notifications (user_id, kind, content, event_id, is_read, created_at)
             VALUES (?, ?, ?, ?, 0, ?)",
            params![user_id, kind.as_str(), content, event_id, Utc::now().timestamp()],
        )
        .map_err(InfraError::from)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn reminder_exists(&self, event_id: i64, user_id: i64) -> Result<bool> {
        let conn = self.connection()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM notifications
                 WHERE kind = 'reminder' AND event_id = ? AND user_id = ?",
                params![event_id, user_id],
                |row| row.get(0),
            )
            .map_err(InfraError::from)?;
        Ok(count > 0)
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, user_id, kind, content, event_id, is_read, created_at
                 FROM notifications
                 WHERE user_id = ?
                 ORDER BY created_at DESC, id DESC",
            )
            .map_err(InfraError::from)?;
        let notifications = stmt
            .query_map(params![user_id], map_notification_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<Notification>>>()
            .map_err(InfraError::from)?;
        Ok(notifications)
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, user_id: i64, notification_id: i64) -> Result<()> {
        let conn = self.connection()?;
        let affected = conn
            .execute(
                "UPDATE notifications SET is_read = 1 WHERE id = ? AND user_id = ?",
                params![notification_id, user_id],
            )
            .map_err(InfraError::from)?;
        if affected == 0 {
            return Err(CalendaiError::NotFound(format!("notification {notification_id}")));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::super::manager::DbManager;
    use super::*;

    fn setup_test_db() -> (SqliteNotificationStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let manager = DbManager::new(&db_path, 2).unwrap();
        manager.run_migrations().unwrap();
        (SqliteNotificationStore::new(manager.pool()), temp_dir)
    }

    #[tokio::test]
    async fn append_and_list_newest_first() {
        let (store, _temp) = setup_test_db();
        store.append(1, NotificationKind::Invitation, "first", 10).await.unwrap();
        store.append(1, NotificationKind::Change, "second", 10).await.unwrap();
        store.append(2, NotificationKind::Change, "other user", 10).await.unwrap();

        let list = store.list_for_user(1).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].content, "second");
        assert!(!list[0].is_read);
    }

    #[tokio::test]
    async fn reminder_existence_is_scoped_per_event_and_user() {
        let (store, _temp) = setup_test_db();
        store.append(1, NotificationKind::Reminder, "soon", 10).await.unwrap();

        assert!(store.reminder_exists(10, 1).await.unwrap());
        assert!(!store.reminder_exists(10, 2).await.unwrap());
        assert!(!store.reminder_exists(11, 1).await.unwrap());
    }

    #[tokio::test]
    async fn mark_read_is_owner_scoped() {
        let (store, _temp) = setup_test_db();
        store.append(1, NotificationKind::Invitation, "hello", 10).await.unwrap();
        let id = store.list_for_user(1).await.unwrap()[0].id;

        let err = store.mark_read(2, id).await.unwrap_err();
        assert!(matches!(err, CalendaiError::NotFound(_)));

        store.mark_read(1, id).await.unwrap();
        assert!(store.list_for_user(1).await.unwrap()[0].is_read);
    }
}
