//! SQLite-backed implementation of the UserDirectory port.

use async_trait::async_trait;
use calendai_core::events::ports::UserDirectory;
use calendai_domain::{Result, User};
use rusqlite::{params, Row};
use tracing::instrument;

use super::{escape_like, DbConnection, DbPool};
use crate::errors::InfraError;

/// SQLite implementation of UserDirectory.
pub struct SqliteUserDirectory {
    pool: DbPool,
}

impl SqliteUserDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn connection(&self) -> Result<DbConnection> {
        self.pool.get().map_err(InfraError::from).map_err(Into::into)
    }
}

fn map_user_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User { id: row.get(0)?, display_name: row.get(1)?, email: row.get(2)? })
}

#[async_trait]
impl UserDirectory for SqliteUserDirectory {
    #[instrument(skip(self))]
    async fn search_by_name(&self, keyword: &str, limit: usize) -> Result<Vec<User>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, display_name, email FROM users
                 WHERE display_name LIKE ? ESCAPE '\\'
                 ORDER BY id
                 LIMIT ?",
            )
            .map_err(InfraError::from)?;
        let pattern = format!("%{}%", escape_like(keyword));
        let users = stmt
            .query_map(params![pattern, limit as i64], map_user_row)
            .map_err(InfraError::from)?
            .collect::<rusqlite::Result<Vec<User>>>()
            .map_err(InfraError::from)?;
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn get(&self, user_id: i64) -> Result<Option<User>> {
        let conn = self.connection()?;
        let mut stmt = conn
            .prepare("SELECT id, display_name, email FROM users WHERE id = ?")
            .map_err(InfraError::from)?;
        let mut rows =
            stmt.query_map(params![user_id], map_user_row).map_err(InfraError::from)?;
        match rows.next() {
            Some(row) => Ok(Some(row.map_err(InfraError::from)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::super::manager::DbManager;
    use super::*;

    fn setup_test_db() -> (SqliteUserDirectory, DbManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let manager = DbManager::new(&db_path, 2).unwrap();
        manager.run_migrations().unwrap();
        let directory = SqliteUserDirectory::new(manager.pool());
        (directory, manager, temp_dir)
    }

    fn seed_user(manager: &DbManager, name: &str, email: &str) {
        let conn = manager.get_connection().unwrap();
        conn.execute(
            "INSERT INTO users (display_name, email, created_at, updated_at)
             VALUES (?, ?, 0, 0)",
            params![name, email],
        )
        .unwrap();
    }

    #[tokio::test]
    async fn substring_search_is_case_insensitive_and_capped() {
        let (directory, manager, _temp) = setup_test_db();
        seed_user(&manager, "Lisa Chen", "lisa.c@example.com");
        seed_user(&manager, "Lisa Park", "lisa.p@example.com");
        seed_user(&manager, "Annalisa Romano", "annalisa@example.com");
        seed_user(&manager, "Lisandro Diaz", "lisandro@example.com");
        seed_user(&manager, "Bob Lee", "bob@example.com");

        let matches = directory.search_by_name("LISA", 3).await.unwrap();
        assert_eq!(matches.len(), 3);
        assert!(matches.iter().all(|user| user.display_name.to_lowercase().contains("lisa")));

        assert!(directory.search_by_name("nobody", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_returns_entry_or_none() {
        let (directory, manager, _temp) = setup_test_db();
        seed_user(&manager, "Lisa Chen", "lisa.c@example.com");

        let user = directory.get(1).await.unwrap().unwrap();
        assert_eq!(user.display_name, "Lisa Chen");
        assert!(directory.get(42).await.unwrap().is_none());
    }
}
