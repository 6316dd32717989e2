//! SQLite-backed preference store.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::prefs::PreferenceStore;

/// Preferences persisted in the `preferences` table.
#[derive(Clone)]
pub struct SqlitePreferences {
    pool: SqlitePool,
}

impl SqlitePreferences {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// All stored preferences, ordered by key.
    pub async fn list(&self) -> Result<Vec<(String, String)>, AppError> {
        let rows = sqlx::query("SELECT key, value FROM preferences ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| (row.get("key"), row.get("value")))
            .collect())
    }

    /// Remove a preference. Missing keys are not an error.
    pub async fn remove(&self, key: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM preferences WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

impl PreferenceStore for SqlitePreferences {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let row = sqlx::query("SELECT value FROM preferences WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| row.get("value")))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO preferences (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::debug!(key, value, "Stored preference");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::prefs::{CATEGORY_KEY, COURSE_KEY};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_preferences_persist_across_pools() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("nested").join("prefs.sqlite");

        {
            let pool = init_database(&db_path).await.expect("Failed to init DB");
            let prefs = SqlitePreferences::new(pool.clone());
            prefs.set(CATEGORY_KEY, "3").await.unwrap();
            prefs.set(COURSE_KEY, "31").await.unwrap();
            prefs.set(COURSE_KEY, "32").await.unwrap();
            pool.close().await;
        }

        let pool = init_database(&db_path).await.expect("Failed to reopen DB");
        let prefs = SqlitePreferences::new(pool);

        assert_eq!(prefs.get(CATEGORY_KEY).await.unwrap().as_deref(), Some("3"));
        assert_eq!(prefs.get(COURSE_KEY).await.unwrap().as_deref(), Some("32"));
        assert_eq!(prefs.list().await.unwrap().len(), 2);

        prefs.remove(COURSE_KEY).await.unwrap();
        assert_eq!(prefs.get(COURSE_KEY).await.unwrap(), None);
        prefs.remove("missing").await.unwrap();
    }
}
