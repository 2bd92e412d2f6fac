use anyhow::Result;
use async_trait::async_trait;
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use std::sync::Arc;
use tracing::{debug, info};

use super::traits::KeyValueStore;

/// SQLite-backed key-value store
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Open (and create if needed) the database at `url`
    pub async fn new(url: &str) -> Result<Self> {
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            info!("Creating database {}", url);
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS key_values (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// List all keys in the database
    pub async fn list_keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM key_values ORDER BY key")
            .fetch_all(&*self.pool)
            .await?;
        let keys = rows.iter().map(|row| row.get("key")).collect();
        Ok(keys)
    }
}

#[async_trait]
impl KeyValueStore for DbConnection {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM key_values WHERE key = ?")
            .bind(key)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO key_values (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&*self.pool)
            .await?;
        debug!("Stored {} bytes under '{}'", value.len(), key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM key_values WHERE key = ?")
            .bind(key)
            .execute(&*self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Each test gets its own database file
    async fn setup_test() -> (DbConnection, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let url = format!("sqlite://{}", temp_dir.path().join("test.db").display());
        let db = DbConnection::new(&url).await.expect("Failed to create test database");
        (db, temp_dir)
    }

    #[tokio::test]
    async fn test_put_and_get_value() {
        let (db, _dir) = setup_test().await;

        db.put("birthdays.txt", "Alice-5-20-a").await.expect("Failed to put value");

        let result = db.get("birthdays.txt").await.expect("Failed to get value");
        assert_eq!(result.as_deref(), Some("Alice-5-20-a"));
    }

    #[tokio::test]
    async fn test_get_nonexistent_value() {
        let (db, _dir) = setup_test().await;

        let result = db.get("nonexistent_key").await.expect("Query failed");
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_value() {
        let (db, _dir) = setup_test().await;

        db.put("api_secret_key", "aaaaaaaaaaaaaaaa").await.unwrap();
        db.put("api_secret_key", "bbbbbbbbbbbbbbbb").await.unwrap();

        let result = db.get("api_secret_key").await.unwrap();
        assert_eq!(result.as_deref(), Some("bbbbbbbbbbbbbbbb"));
    }

    #[tokio::test]
    async fn test_delete_value() {
        let (db, _dir) = setup_test().await;

        db.put("key_to_delete", "value").await.unwrap();

        let deleted = db.delete("key_to_delete").await.unwrap();
        assert!(deleted, "Value should have been deleted");
        assert!(db.get("key_to_delete").await.unwrap().is_none());

        let deleted_again = db.delete("key_to_delete").await.unwrap();
        assert!(!deleted_again, "Value should not exist to be deleted");
    }

    #[tokio::test]
    async fn test_multiline_text_survives() {
        let (db, _dir) = setup_test().await;
        let text = "Alice-1990-5-20-a-Sales\nBob-8-15-b\n\n  Carol - 12 - 1 - a  ";

        db.put("birthdays.txt", text).await.unwrap();

        assert_eq!(db.get("birthdays.txt").await.unwrap().as_deref(), Some(text));
    }

    #[tokio::test]
    async fn test_list_keys() {
        let (db, _dir) = setup_test().await;

        assert!(db.list_keys().await.unwrap().is_empty());

        db.put("birthdays.txt", "x").await.unwrap();
        db.put("api_secret_key", "y").await.unwrap();

        let keys = db.list_keys().await.unwrap();
        assert_eq!(keys, vec!["api_secret_key".to_string(), "birthdays.txt".to_string()]);
    }

    #[tokio::test]
    async fn test_reopen_keeps_data() {
        let temp_dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}", temp_dir.path().join("persist.db").display());

        {
            let db = DbConnection::new(&url).await.unwrap();
            db.put("birthdays.txt", "Alice-5-20-a").await.unwrap();
        }

        let db = DbConnection::new(&url).await.unwrap();
        assert_eq!(db.get("birthdays.txt").await.unwrap().as_deref(), Some("Alice-5-20-a"));
    }
}
