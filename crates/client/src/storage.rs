//! Durable key/value storage backing the persisted session.

use std::path::{Path, PathBuf};

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to create storage directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage query failed: {0}")]
    Sqlx(#[from] sqlx::Error),
}

/// SQLite-backed string store, one row per key.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    pool: SqlitePool,
}

impl LocalStorage {
    /// Open (or create) the storage file at `path`.
    pub async fn open(path: &Path) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let storage = Self { pool };
        storage.migrate().await?;
        tracing::debug!(path = %path.display(), "opened local storage");
        Ok(storage)
    }

    /// Process-local storage that vanishes on drop.
    pub async fn in_memory() -> Result<Self, StorageError> {
        // One connection kept alive forever: each new in-memory connection is a new database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let storage = Self { pool };
        storage.migrate().await?;
        Ok(storage)
    }

    async fn migrate(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS local_storage (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM local_storage WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO local_storage (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn remove(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Write `value`, or remove the key when there is none.
    pub async fn put(&self, key: &str, value: Option<&str>) -> Result<(), StorageError> {
        match value {
            Some(value) => self.set(key, value).await,
            None => self.remove(key).await,
        }
    }

    pub async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let keys = sqlx::query_scalar::<_, String>("SELECT key FROM local_storage ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_get_remove() {
        let storage = LocalStorage::in_memory().await.unwrap();
        assert_eq!(storage.get("access_token").await.unwrap(), None);

        storage.set("access_token", "a1").await.unwrap();
        storage.set("access_token", "a2").await.unwrap();
        assert_eq!(storage.get("access_token").await.unwrap().as_deref(), Some("a2"));

        storage.put("refresh_token", Some("r1")).await.unwrap();
        assert_eq!(storage.keys().await.unwrap(), vec!["access_token", "refresh_token"]);

        storage.put("access_token", None).await.unwrap();
        storage.remove("refresh_token").await.unwrap();
        storage.remove("missing").await.unwrap();
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_storage_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.db");

        let storage = LocalStorage::open(&path).await.unwrap();
        storage.set("user", "{}").await.unwrap();
        drop(storage);

        let reopened = LocalStorage::open(&path).await.unwrap();
        assert_eq!(reopened.get("user").await.unwrap().as_deref(), Some("{}"));
    }
}
