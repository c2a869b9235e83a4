//! Key-value repository backing the local record cache

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use libsql::params;
use tokio::sync::Mutex;

use super::Database;
use crate::error::Result;
use crate::util::unix_millis_now;

/// Trait for durable key-value storage operations
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Read the value stored under `key`
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value in one write
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key` if present
    async fn remove(&self, key: &str) -> Result<()>;
}

/// libSQL implementation of `KeyValueStore`
#[derive(Clone)]
pub struct LibSqlKeyValueStore {
    db: Arc<Mutex<Database>>,
}

impl LibSqlKeyValueStore {
    pub fn new(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
        }
    }

    /// Open (or create) the store file at the given path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(Database::open(path).await?))
    }

    /// Open an in-memory store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory().await?))
    }
}

#[async_trait]
impl KeyValueStore for LibSqlKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let db = self.db.lock().await;
        let mut rows = db
            .connection()
            .query(
                "SELECT value FROM local_storage WHERE key = ?",
                params![key],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(row.get::<String>(0)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let now = unix_millis_now();
        let db = self.db.lock().await;
        db.connection()
            .execute(
                "INSERT INTO local_storage (key, value, updated_at) VALUES (?, ?, ?)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, now],
            )
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let db = self.db.lock().await;
        db.connection()
            .execute("DELETE FROM local_storage WHERE key = ?", params![key])
            .await?;
        Ok(())
    }
}
