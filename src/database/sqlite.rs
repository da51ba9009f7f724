//! SQLite session database
//!
//! Timestamps are bound from the application clock in UTC, so rows written by
//! this backend compare correctly with [`Database::delete_expired`] cutoffs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePool;

use super::{Database, StoredSession};
use crate::error::SessionError;

/// SQLite session database
///
/// # Example
///
/// ```rust,ignore
/// use salvo_sql_session::SqliteDatabase;
///
/// let db = SqliteDatabase::connect("sqlite://sessions.db").await?;
/// ```
#[derive(Clone, Debug)]
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Reference table layout expected by this backend
    pub const SCHEMA: &'static str = "CREATE TABLE IF NOT EXISTS sessions (
    id          TEXT PRIMARY KEY,
    data        BLOB NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
)";

    /// Wrap an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool from a connection string
    pub async fn connect(url: &str) -> Result<Self, SessionError> {
        let pool = SqlitePool::connect(url).await?;
        Ok(Self::new(pool))
    }

    /// The underlying pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    async fn load(&self, id: &str) -> Result<Option<StoredSession>, SessionError> {
        let row: Option<(Vec<u8>, DateTime<Utc>)> =
            sqlx::query_as("SELECT data, updated_at FROM sessions WHERE id = ? LIMIT 1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(data, updated_at)| StoredSession { updated_at, data }))
    }

    async fn insert(&self, id: &str, data: &[u8]) -> Result<(), SessionError> {
        let now = Utc::now();
        sqlx::query("INSERT INTO sessions (id, data, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(data)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update(&self, id: &str, data: &[u8]) -> Result<(), SessionError> {
        sqlx::query("UPDATE sessions SET data = ?, updated_at = ? WHERE id = ?")
            .bind(data)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SessionError> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE updated_at < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
