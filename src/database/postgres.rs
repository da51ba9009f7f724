//! PostgreSQL session database

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPool;

use super::{Database, StoredSession};
use crate::error::SessionError;

/// PostgreSQL session database
///
/// Timestamps come from the server clock (`NOW()`), stored as `TIMESTAMPTZ`.
///
/// # Example
///
/// ```rust,ignore
/// use salvo_sql_session::PostgresDatabase;
///
/// let db = PostgresDatabase::connect("postgres://localhost/app").await?;
/// ```
#[derive(Clone, Debug)]
pub struct PostgresDatabase {
    pool: PgPool,
}

impl PostgresDatabase {
    /// Reference table layout expected by this backend
    pub const SCHEMA: &'static str = "CREATE TABLE IF NOT EXISTS sessions (
    id          TEXT PRIMARY KEY,
    data        BYTEA NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL
)";

    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from a connection string
    pub async fn connect(url: &str) -> Result<Self, SessionError> {
        let pool = PgPool::connect(url).await?;
        Ok(Self::new(pool))
    }

    /// The underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Database for PostgresDatabase {
    async fn load(&self, id: &str) -> Result<Option<StoredSession>, SessionError> {
        let row: Option<(Vec<u8>, DateTime<Utc>)> =
            sqlx::query_as("SELECT data, updated_at FROM sessions WHERE id = $1 LIMIT 1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(data, updated_at)| StoredSession { updated_at, data }))
    }

    async fn insert(&self, id: &str, data: &[u8]) -> Result<(), SessionError> {
        sqlx::query("INSERT INTO sessions (id, data, created_at, updated_at) VALUES ($1, $2, NOW(), NOW())")
            .bind(id)
            .bind(data)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update(&self, id: &str, data: &[u8]) -> Result<(), SessionError> {
        sqlx::query("UPDATE sessions SET data = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(data)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SessionError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, SessionError> {
        let result = sqlx::query("DELETE FROM sessions WHERE updated_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
