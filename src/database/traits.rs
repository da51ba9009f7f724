//! Database backend trait

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::SessionError;

/// A stored session row, as returned by [`Database::load`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    /// Last time the row was inserted or updated (UTC)
    pub updated_at: DateTime<Utc>,
    /// Encoded session values
    pub data: Vec<u8>,
}

/// Trait for session storage backends
///
/// Implementations keep at most one row per session ID with the shape
///
/// ```sql
/// CREATE TABLE sessions (
///   id          TEXT PRIMARY KEY,
///   data        BYTEA NOT NULL,
///   created_at  TIMESTAMPTZ NOT NULL,
///   updated_at  TIMESTAMPTZ NOT NULL
/// );
/// ```
///
/// Each operation is a single atomic statement. Dropping a returned future
/// cancels the operation.
#[async_trait]
pub trait Database: Send + Sync + 'static {
    /// Load a session row.
    ///
    /// Returns None if the row doesn't exist; errors are reserved for
    /// query and I/O failures.
    async fn load(&self, id: &str) -> Result<Option<StoredSession>, SessionError>;

    /// Insert a new row with `created_at = updated_at = now`.
    ///
    /// Fails if a row with `id` already exists.
    async fn insert(&self, id: &str, data: &[u8]) -> Result<(), SessionError>;

    /// Overwrite the data of an existing row and refresh `updated_at`.
    ///
    /// Updating a missing row is a no-op, not an error.
    async fn update(&self, id: &str, data: &[u8]) -> Result<(), SessionError>;

    /// Delete a row. Deleting a missing row is not an error.
    async fn delete(&self, id: &str) -> Result<(), SessionError>;

    /// Delete every row last updated before `cutoff`, returning how many went
    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, SessionError>;
}
