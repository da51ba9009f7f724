//! In-memory session database
//!
//! This is primarily for development and testing.
//! For production, use a SQL backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use super::{Database, StoredSession};
use crate::error::SessionError;

#[derive(Debug, Clone)]
struct Row {
    data: Vec<u8>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// In-memory session database
///
/// Warning: This backend is not suitable for production use because:
/// - Sessions are lost on server restart
/// - Sessions are not shared across multiple server instances
#[derive(Clone, Default)]
pub struct MemoryDatabase {
    rows: Arc<RwLock<HashMap<String, Row>>>,
}

impl MemoryDatabase {
    /// Create a new, empty memory database
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Whether no rows are stored
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// When the row was created, if present
    pub fn created_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.rows.read().get(id).map(|row| row.created_at)
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn load(&self, id: &str) -> Result<Option<StoredSession>, SessionError> {
        Ok(self.rows.read().get(id).map(|row| StoredSession {
            updated_at: row.updated_at,
            data: row.data.clone(),
        }))
    }

    async fn insert(&self, id: &str, data: &[u8]) -> Result<(), SessionError> {
        let mut rows = self.rows.write();
        if rows.contains_key(id) {
            return Err(SessionError::Storage(format!("duplicate session id: {}", id)));
        }
        let now = Utc::now();
        rows.insert(
            id.to_string(),
            Row {
                data: data.to_vec(),
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn update(&self, id: &str, data: &[u8]) -> Result<(), SessionError> {
        if let Some(row) = self.rows.write().get_mut(id) {
            row.data = data.to_vec();
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), SessionError> {
        self.rows.write().remove(id);
        Ok(())
    }

    async fn delete_expired(&self, cutoff: DateTime<Utc>) -> Result<u64, SessionError> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|_, row| row.updated_at >= cutoff);
        Ok((before - rows.len()) as u64)
    }
}
