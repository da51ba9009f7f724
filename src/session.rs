//! Session data structure

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::Values;
use crate::config::SameSite;

/// Per-session cookie options, copied from the store defaults
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    /// Cookie path
    pub path: String,
    /// Cookie domain
    pub domain: Option<String>,
    /// Lifetime in seconds. A negative value destroys the session on save.
    pub max_age: i64,
    /// Secure flag
    pub secure: bool,
    /// HttpOnly flag
    pub http_only: bool,
    /// SameSite attribute
    pub same_site: SameSite,
}

/// A server-side session for one request/response cycle
///
/// Created by [`SqlStore::obtain`](crate::SqlStore::obtain), mutated by the
/// application, then persisted with [`SqlStore::save`](crate::SqlStore::save).
#[derive(Debug, Clone)]
pub struct Session {
    pub(crate) name: String,
    pub(crate) id: String,
    pub(crate) is_new: bool,
    /// Application values
    pub values: Values,
    /// Cookie options for this session
    pub options: SessionOptions,
}

impl Session {
    /// Create an empty session that has never been stored
    pub fn new<S: Into<String>>(name: S, options: SessionOptions) -> Self {
        Self {
            name: name.into(),
            id: String::new(),
            is_new: true,
            values: Values::new(),
            options,
        }
    }

    /// Cookie name this session is carried in
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Session ID; empty until the session is first saved
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the next save inserts a new row
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Get a value from the session
    pub fn get<T: for<'de> Deserialize<'de>>(&self, key: &str) -> Option<T> {
        self.values.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Set a value in the session
    pub fn set<T: Serialize>(&mut self, key: &str, value: T) -> Result<(), serde_json::Error> {
        let v = serde_json::to_value(value)?;
        self.values.insert(key.to_string(), v);
        Ok(())
    }

    /// Remove a value from the session
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Check if a key exists
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Clear all session values
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Check if the session has no values
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Mark the session for destruction on the next save
    pub fn destroy(&mut self) {
        self.options.max_age = -1;
    }

    /// Whether the next save deletes the session
    pub fn is_destroyed(&self) -> bool {
        self.options.max_age < 0
    }
}
