//! Session error types

use std::fmt;

/// Errors that can occur during session operations
#[derive(Debug)]
pub enum SessionError {
    /// Error from the database backend (connectivity, query, constraint violation)
    Storage(String),
    /// Error while encoding or decoding session values
    Codec(String),
    /// Cookie token could not be parsed
    InvalidCookie(String),
    /// Cookie signature did not verify against any key
    InvalidSignature,
    /// Cookie token is older than the configured max age
    CookieExpired,
    /// A backend call exceeded the configured operation timeout
    Timeout,
    /// Invalid store configuration
    Config(String),
}

impl SessionError {
    /// Whether this error came from verifying a session cookie.
    ///
    /// The store treats these as "no session" rather than failing the request.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            SessionError::InvalidCookie(_) | SessionError::InvalidSignature | SessionError::CookieExpired
        )
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Storage(msg) => write!(f, "Session storage error: {}", msg),
            SessionError::Codec(msg) => write!(f, "Session codec error: {}", msg),
            SessionError::InvalidCookie(msg) => write!(f, "Invalid session cookie: {}", msg),
            SessionError::InvalidSignature => write!(f, "Invalid cookie signature"),
            SessionError::CookieExpired => write!(f, "Session cookie expired"),
            SessionError::Timeout => write!(f, "Session storage operation timed out"),
            SessionError::Config(msg) => write!(f, "Invalid session configuration: {}", msg),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Codec(err.to_string())
    }
}

impl From<sqlx::Error> for SessionError {
    fn from(err: sqlx::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}
