//! Store configuration

use std::time::Duration;

use crate::error::SessionError;
use crate::session::SessionOptions;

/// Default session lifetime: 30 days
pub const DEFAULT_MAX_AGE: i64 = 86400 * 30;

/// Configuration for the SQL session store
///
/// Immutable once handed to [`SqlStore`](crate::SqlStore).
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Key(s) for signing cookies.
    /// The first key is used for signing new cookies.
    /// All keys are tried when verifying signatures (for key rotation).
    pub keys: Vec<Vec<u8>>,

    /// Max age in seconds (default: 30 days). Must be positive.
    /// Used for the cookie Max-Age, the signed token lifetime and row expiry.
    pub max_age: i64,

    /// Cookie path (default: "/")
    pub path: String,

    /// Cookie domain (default: None - current domain only)
    pub domain: Option<String>,

    /// Secure flag for cookie (default: false)
    pub secure: bool,

    /// HttpOnly flag for cookie (default: true)
    pub http_only: bool,

    /// SameSite attribute for cookie
    pub same_site: SameSite,

    /// Deadline for each backend call (default: None - wait indefinitely)
    pub operation_timeout: Option<Duration>,
}

/// SameSite cookie attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SameSite {
    /// Strict - cookie only sent for same-site requests
    Strict,
    /// Lax - cookie sent for same-site requests and top-level navigations
    Lax,
    /// None - cookie sent for all requests (requires Secure)
    None,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            max_age: DEFAULT_MAX_AGE,
            path: "/".to_string(),
            domain: None,
            secure: false,
            http_only: true,
            same_site: SameSite::Lax,
            operation_timeout: None,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with a single signing key
    pub fn new<K: Into<Vec<u8>>>(key: K) -> Self {
        Self {
            keys: vec![key.into()],
            ..Default::default()
        }
    }

    /// Create a new configuration with multiple keys for rotation
    pub fn with_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Vec<u8>>,
    {
        Self {
            keys: keys.into_iter().map(|k| k.into()).collect(),
            ..Default::default()
        }
    }

    /// Set max age in seconds
    pub fn with_max_age(mut self, max_age: i64) -> Self {
        self.max_age = max_age;
        self
    }

    /// Set the cookie path (default: "/")
    pub fn with_path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = path.into();
        self
    }

    /// Set the cookie domain
    pub fn with_domain<S: Into<String>>(mut self, domain: S) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the Secure flag (default: false)
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Set the HttpOnly flag (default: true)
    pub fn with_http_only(mut self, http_only: bool) -> Self {
        self.http_only = http_only;
        self
    }

    /// Set the SameSite attribute (default: Lax)
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Bound every backend call by `timeout`
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Check that the configuration can sign cookies
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.keys.is_empty() {
            return Err(SessionError::Config("at least one signing key is required".to_string()));
        }
        if self.keys.iter().any(|k| k.is_empty()) {
            return Err(SessionError::Config("signing keys must not be empty".to_string()));
        }
        if self.max_age <= 0 {
            return Err(SessionError::Config("max_age must be positive".to_string()));
        }
        Ok(())
    }

    /// Per-session copy of the cookie defaults
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            path: self.path.clone(),
            domain: self.domain.clone(),
            max_age: self.max_age,
            secure: self.secure,
            http_only: self.http_only,
            same_site: self.same_site,
        }
    }
}
