//! Signed session cookies
//!
//! A session cookie carries only the session identifier. The token format is
//! `base64url(value) + "." + timestamp + "." + base64url(hmac_sha256(name|timestamp|value))`,
//! so a token is bound to the cookie name it was issued for and to the time
//! it was signed.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::SessionError;

type HmacSha256 = Hmac<Sha256>;

/// Capability that turns a session identifier into a tamper-evident cookie
/// value and back
pub trait Authenticator: Send + Sync + 'static {
    /// Sign `value` for the cookie `name`
    fn encode(&self, name: &str, value: &str) -> Result<String, SessionError>;

    /// Verify `token` for the cookie `name` and return the carried value
    fn decode(&self, name: &str, token: &str) -> Result<String, SessionError>;
}

/// HMAC-SHA256 authenticator with key rotation
///
/// The first key signs new tokens. All keys are tried, in order, when
/// verifying.
#[derive(Clone)]
pub struct SignedCookieAuthenticator {
    keys: Vec<Vec<u8>>,
    max_age: i64,
}

impl SignedCookieAuthenticator {
    /// Create an authenticator. Tokens older than `max_age` seconds are
    /// rejected; `max_age <= 0` disables the age check.
    pub fn new(keys: Vec<Vec<u8>>, max_age: i64) -> Result<Self, SessionError> {
        if keys.is_empty() {
            return Err(SessionError::Config("at least one signing key is required".to_string()));
        }
        Ok(Self { keys, max_age })
    }

    pub(crate) fn encode_at(&self, name: &str, value: &str, timestamp: i64) -> Result<String, SessionError> {
        let mac = create_signature(&self.keys[0], name, timestamp, value)?;
        Ok(format!(
            "{}.{}.{}",
            URL_SAFE_NO_PAD.encode(value),
            timestamp,
            URL_SAFE_NO_PAD.encode(mac)
        ))
    }

    pub(crate) fn decode_at(&self, name: &str, token: &str, now: i64) -> Result<String, SessionError> {
        let mut parts = token.split('.');
        let (encoded_value, timestamp, encoded_mac) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(v), Some(t), Some(m), None) => (v, t, m),
            _ => return Err(SessionError::InvalidCookie("expected three token segments".to_string())),
        };

        let timestamp: i64 = timestamp
            .parse()
            .map_err(|_| SessionError::InvalidCookie("invalid timestamp".to_string()))?;
        let value = URL_SAFE_NO_PAD
            .decode(encoded_value)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or_else(|| SessionError::InvalidCookie("invalid value encoding".to_string()))?;
        let provided_mac = URL_SAFE_NO_PAD
            .decode(encoded_mac)
            .map_err(|_| SessionError::InvalidCookie("invalid signature encoding".to_string()))?;

        let mut verified = false;
        for key in &self.keys {
            if verify_signature(key, name, timestamp, &value, &provided_mac)? {
                verified = true;
                break;
            }
        }
        if !verified {
            return Err(SessionError::InvalidSignature);
        }

        // Only checked once the timestamp is known to be authentic
        if self.max_age > 0 && timestamp.saturating_add(self.max_age) < now {
            return Err(SessionError::CookieExpired);
        }
        Ok(value)
    }
}

impl std::fmt::Debug for SignedCookieAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedCookieAuthenticator")
            .field("keys", &self.keys.len())
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl Authenticator for SignedCookieAuthenticator {
    fn encode(&self, name: &str, value: &str) -> Result<String, SessionError> {
        self.encode_at(name, value, Utc::now().timestamp())
    }

    fn decode(&self, name: &str, token: &str) -> Result<String, SessionError> {
        self.decode_at(name, token, Utc::now().timestamp())
    }
}

fn keyed_mac(key: &[u8], name: &str, timestamp: i64, value: &str) -> Result<HmacSha256, SessionError> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| SessionError::Config(e.to_string()))?;
    mac.update(name.as_bytes());
    mac.update(b"|");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b"|");
    mac.update(value.as_bytes());
    Ok(mac)
}

fn create_signature(key: &[u8], name: &str, timestamp: i64, value: &str) -> Result<Vec<u8>, SessionError> {
    Ok(keyed_mac(key, name, timestamp, value)?.finalize().into_bytes().to_vec())
}

/// Constant-time comparison against the expected MAC
fn verify_signature(key: &[u8], name: &str, timestamp: i64, value: &str, provided: &[u8]) -> Result<bool, SessionError> {
    Ok(keyed_mac(key, name, timestamp, value)?.verify_slice(provided).is_ok())
}
