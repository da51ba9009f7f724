//! Serialization of session values to and from stored bytes

use serde_json::Value;
use std::collections::HashMap;

use crate::error::SessionError;

/// The application-visible value mapping of a session
pub type Values = HashMap<String, Value>;

/// Serializer for session values
///
/// `decode(encode(values))` must equal `values`. Decoding bytes that were not
/// produced by the same codec is an error, never a partial result.
pub trait ValueCodec: Send + Sync + 'static {
    /// Serialize the value mapping
    fn encode(&self, values: &Values) -> Result<Vec<u8>, SessionError>;

    /// Deserialize a value mapping
    fn decode(&self, bytes: &[u8]) -> Result<Values, SessionError>;
}

/// JSON codec; values are stored as a single JSON object
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonCodec;

impl ValueCodec for JsonCodec {
    fn encode(&self, values: &Values) -> Result<Vec<u8>, SessionError> {
        Ok(serde_json::to_vec(values)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Values, SessionError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
