//! Session identifier generation

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};

/// Number of random bytes behind each identifier
pub const ID_ENTROPY_BYTES: usize = 32;

/// Length of a generated identifier: unpadded base64url of 32 bytes
pub const ID_LENGTH: usize = 43;

/// Source of new session identifiers
///
/// Closures `Fn() -> String` implement this, which keeps identifiers
/// deterministic in tests.
pub trait IdGenerator: Send + Sync + 'static {
    /// Produce a new identifier
    fn generate(&self) -> String;
}

impl<F> IdGenerator for F
where
    F: Fn() -> String + Send + Sync + 'static,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Generates cookie-safe identifiers from 256 bits of OS randomness
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn generate(&self) -> String {
        let mut bytes = [0u8; ID_ENTROPY_BYTES];
        OsRng.fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }
}
