//! Nonce sources for the regional path.
//!
//! The edge-integrated path uses the delivery request id instead and never
//! calls into this module.

use crate::EdgepassError;
use rand::rngs::OsRng;
use rand::RngCore;

/// Random bytes per nonce; rendered as twice as many hex characters.
pub const NONCE_BYTES: usize = 8;

/// Source of per-request nonces.
pub trait NonceSource: Send + Sync {
    /// Produce a fresh nonce.
    fn nonce(&self) -> Result<String, EdgepassError>;
}

/// Operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsNonceSource;

impl NonceSource for OsNonceSource {
    fn nonce(&self) -> Result<String, EdgepassError> {
        let mut bytes = [0u8; NONCE_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| EdgepassError::NonceUnavailable(e.to_string()))?;
        Ok(hex::encode(bytes))
    }
}

/// Nonce source that always returns the same value.
#[cfg(any(test, feature = "test-seams"))]
#[derive(Debug, Clone)]
pub struct FixedNonceSource {
    value: String,
}

#[cfg(any(test, feature = "test-seams"))]
impl FixedNonceSource {
    /// Create a source returning `value` on every call.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[cfg(any(test, feature = "test-seams"))]
impl NonceSource for FixedNonceSource {
    fn nonce(&self) -> Result<String, EdgepassError> {
        Ok(self.value.clone())
    }
}
