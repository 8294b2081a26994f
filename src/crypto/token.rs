//! Origin pass token format and signer.
//!
//! Header value layout, fields joined by `.`:
//! ```text
//! <base64 HMAC-SHA256>.<decimal timestamp>.<nonce>
//! ```

use crate::clock::Clock;
use crate::config::SharedSecret;
use crate::crypto::digest::sign_payload;
use crate::crypto::signing::build_payload;
use crate::EdgepassError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Header carrying the pass token.
pub const PASS_HEADER: &str = "x-aws-pass";

/// A computed pass token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    /// Base64-encoded HMAC over the payload.
    pub signature: String,

    /// Signing time, whole seconds since the Unix epoch.
    pub timestamp: i64,

    /// Per-request nonce.
    pub nonce: String,
}

impl SignedToken {
    /// Render as a header value.
    pub fn header_value(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SignedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.signature, self.timestamp, self.nonce)
    }
}

impl FromStr for SignedToken {
    type Err = EdgepassError;

    /// Split on the first two dots. Base64 never contains `.`, so any further
    /// dots belong to the nonce.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, '.');
        let (Some(signature), Some(timestamp), Some(nonce)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(EdgepassError::MalformedToken(
                "expected <signature>.<timestamp>.<nonce>".to_string(),
            ));
        };

        if signature.is_empty() || nonce.is_empty() {
            return Err(EdgepassError::MalformedToken(
                "signature and nonce must be non-empty".to_string(),
            ));
        }

        let timestamp = timestamp.parse::<i64>().map_err(|e| {
            EdgepassError::MalformedToken(format!("timestamp is not an integer: {}", e))
        })?;

        Ok(Self {
            signature: signature.to_string(),
            timestamp,
            nonce: nonce.to_string(),
        })
    }
}

/// Computes pass tokens with the shared secret and a clock.
#[derive(Clone)]
pub struct TokenSigner {
    secret: SharedSecret,
    clock: Arc<dyn Clock>,
}

impl TokenSigner {
    /// Create a signer over `secret`, reading time from `clock`.
    pub fn new(secret: SharedSecret, clock: Arc<dyn Clock>) -> Self {
        Self { secret, clock }
    }

    /// Sign at the current clock time.
    pub fn sign(&self, user_agent: &str, nonce: &str) -> Result<SignedToken, EdgepassError> {
        self.sign_at(user_agent, nonce, self.clock.unix_seconds())
    }

    /// Sign at an explicit timestamp.
    pub fn sign_at(
        &self,
        user_agent: &str,
        nonce: &str,
        timestamp: i64,
    ) -> Result<SignedToken, EdgepassError> {
        let payload = build_payload(user_agent, nonce, timestamp);
        let signature = sign_payload(&self.secret, &payload)?;

        tracing::debug!(timestamp, nonce, "pass token signed");

        Ok(SignedToken {
            signature,
            timestamp,
            nonce: nonce.to_string(),
        })
    }
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("secret", &self.secret)
            .finish_non_exhaustive()
    }
}
