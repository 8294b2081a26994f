//! HMAC-SHA256 computation.

use crate::config::SharedSecret;
use crate::EdgepassError;
use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA256 of `payload` and return it base64-encoded (standard alphabet, padded).
pub fn hmac_sha256_b64(key: &[u8], payload: &str) -> Result<String, EdgepassError> {
    if key.is_empty() {
        return Err(EdgepassError::MissingSecret);
    }
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| EdgepassError::ConfigError(format!("Invalid HMAC key: {}", e)))?;
    mac.update(payload.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Sign a payload with the shared secret.
pub fn sign_payload(secret: &SharedSecret, payload: &str) -> Result<String, EdgepassError> {
    hmac_sha256_b64(secret.expose(), payload)
}
