//! Signing payload construction.
//!
//! The payload bound by the pass token:
//! ```text
//! <user-agent>|<nonce>|<timestamp>
//! ```
//! No escaping is applied; the verifier rebuilds the same string from the
//! request's user agent and the token's own timestamp and nonce fields.

/// Separator between payload fields.
pub const PAYLOAD_SEPARATOR: char = '|';

/// Build the payload string the HMAC is computed over.
///
/// # Arguments
/// * `user_agent` - Client user agent, empty when absent
/// * `nonce` - Per-request nonce
/// * `timestamp` - Whole seconds since the Unix epoch
pub fn build_payload(user_agent: &str, nonce: &str, timestamp: i64) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        user_agent,
        nonce,
        timestamp,
        sep = PAYLOAD_SEPARATOR
    )
}
