//! Edgepass error types.

use thiserror::Error;

/// Errors that can occur while loading configuration or issuing a pass token.
#[derive(Debug, Error)]
pub enum EdgepassError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Shared secret is missing or empty (fail-closed).
    #[error("Shared secret is missing or empty")]
    MissingSecret,

    /// An allowlist entry is not a well-formed IPv4 CIDR.
    #[error("Invalid CIDR {cidr:?}: {reason}")]
    InvalidCidr {
        /// The offending entry as configured.
        cidr: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Client address is not a valid dotted-quad.
    #[error("Malformed client address: {0:?}")]
    AddressParse(String),

    /// Client address belongs to a family the matcher does not handle (IPv6).
    #[error("Unsupported address family: {0:?}")]
    UnsupportedAddressFamily(String),

    /// The secure random source could not produce a nonce.
    #[error("Nonce unavailable: {0}")]
    NonceUnavailable(String),

    /// Invocation payload does not have a shape the handler understands.
    #[error("Protocol error: {0}")]
    ProtocolError(String),

    /// Header value is not `<signature>.<timestamp>.<nonce>`.
    #[error("Malformed token: {0}")]
    MalformedToken(String),
}
