//! Edgepass configuration.

use crate::net::allowlist::Allowlist;
use crate::EdgepassError;
use std::fmt;

/// Environment variable holding the shared HMAC secret.
pub const SECRET_ENV: &str = "SHARED_SECRET";

/// Environment variable holding the JSON array of edge CIDRs.
pub const CIDRS_ENV: &str = "CF_ORIGIN_CIDRS";

/// Shared signing key. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SharedSecret(Vec<u8>);

impl SharedSecret {
    /// Wrap key bytes, rejecting an empty key.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, EdgepassError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(EdgepassError::MissingSecret);
        }
        Ok(Self(bytes))
    }

    /// Key bytes for the HMAC.
    pub fn expose(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedSecret(<redacted>)")
    }
}

/// Process-wide settings, loaded once at startup and shared read-only.
#[derive(Debug, Clone)]
pub struct EdgepassConfig {
    /// Key shared with the origin-side verifier.
    pub secret: SharedSecret,

    /// Ranges the edge-integrated path must originate from.
    pub allowlist: Allowlist,
}

impl EdgepassConfig {
    /// Build configuration from a raw secret and a JSON array of CIDRs.
    pub fn new(secret: &str, cidrs_json: &str) -> Result<Self, EdgepassError> {
        let config = Self {
            secret: SharedSecret::new(secret.as_bytes())?,
            allowlist: Allowlist::from_json(cidrs_json)?,
        };
        config.validate()?;

        tracing::info!(ranges = config.allowlist.len(), "edgepass configuration loaded");
        Ok(config)
    }

    /// Load from `SHARED_SECRET` and `CF_ORIGIN_CIDRS`.
    pub fn from_env() -> Result<Self, EdgepassError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, EdgepassError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup(SECRET_ENV).ok_or(EdgepassError::MissingSecret)?;
        let cidrs = lookup(CIDRS_ENV).ok_or_else(|| {
            EdgepassError::ConfigError(format!("{} is not set", CIDRS_ENV))
        })?;
        Self::new(&secret, &cidrs)
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), EdgepassError> {
        if self.secret.expose().is_empty() {
            return Err(EdgepassError::MissingSecret);
        }
        if self.allowlist.is_empty() {
            tracing::warn!("allowlist is empty; every edge request will be rejected");
        }
        Ok(())
    }
}
