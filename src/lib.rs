//! # Edgepass
//!
//! **Signed origin pass tokens for CDN-fronted origins.**
//!
//! Edgepass runs at the CDN edge and attaches an `x-aws-pass` header that
//! proves a request went through the authorized front door. The origin
//! recomputes the HMAC and rejects traffic that bypassed the CDN.
//!
//! ## Features
//!
//! - **Edge gate** - edge-delivered events must come from an allowlisted IPv4 range
//! - **Non-spoofable nonce** - edge mode binds the CDN's own request id
//! - **CSPRNG nonce** - regional mode binds 8 bytes from the OS random source
//! - **HMAC-SHA256** - over `user-agent|nonce|timestamp`, base64-encoded
//! - **Fail-closed** - empty secret or malformed CIDR refuses to start
//!
//! ## Quickstart
//!
//! ```no_run
//! use edgepass::{Edgepass, EdgepassConfig};
//!
//! fn main() -> Result<(), edgepass::EdgepassError> {
//!     // SHARED_SECRET and CF_ORIGIN_CIDRS
//!     let config = EdgepassConfig::from_env()?;
//!     let handler = Edgepass::new(config)?;
//!
//!     let event = serde_json::json!({
//!         "headers": {"User-Agent": "curl/8.0"},
//!         "uri": "/"
//!     });
//!     let signed = handler.handle_value(event)?;
//!     println!("{}", signed["headers"]["x-aws-pass"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Token
//!
//! ```text
//! x-aws-pass: <base64 HMAC-SHA256>.<unix seconds>.<nonce>
//! ```
//!
//! ## Trust Model
//!
//! - **Edge-integrated** events carry CDN delivery metadata; the client
//!   address is gated against the allowlist and failures get a 403.
//! - **Regional** events carry no trusted provenance, so there is nothing to
//!   gate on. They are always signed; freshness and replay windows are the
//!   origin verifier's job.
//!
//! IPv6 client addresses are reported as unsupported and never match.

#![deny(warnings)]
#![deny(missing_docs)]

// Core modules
pub mod clock;
pub mod config;
pub mod errors;

// Address matching
pub mod net;

// Crypto layer
pub mod crypto;

// Protocol layer
pub mod protocol;

// Policy layer
pub mod policy;

// Handler (main public API)
pub mod handler;

// Re-exports for public API
pub use clock::{Clock, SystemClock};
pub use config::{EdgepassConfig, SharedSecret};
pub use crypto::nonce::{NonceSource, OsNonceSource};
pub use crypto::token::{SignedToken, TokenSigner, PASS_HEADER};
pub use errors::EdgepassError;
pub use handler::{Edgepass, HandlerOutput};
pub use net::allowlist::Allowlist;
pub use net::cidr::{matches, Ipv4Cidr};
pub use protocol::models::Invocation;

#[cfg(any(test, feature = "test-seams"))]
pub use clock::MockClock;

#[cfg(any(test, feature = "test-seams"))]
pub use crypto::nonce::FixedNonceSource;
