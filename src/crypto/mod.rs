//! Cryptographic primitives for issuing origin pass tokens.

pub mod digest;
pub mod nonce;
pub mod signing;
pub mod token;
