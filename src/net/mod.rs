//! Client address range matching.

pub mod allowlist;
pub mod cidr;
