//! Invocation wire formats.

pub mod models;
