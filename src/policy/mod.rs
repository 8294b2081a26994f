//! Access policy for the edge-integrated path.

pub mod access;
