//! Jobs spawned next to the HTTP server.
//!
//! [`registry_retention`] purges daily registries whose trash retention
//! has run out. It stops when the shutdown token is cancelled.

pub mod registry_retention;
