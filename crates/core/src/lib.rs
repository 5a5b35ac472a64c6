//! Domain logic for the shift-window and booking lifecycle engine.
//!
//! Everything in this crate is pure: no database, no HTTP, no clock reads
//! except where a caller passes `now` in. The `db` crate persists what these
//! modules decide and the `api` crate orchestrates both.

pub mod attendance;
pub mod booking;
pub mod error;
pub mod locking;
pub mod registry;
pub mod roles;
pub mod shift_reconcile;
pub mod shift_resolver;
pub mod staff;
pub mod time_window;
pub mod types;
