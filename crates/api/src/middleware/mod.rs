//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller and tenant from a JWT Bearer token.
//! - [`rbac::RequireManager`] -- requires the `manager` or `admin` role.

pub mod auth;
pub mod rbac;
