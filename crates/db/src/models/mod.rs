//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches, where
//!   the entity supports direct edits

pub mod attendance;
pub mod booking;
pub mod registry;
pub mod shift;
pub mod staff;
pub mod tenant;
