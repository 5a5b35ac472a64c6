//! Staff member model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use turnero_core::error::CoreError;
use turnero_core::staff::{StaffAvailability, TransitionOutcome};
use turnero_core::types::{DbId, TenantId, Timestamp};

/// A row from the `staff_members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StaffMember {
    pub id: DbId,
    pub tenant_id: TenantId,
    pub full_name: String,
    pub availability: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl StaffMember {
    pub fn availability(&self) -> Result<StaffAvailability, CoreError> {
        StaffAvailability::parse(&self.availability)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateStaffMember {
    pub full_name: String,
    /// Defaults to `available`. `occupied` is rejected.
    pub availability: Option<StaffAvailability>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetAvailability {
    pub availability: StaffAvailability,
}

/// What a transition attempt did to one staff row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppliedTransition {
    /// The staff row does not exist in this tenant.
    Missing,
    /// The booking no longer assigns this staff member, so the write that
    /// removed them owns the release.
    Superseded,
    Evaluated(TransitionOutcome),
}
