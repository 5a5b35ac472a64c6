//! Daily shift registry model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use turnero_core::error::CoreError;
use turnero_core::registry::RetentionState;
use turnero_core::types::{DbId, TenantId, Timestamp};

/// A row from the `daily_shift_registries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DailyShiftRegistry {
    pub id: DbId,
    pub tenant_id: TenantId,
    pub shift_window_id: Option<DbId>,
    pub registry_date: NaiveDate,
    pub booking_ids: Vec<DbId>,
    pub total_bookings: i32,
    pub completed_bookings: i32,
    pub in_progress_bookings: i32,
    pub staff_involved: i32,
    pub booked_minutes: i64,
    pub created_by: Option<DbId>,
    pub deleted_at: Option<Timestamp>,
    pub deleted_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl DailyShiftRegistry {
    pub fn retention(&self) -> Result<RetentionState, CoreError> {
        RetentionState::from_columns(self.deleted_at, self.deleted_by)
    }
}

/// DTO for closing a shift into a registry.
#[derive(Debug, Clone, Deserialize)]
pub struct CloseShift {
    pub shift_window_id: DbId,
    pub registry_date: NaiveDate,
}
