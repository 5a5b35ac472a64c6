//! Attendance record model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use turnero_core::attendance::{RankInput, SummaryInput};
use turnero_core::types::{DbId, TenantId, Timestamp};

/// A row from the `attendance_records` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceRecord {
    pub id: DbId,
    pub tenant_id: TenantId,
    pub staff_id: DbId,
    pub shift_window_id: DbId,
    pub attendance_date: NaiveDate,
    pub arrived_at: Timestamp,
    pub tasks_completed: bool,
    pub prior_day_shift_count: i32,
    pub rank: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl AttendanceRecord {
    pub fn rank_input(&self) -> RankInput {
        RankInput {
            id: self.id,
            prior_day_shift_count: self.prior_day_shift_count,
            tasks_completed: self.tasks_completed,
            arrived_at: self.arrived_at,
        }
    }

    pub fn summary_input(&self) -> SummaryInput {
        SummaryInput {
            staff_id: self.staff_id,
            shift_window_id: self.shift_window_id,
            tasks_completed: self.tasks_completed,
        }
    }
}

/// DTO for recording an arrival.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAttendance {
    pub staff_id: DbId,
    pub shift_window_id: DbId,
    pub attendance_date: NaiveDate,
    /// Defaults to now.
    pub arrived_at: Option<Timestamp>,
    #[serde(default)]
    pub tasks_completed: bool,
    /// Derived from the previous day's records when omitted.
    pub prior_day_shift_count: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAttendance {
    pub tasks_completed: bool,
}
