//! Shift configuration and shift window models.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use turnero_core::shift_reconcile::DuplicateGroup;
use turnero_core::shift_resolver::Windowed;
use turnero_core::time_window::{serde_opt_time_of_day, serde_time_of_day, TimeWindow};
use turnero_core::types::{DbId, TenantId, Timestamp};

/// Scheme kind recorded for configurations created implicitly by reconciliation.
pub const SCHEME_CUSTOM: &str = "custom";

/// A row from the `shift_configs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShiftConfig {
    pub id: DbId,
    pub tenant_id: TenantId,
    pub name: String,
    pub scheme_kind: String,
    pub is_active: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a configuration explicitly (inactive until activated).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateShiftConfig {
    pub name: String,
    pub scheme_kind: Option<String>,
}

/// A row from the `shift_windows` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ShiftWindow {
    pub id: DbId,
    pub config_id: DbId,
    pub code: String,
    pub name: String,
    #[serde(with = "serde_time_of_day")]
    pub start_time: NaiveTime,
    #[serde(with = "serde_time_of_day")]
    pub end_time: NaiveTime,
    pub color: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Windowed for ShiftWindow {
    fn time_window(&self) -> TimeWindow {
        TimeWindow::from_bounds(self.start_time, self.end_time)
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// DTO for editing a single window directly. The code is immutable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateShiftWindow {
    pub name: Option<String>,
    #[serde(default, with = "serde_opt_time_of_day")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "serde_opt_time_of_day")]
    pub end_time: Option<NaiveTime>,
    pub color: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

/// Result of a reconciliation run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    pub config_id: DbId,
    /// Final windows in submission order.
    pub windows: Vec<ShiftWindow>,
    pub created: usize,
    pub updated: usize,
    /// Stored duplicate groups collapsed before matching.
    pub duplicates_removed: Vec<DuplicateGroup>,
    /// Attendance rows lost because the survivor already had one for the
    /// same staff member and date.
    pub attendance_dropped: u64,
    /// Registries left without a shift for the same reason.
    pub registries_detached: u64,
}
