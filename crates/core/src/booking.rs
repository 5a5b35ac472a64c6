//! Booking ("turno") lifecycle rules.
//!
//! - Lifecycle: `in_progress -> completed`, terminal, no way back.
//! - Registration: `active -> archived`, orthogonal to the lifecycle; set once
//!   a booking is folded into a saved daily registry.
//! - Staff assignment diffs and the best-effort result type used when staff
//!   side effects fail without failing the booking write.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::staff::StaffAvailability;
use crate::types::DbId;

pub const LIFECYCLE_IN_PROGRESS: &str = "in_progress";
pub const LIFECYCLE_COMPLETED: &str = "completed";

pub const REGISTRATION_ACTIVE: &str = "active";
pub const REGISTRATION_ARCHIVED: &str = "archived";

/// Maximum number of staff members assigned to a single booking.
pub const MAX_ASSIGNED_STAFF: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingLifecycle {
    InProgress,
    Completed,
}

impl BookingLifecycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => LIFECYCLE_IN_PROGRESS,
            Self::Completed => LIFECYCLE_COMPLETED,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            LIFECYCLE_IN_PROGRESS => Ok(Self::InProgress),
            LIFECYCLE_COMPLETED => Ok(Self::Completed),
            other => Err(CoreError::Validation(format!(
                "Unknown booking lifecycle state: '{other}'"
            ))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Move to `completed`. Completing twice is an [`CoreError::AlreadyInState`].
    pub fn complete(self, booking_id: DbId) -> Result<Self, CoreError> {
        match self {
            Self::InProgress => Ok(Self::Completed),
            Self::Completed => Err(CoreError::AlreadyInState {
                entity: "Booking",
                id: booking_id,
                state: LIFECYCLE_COMPLETED,
            }),
        }
    }

    /// Completed bookings are frozen: no edits to staff, times or shift.
    pub fn ensure_editable(self, booking_id: DbId) -> Result<(), CoreError> {
        if self.is_terminal() {
            Err(CoreError::Conflict(format!(
                "Booking {booking_id} is completed and can no longer be edited"
            )))
        } else {
            Ok(())
        }
    }
}

/// Sequence number for the next booking of a (tenant, date) pair.
///
/// Only meaningful when `current_max` was read under the per-day lock.
pub fn next_sequence(current_max: Option<i32>) -> i32 {
    current_max.unwrap_or(0) + 1
}

/// De-duplicate staff ids, keeping first-seen order, and enforce the cap.
pub fn normalize_staff_ids(ids: &[DbId]) -> Result<Vec<DbId>, CoreError> {
    let mut out: Vec<DbId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    if out.len() > MAX_ASSIGNED_STAFF {
        return Err(CoreError::Validation(format!(
            "A booking can have at most {MAX_ASSIGNED_STAFF} staff members, got {}",
            out.len()
        )));
    }
    Ok(out)
}

/// How an assignment change affects each staff member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffDiff {
    /// Removed from the booking: released to `available`.
    pub released: Vec<DbId>,
    /// Newly assigned: set to `occupied`.
    pub added: Vec<DbId>,
    /// Present before and after: left alone.
    pub kept: Vec<DbId>,
}

impl StaffDiff {
    pub fn is_empty(&self) -> bool {
        self.released.is_empty() && self.added.is_empty()
    }
}

/// Diff the stored assignment against the requested one.
pub fn diff_staff(current: &[DbId], next: &[DbId]) -> StaffDiff {
    let mut diff = StaffDiff::default();
    for id in current {
        if next.contains(id) {
            if !diff.kept.contains(id) {
                diff.kept.push(*id);
            }
        } else if !diff.released.contains(id) {
            diff.released.push(*id);
        }
    }
    for id in next {
        if !current.contains(id) && !diff.added.contains(id) {
            diff.added.push(*id);
        }
    }
    diff
}

/// Where a booking's shift came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "shift_window_id", rename_all = "snake_case")]
pub enum ShiftAssignment {
    /// Supplied by the caller and stored verbatim.
    Explicit(DbId),
    /// Resolved from the booking start time.
    Inferred(DbId),
    /// No shift configured for the tenant.
    Unassigned,
}

impl ShiftAssignment {
    /// Explicit references win; inference only runs when none was given.
    pub fn choose(explicit: Option<DbId>, infer: impl FnOnce() -> Option<DbId>) -> Self {
        match explicit {
            Some(id) => Self::Explicit(id),
            None => infer().map_or(Self::Unassigned, Self::Inferred),
        }
    }

    pub fn shift_window_id(&self) -> Option<DbId> {
        match self {
            Self::Explicit(id) | Self::Inferred(id) => Some(*id),
            Self::Unassigned => None,
        }
    }
}

/// A staff side effect that failed and was recovered from locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffTransitionFailure {
    pub staff_id: DbId,
    pub target: StaffAvailability,
    pub reason: String,
}

/// Outcome of an operation whose primary write succeeded while some
/// secondary side effects may have failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BestEffort<T> {
    pub data: T,
    pub recovered_failures: Vec<StaffTransitionFailure>,
}

impl<T> BestEffort<T> {
    pub fn new(data: T, recovered_failures: Vec<StaffTransitionFailure>) -> Self {
        Self {
            data,
            recovered_failures,
        }
    }
}
