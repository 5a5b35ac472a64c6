//! Daily shift registries: close-of-shift statistics and the retention
//! lifecycle `present -> trashed -> purged` (with `trashed -> present` on
//! restore).

use chrono::{Duration, NaiveTime};
use serde::Serialize;

use crate::booking::BookingLifecycle;
use crate::error::CoreError;
use crate::time_window::TimeWindow;
use crate::types::{DbId, Timestamp};

/// Trashed registries older than this many days are purged by the sweep.
pub const DEFAULT_RETENTION_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// Retention state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RetentionState {
    Present,
    Trashed { at: Timestamp, by: DbId },
}

impl RetentionState {
    /// Rebuild the state from the `deleted_at` / `deleted_by` column pair.
    ///
    /// The table CHECK keeps both columns null or both set; a half-set pair
    /// is reported as an internal error.
    pub fn from_columns(
        deleted_at: Option<Timestamp>,
        deleted_by: Option<DbId>,
    ) -> Result<Self, CoreError> {
        match (deleted_at, deleted_by) {
            (None, None) => Ok(Self::Present),
            (Some(at), Some(by)) => Ok(Self::Trashed { at, by }),
            _ => Err(CoreError::Internal(
                "registry retention columns are inconsistent".into(),
            )),
        }
    }

    pub fn is_trashed(&self) -> bool {
        matches!(self, Self::Trashed { .. })
    }

    /// `present -> trashed`. Trashing twice is an [`CoreError::AlreadyInState`].
    pub fn soft_delete(self, registry_id: DbId, at: Timestamp, by: DbId) -> Result<Self, CoreError> {
        match self {
            Self::Present => Ok(Self::Trashed { at, by }),
            Self::Trashed { .. } => Err(CoreError::AlreadyInState {
                entity: "DailyShiftRegistry",
                id: registry_id,
                state: "trashed",
            }),
        }
    }

    /// `trashed -> present`. Restoring a live registry is an
    /// [`CoreError::AlreadyInState`].
    pub fn restore(self, registry_id: DbId) -> Result<Self, CoreError> {
        match self {
            Self::Trashed { .. } => Ok(Self::Present),
            Self::Present => Err(CoreError::AlreadyInState {
                entity: "DailyShiftRegistry",
                id: registry_id,
                state: "present",
            }),
        }
    }
}

/// Entries trashed strictly before this instant are expired.
pub fn sweep_cutoff(now: Timestamp, retention_days: i64) -> Timestamp {
    now - Duration::days(retention_days)
}

pub fn validate_retention_days(days: i64) -> Result<i64, CoreError> {
    if days < 1 {
        return Err(CoreError::Validation(format!(
            "Retention must be at least 1 day, got {days}"
        )));
    }
    Ok(days)
}

// ---------------------------------------------------------------------------
// Close-of-shift statistics
// ---------------------------------------------------------------------------

/// What a registry snapshot needs from each booking.
#[derive(Debug, Clone)]
pub struct BookingSnapshot {
    pub id: DbId,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub staff_ids: Vec<DbId>,
    pub lifecycle: BookingLifecycle,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub booking_ids: Vec<DbId>,
    pub total_bookings: i32,
    pub completed_bookings: i32,
    pub in_progress_bookings: i32,
    pub staff_involved: i32,
    pub booked_minutes: i64,
}

impl RegistryStats {
    pub fn from_bookings(bookings: &[BookingSnapshot]) -> Self {
        let mut stats = Self::default();
        let mut staff: Vec<DbId> = Vec::new();

        for b in bookings {
            stats.booking_ids.push(b.id);
            stats.total_bookings += 1;
            match b.lifecycle {
                BookingLifecycle::Completed => stats.completed_bookings += 1,
                BookingLifecycle::InProgress => stats.in_progress_bookings += 1,
            }
            stats.booked_minutes += TimeWindow::from_bounds(b.start_time, b.end_time).duration_minutes();
            for id in &b.staff_ids {
                if !staff.contains(id) {
                    staff.push(*id);
                }
            }
        }
        stats.staff_involved = staff.len() as i32;
        stats
    }
}

/// Outcome of one retention sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub purged: u64,
    /// One message per entry that could not be purged.
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_window::parse_time_of_day;
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2026, 5, 31, 12, 0, 0).unwrap()
    }

    #[test]
    fn soft_delete_then_restore_returns_to_present() {
        let trashed = RetentionState::Present.soft_delete(1, now(), 7).unwrap();
        assert_eq!(trashed, RetentionState::Trashed { at: now(), by: 7 });
        assert!(trashed.is_trashed());
        assert_eq!(trashed.restore(1).unwrap(), RetentionState::Present);
    }

    #[test]
    fn double_soft_delete_and_restore_of_live_entry_are_rejected() {
        let trashed = RetentionState::Trashed { at: now(), by: 1 };
        assert_matches!(
            trashed.soft_delete(5, now(), 2),
            Err(CoreError::AlreadyInState { state: "trashed", id: 5, .. })
        );
        assert_matches!(
            RetentionState::Present.restore(5),
            Err(CoreError::AlreadyInState { state: "present", .. })
        );
    }

    #[test]
    fn columns_map_to_states() {
        assert_eq!(RetentionState::from_columns(None, None).unwrap(), RetentionState::Present);
        assert_eq!(
            RetentionState::from_columns(Some(now()), Some(3)).unwrap(),
            RetentionState::Trashed { at: now(), by: 3 }
        );
        assert_matches!(
            RetentionState::from_columns(Some(now()), None),
            Err(CoreError::Internal(_))
        );
    }

    #[test]
    fn cutoff_lies_retention_days_back() {
        let cutoff = sweep_cutoff(now(), DEFAULT_RETENTION_DAYS);
        assert_eq!(cutoff, now() - Duration::days(30));
        assert!(now() - Duration::days(31) < cutoff);
        assert!(now() - Duration::days(29) > cutoff);
    }

    #[test]
    fn retention_must_be_positive() {
        assert_eq!(validate_retention_days(30).unwrap(), 30);
        assert_matches!(validate_retention_days(0), Err(CoreError::Validation(_)));
    }

    #[test]
    fn stats_aggregate_bookings() {
        let t = |s| parse_time_of_day(s).unwrap();
        let bookings = vec![
            BookingSnapshot {
                id: 1,
                start_time: t("08:00"),
                end_time: t("09:30"),
                staff_ids: vec![1, 2],
                lifecycle: BookingLifecycle::Completed,
            },
            BookingSnapshot {
                id: 2,
                start_time: t("10:00"),
                end_time: t("11:00"),
                staff_ids: vec![2, 3],
                lifecycle: BookingLifecycle::InProgress,
            },
        ];
        let stats = RegistryStats::from_bookings(&bookings);
        assert_eq!(stats.booking_ids, vec![1, 2]);
        assert_eq!(stats.total_bookings, 2);
        assert_eq!(stats.completed_bookings, 1);
        assert_eq!(stats.in_progress_bookings, 1);
        assert_eq!(stats.staff_involved, 3);
        assert_eq!(stats.booked_minutes, 150);
    }
}
