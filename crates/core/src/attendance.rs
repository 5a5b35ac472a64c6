//! Arrival priority ranking for one (date, shift).
//!
//! Ordering, ascending:
//! 1. fewer shifts worked the previous day,
//! 2. tasks completed before tasks pending,
//! 3. earlier arrival,
//! 4. lower record id (keeps the order total so reruns are stable).

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// The fields ranking looks at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankInput {
    pub id: DbId,
    pub prior_day_shift_count: i32,
    pub tasks_completed: bool,
    pub arrived_at: Timestamp,
}

fn priority(a: &RankInput, b: &RankInput) -> Ordering {
    a.prior_day_shift_count
        .cmp(&b.prior_day_shift_count)
        // `true` must sort first.
        .then_with(|| b.tasks_completed.cmp(&a.tasks_completed))
        .then_with(|| a.arrived_at.cmp(&b.arrived_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Compute ranks `1..=N` for the given records, returned in rank order as
/// `(record_id, rank)`.
pub fn compute_ranks(records: &[RankInput]) -> Vec<(DbId, i32)> {
    let mut sorted: Vec<&RankInput> = records.iter().collect();
    sorted.sort_by(|a, b| priority(a, b));
    sorted
        .into_iter()
        .enumerate()
        .map(|(i, r)| (r.id, i as i32 + 1))
        .collect()
}

/// A record as needed for attendance statistics.
#[derive(Debug, Clone)]
pub struct SummaryInput {
    pub staff_id: DbId,
    pub shift_window_id: DbId,
    pub tasks_completed: bool,
}

/// Attendance statistics over a date range.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttendanceSummary {
    pub total_records: i64,
    pub distinct_staff: i64,
    pub tasks_completed: i64,
    /// Share of records with tasks completed, 0..=100, one decimal.
    pub tasks_completed_pct: f64,
    /// Record count per shift window id.
    pub per_shift: BTreeMap<DbId, i64>,
}

pub fn summarize(records: &[SummaryInput]) -> AttendanceSummary {
    let mut staff = HashSet::new();
    let mut per_shift: BTreeMap<DbId, i64> = BTreeMap::new();
    let mut done = 0i64;

    for r in records {
        staff.insert(r.staff_id);
        *per_shift.entry(r.shift_window_id).or_default() += 1;
        if r.tasks_completed {
            done += 1;
        }
    }

    let total = records.len() as i64;
    let pct = if total == 0 {
        0.0
    } else {
        (done as f64 * 1000.0 / total as f64).round() / 10.0
    };

    AttendanceSummary {
        total_records: total,
        distinct_staff: staff.len() as i64,
        tasks_completed: done,
        tasks_completed_pct: pct,
        per_shift,
    }
}
