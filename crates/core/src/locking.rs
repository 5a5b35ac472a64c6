//! PostgreSQL advisory lock keys.
//!
//! Transaction-scoped advisory locks (`pg_advisory_xact_lock`) serialize the
//! few operations that must not interleave: per-day booking numbering,
//! shift reconciliation per tenant, and attendance ranking per (shift, day).
//! Keys are packed into one `i64`:
//!
//! ```text
//! | namespace (8 bits) | scope id (40 bits) | day number (16 bits) |
//! ```
//!
//! Scope ids above 2^40 or days past 2179 wrap; a collision only makes two
//! unrelated scopes wait on each other, it never breaks correctness.

use chrono::{Datelike, NaiveDate};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Namespaces
// ---------------------------------------------------------------------------

/// Booking sequence numbering, scoped by (tenant, booking date).
pub const NS_BOOKING_SEQUENCE: u8 = 0x11;
/// Shift reconciliation and config activation, scoped by tenant.
pub const NS_SHIFT_CONFIG: u8 = 0x12;
/// Attendance creation and ranking, scoped by (shift window, date).
pub const NS_ATTENDANCE: u8 = 0x13;

const SCOPE_BITS: u32 = 40;
const DAY_BITS: u32 = 16;
const SCOPE_MASK: u64 = (1 << SCOPE_BITS) - 1;
const DAY_MASK: u64 = (1 << DAY_BITS) - 1;

fn day_number(date: NaiveDate) -> u64 {
    // 730_120 is 2000-01-01 counted from 0001-01-01.
    i64::from(date.num_days_from_ce() - 730_120).rem_euclid(1 << DAY_BITS) as u64
}

fn pack(namespace: u8, scope_id: DbId, day: u64) -> i64 {
    let scope = (scope_id as u64) & SCOPE_MASK;
    let raw = (u64::from(namespace) << (SCOPE_BITS + DAY_BITS)) | (scope << DAY_BITS) | (day & DAY_MASK);
    raw as i64
}

/// Lock key for a scope that lives within one calendar day.
pub fn day_scoped_lock_key(namespace: u8, scope_id: DbId, date: NaiveDate) -> i64 {
    pack(namespace, scope_id, day_number(date))
}

/// Lock key for a scope with no date component.
pub fn scope_lock_key(namespace: u8, scope_id: DbId) -> i64 {
    pack(namespace, scope_id, 0)
}
