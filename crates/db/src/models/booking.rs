//! Booking ("turno") model and DTOs.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use turnero_core::booking::BookingLifecycle;
use turnero_core::error::CoreError;
use turnero_core::registry::BookingSnapshot;
use turnero_core::time_window::{serde_opt_time_of_day, serde_time_of_day};
use turnero_core::types::{DbId, TenantId, Timestamp};

/// A row from the `bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub id: DbId,
    pub tenant_id: TenantId,
    pub booking_date: NaiveDate,
    #[serde(with = "serde_time_of_day")]
    pub start_time: NaiveTime,
    #[serde(with = "serde_time_of_day")]
    pub end_time: NaiveTime,
    pub court_id: Option<DbId>,
    pub staff_ids: Vec<DbId>,
    pub shift_window_id: Option<DbId>,
    pub lifecycle: String,
    pub registration: String,
    pub sequence_number: i32,
    pub notes: Option<String>,
    pub created_by: Option<DbId>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Booking {
    pub fn lifecycle(&self) -> Result<BookingLifecycle, CoreError> {
        BookingLifecycle::parse(&self.lifecycle)
    }

    pub fn snapshot(&self) -> Result<BookingSnapshot, CoreError> {
        Ok(BookingSnapshot {
            id: self.id,
            start_time: self.start_time,
            end_time: self.end_time,
            staff_ids: self.staff_ids.clone(),
            lifecycle: self.lifecycle()?,
        })
    }
}

/// DTO for creating a booking.
///
/// `shift_window_id` is an explicit override; when omitted the shift is
/// inferred from `start_time`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBooking {
    pub booking_date: NaiveDate,
    #[serde(with = "serde_time_of_day")]
    pub start_time: NaiveTime,
    #[serde(with = "serde_time_of_day")]
    pub end_time: NaiveTime,
    pub court_id: Option<DbId>,
    #[serde(default)]
    pub staff_ids: Vec<DbId>,
    pub shift_window_id: Option<DbId>,
    pub notes: Option<String>,
}

/// DTO for patching a booking. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBooking {
    pub booking_date: Option<NaiveDate>,
    #[serde(default, with = "serde_opt_time_of_day")]
    pub start_time: Option<NaiveTime>,
    #[serde(default, with = "serde_opt_time_of_day")]
    pub end_time: Option<NaiveTime>,
    pub court_id: Option<DbId>,
    /// Replaces the whole assignment when present.
    pub staff_ids: Option<Vec<DbId>>,
    pub shift_window_id: Option<DbId>,
    pub notes: Option<String>,
}

/// Fully resolved values written by an update.
#[derive(Debug, Clone)]
pub struct BookingChanges {
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub court_id: Option<DbId>,
    pub staff_ids: Vec<DbId>,
    pub shift_window_id: Option<DbId>,
    pub notes: Option<String>,
}

/// What [`BookingRepo::update`](crate::repositories::BookingRepo::update)
/// found under the row lock.
#[derive(Debug, Clone)]
pub enum BookingWrite {
    Written(Booking),
    Missing,
    /// The stored row no longer matches the copy the changes were built
    /// from (staff, date or lifecycle moved). Carries the current row.
    Stale(Booking),
}

/// Listing filter: a single date or an inclusive range.
#[derive(Debug, Clone, Copy)]
pub struct BookingFilter {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub include_archived: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveBookings {
    pub booking_ids: Vec<DbId>,
}
