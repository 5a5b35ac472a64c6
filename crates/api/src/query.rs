//! Shared query parameter types for API handlers.

use chrono::NaiveDate;
use serde::Deserialize;
use turnero_core::error::CoreError;
use turnero_core::types::DbId;

/// `?date=` for one day, or `?from=&to=` for an inclusive range.
#[derive(Debug, Deserialize)]
pub struct DateRangeParams {
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRangeParams {
    /// Resolve to `(from, to)`. `date` wins over a range; a half-open range
    /// collapses to the single day given.
    pub fn resolve(&self) -> Result<(NaiveDate, NaiveDate), CoreError> {
        let (from, to) = match (self.date, self.from, self.to) {
            (Some(date), _, _) => (date, date),
            (None, Some(from), Some(to)) => (from, to),
            (None, Some(day), None) | (None, None, Some(day)) => (day, day),
            (None, None, None) => {
                return Err(CoreError::Validation(
                    "Either date or from/to is required".into(),
                ))
            }
        };
        if from > to {
            return Err(CoreError::Validation(format!(
                "from ({from}) must not be after to ({to})"
            )));
        }
        Ok((from, to))
    }
}

/// Booking listing filter. Kept flat: `serde_urlencoded` cannot feed
/// non-string values through `#[serde(flatten)]`.
#[derive(Debug, Deserialize)]
pub struct BookingListParams {
    pub date: Option<NaiveDate>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    #[serde(default)]
    pub include_archived: bool,
}

impl BookingListParams {
    pub fn range(&self) -> DateRangeParams {
        DateRangeParams {
            date: self.date,
            from: self.from,
            to: self.to,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ShiftDayParams {
    pub date: NaiveDate,
    pub shift_window_id: DbId,
}

#[derive(Debug, Deserialize)]
pub struct ResolveParams {
    /// `HH:MM` or `HH:MM:SS`; defaults to the server's local time.
    pub at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityFilter {
    pub availability: Option<String>,
}
