//! Time-of-day parsing and the wraparound-aware [`TimeWindow`].
//!
//! Times are wall-clock-of-day values with second precision. A window whose
//! end is earlier than its start crosses midnight (e.g. `22:00 -> 06:00`).

use chrono::{NaiveTime, Timelike};
use serde::Serialize;

use crate::error::CoreError;

/// Canonical textual form for a time of day.
pub const TIME_FORMAT: &str = "%H:%M:%S";

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Parse `H:MM`, `HH:MM` or `HH:MM:SS` into a [`NaiveTime`].
///
/// A bare `HH:MM` is treated as `HH:MM:00`.
pub fn parse_time_of_day(input: &str) -> Result<NaiveTime, CoreError> {
    let trimmed = input.trim();
    let parts: Vec<&str> = trimmed.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return Err(invalid_time(input));
    }

    let mut fields = [0u32; 3];
    for (i, part) in parts.iter().enumerate() {
        // Minutes and seconds must be two digits; hours may be one.
        let valid_len = if i == 0 {
            (1..=2).contains(&part.len())
        } else {
            part.len() == 2
        };
        if !valid_len || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid_time(input));
        }
        fields[i] = part.parse().map_err(|_| invalid_time(input))?;
    }

    NaiveTime::from_hms_opt(fields[0], fields[1], fields[2]).ok_or_else(|| invalid_time(input))
}

/// Render a time of day as `HH:MM:SS`.
pub fn format_time_of_day(time: NaiveTime) -> String {
    time.format(TIME_FORMAT).to_string()
}

/// Drop sub-second precision so clock readings compare cleanly with
/// configured window boundaries.
pub fn truncate_to_seconds(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}

fn invalid_time(input: &str) -> CoreError {
    CoreError::Validation(format!(
        "Invalid time of day '{input}'. Expected HH:MM or HH:MM:SS"
    ))
}

/// Reject booking ranges that are empty or reversed.
///
/// Bookings never wrap past midnight, so `start < end` is required.
pub fn validate_booking_range(start: NaiveTime, end: NaiveTime) -> Result<(), CoreError> {
    if start < end {
        Ok(())
    } else {
        Err(CoreError::InvalidTimeRange(format!(
            "booking start {} must be before end {}",
            format_time_of_day(start),
            format_time_of_day(end)
        )))
    }
}

/// An inclusive time-of-day interval that may wrap past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    #[serde(with = "serde_time_of_day")]
    pub start: NaiveTime,
    #[serde(with = "serde_time_of_day")]
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Build a window, rejecting zero-length ones (`start == end`), which
    /// would be ambiguous between "never" and "all day".
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, CoreError> {
        if start == end {
            return Err(CoreError::InvalidTimeRange(format!(
                "shift window start and end are both {}",
                format_time_of_day(start)
            )));
        }
        Ok(Self { start, end })
    }

    /// Build a window without validation. Stored rows are trusted.
    pub fn from_bounds(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether the window crosses midnight.
    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    /// Inclusive containment test.
    ///
    /// - Non-wrapping: `start <= t <= end`.
    /// - Wrapping: `t >= start || t <= end`.
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.wraps() {
            time >= self.start || time <= self.end
        } else {
            self.start <= time && time <= self.end
        }
    }

    /// Length of the window in whole minutes, accounting for wraparound.
    pub fn duration_minutes(&self) -> i64 {
        let start = minutes_of_day(self.start);
        let end = minutes_of_day(self.end);
        if self.wraps() {
            MINUTES_PER_DAY - start + end
        } else {
            end - start
        }
    }
}

fn minutes_of_day(time: NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight()) / 60
}

/// Serde adapter that writes `HH:MM:SS` and accepts `HH:MM` or `HH:MM:SS`.
pub mod serde_time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time_of_day(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_time_of_day(&raw).map_err(serde::de::Error::custom)
    }
}

/// Optional variant of [`serde_time_of_day`] for patch DTOs.
pub mod serde_opt_time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => serializer.serialize_some(&super::format_time_of_day(*t)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|s| super::parse_time_of_day(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn t(s: &str) -> NaiveTime {
        parse_time_of_day(s).unwrap()
    }

    #[test]
    fn parses_bare_hours_and_minutes_with_zero_seconds() {
        assert_eq!(t("06:00"), NaiveTime::from_hms_opt(6, 0, 0).unwrap());
        assert_eq!(t("6:30"), NaiveTime::from_hms_opt(6, 30, 0).unwrap());
        assert_eq!(format_time_of_day(t("22:15")), "22:15:00");
    }

    #[test]
    fn parses_full_time() {
        assert_eq!(t("23:59:59"), NaiveTime::from_hms_opt(23, 59, 59).unwrap());
    }

    #[test]
    fn rejects_malformed_times() {
        for bad in ["", "6", "24:00", "12:60", "12:5", "ab:cd", "12:00:00:00", "-1:00"] {
            assert_matches!(
                parse_time_of_day(bad),
                Err(CoreError::Validation(_)),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn non_wrapping_contains_is_inclusive() {
        let w = TimeWindow::new(t("06:00"), t("14:00")).unwrap();
        assert!(!w.wraps());
        assert!(w.contains(t("06:00")));
        assert!(w.contains(t("10:00")));
        assert!(w.contains(t("14:00")));
        assert!(!w.contains(t("05:59:59")));
        assert!(!w.contains(t("14:00:01")));
    }

    #[test]
    fn wrapping_window_covers_both_sides_of_midnight() {
        let w = TimeWindow::new(t("20:00"), t("04:00")).unwrap();
        assert!(w.wraps());
        for inside in ["20:00", "23:59:59", "00:00", "03:00", "04:00"] {
            assert!(w.contains(t(inside)), "{inside} should be inside");
        }
        for outside in ["04:00:01", "12:00", "19:59:59"] {
            assert!(!w.contains(t(outside)), "{outside} should be outside");
        }
    }

    #[test]
    fn exhaustive_minute_grid_matches_definition() {
        let w = TimeWindow::new(t("20:00"), t("04:00")).unwrap();
        for minute in 0..MINUTES_PER_DAY {
            let time = NaiveTime::from_hms_opt((minute / 60) as u32, (minute % 60) as u32, 0).unwrap();
            let expected = time >= t("20:00") || time <= t("04:00");
            assert_eq!(w.contains(time), expected, "mismatch at {time}");
        }
    }

    #[test]
    fn zero_length_window_is_rejected() {
        assert_matches!(
            TimeWindow::new(t("08:00"), t("08:00")),
            Err(CoreError::InvalidTimeRange(_))
        );
    }

    #[test]
    fn duration_accounts_for_wraparound() {
        assert_eq!(TimeWindow::new(t("06:00"), t("14:00")).unwrap().duration_minutes(), 480);
        assert_eq!(TimeWindow::new(t("22:00"), t("06:00")).unwrap().duration_minutes(), 480);
    }

    #[test]
    fn booking_range_requires_start_before_end() {
        assert!(validate_booking_range(t("10:00"), t("11:00")).is_ok());
        assert_matches!(
            validate_booking_range(t("11:00"), t("11:00")),
            Err(CoreError::InvalidTimeRange(_))
        );
        assert_matches!(
            validate_booking_range(t("23:00"), t("01:00")),
            Err(CoreError::InvalidTimeRange(_))
        );
    }

    #[test]
    fn truncation_drops_nanoseconds() {
        let precise = NaiveTime::from_hms_nano_opt(9, 30, 15, 123_456_789).unwrap();
        assert_eq!(truncate_to_seconds(precise), t("09:30:15"));
    }
}
