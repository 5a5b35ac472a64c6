//! Clock-time to shift resolution.
//!
//! Callers load a tenant's active windows already sorted by display order
//! (`sort_order ASC, name ASC`); resolution walks them in that order and the
//! first window containing the time wins. Overlaps are not rejected here.

use chrono::NaiveTime;

use crate::time_window::TimeWindow;

/// Anything that carries a shift time window.
pub trait Windowed {
    fn time_window(&self) -> TimeWindow;

    /// Inactive windows are skipped by resolution.
    fn is_active(&self) -> bool {
        true
    }
}

impl Windowed for TimeWindow {
    fn time_window(&self) -> TimeWindow {
        *self
    }
}

/// Return the first active window (in the given order) containing `time`.
///
/// `None` means no shift is running at that time, which is a normal state
/// rather than an error.
pub fn resolve<W: Windowed>(windows: &[W], time: NaiveTime) -> Option<&W> {
    windows
        .iter()
        .filter(|w| w.is_active())
        .find(|w| w.time_window().contains(time))
}

/// Resolve the shift for an explicit time of day, such as a booking start.
///
/// Unlike [`resolve`], a miss falls back to the first active window so a
/// booking always lands in some shift when any is configured. Do not reuse
/// this fallback for "current shift" lookups.
pub fn resolve_at<W: Windowed>(windows: &[W], time: NaiveTime) -> Option<&W> {
    resolve(windows, time).or_else(|| windows.iter().find(|w| w.is_active()))
}
