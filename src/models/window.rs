//! Time-of-day windows.
//!
//! Shift spans and the store's operating window are expressed as
//! minutes since midnight. All windows are half-open: `[start, end)`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A time-of-day interval [start, end) in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Interval start (minutes, inclusive).
    pub start_min: u32,
    /// Interval end (minutes, exclusive).
    pub end_min: u32,
}

impl TimeWindow {
    /// Creates a new window from minute offsets.
    pub const fn new(start_min: u32, end_min: u32) -> Self {
        Self { start_min, end_min }
    }

    /// Creates a window from `HH:MM` clock parts.
    pub const fn hm(start_h: u32, start_m: u32, end_h: u32, end_m: u32) -> Self {
        Self::new(start_h * 60 + start_m, end_h * 60 + end_m)
    }

    /// Duration of this window (minutes).
    #[inline]
    pub fn duration_min(&self) -> u32 {
        self.end_min.saturating_sub(self.start_min)
    }

    /// Whether the window has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end_min <= self.start_min
    }

    /// Whether a minute offset falls within this window.
    #[inline]
    pub fn contains(&self, minute: u32) -> bool {
        minute >= self.start_min && minute < self.end_min
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_min < other.end_min && other.start_min < self.end_min
    }

    /// Splits the window into consecutive sub-windows of `step_min` minutes.
    ///
    /// The last sub-window is clipped to the window end. A zero step yields
    /// nothing.
    pub fn slices(&self, step_min: u32) -> impl Iterator<Item = TimeWindow> + '_ {
        let step = step_min.max(1);
        let count = if step_min == 0 {
            0
        } else {
            self.duration_min().div_ceil(step)
        };
        (0..count).map(move |i| {
            let start = self.start_min + i * step;
            TimeWindow::new(start, (start + step).min(self.end_min))
        })
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            ClockTime(self.start_min),
            ClockTime(self.end_min)
        )
    }
}

/// A minute offset rendered as `HH.MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime(pub u32);

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}.{:02}", self.0 / 60, self.0 % 60)
    }
}
