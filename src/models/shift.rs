//! Shift catalog.
//!
//! The catalog is a closed set of shift codes. Each code carries its net
//! working hours, a category, and (for codes that staff the store) the
//! time-of-day span it covers.
//!
//! # Categories
//!
//! | Category | Codes | Meaning |
//! |----------|-------|---------|
//! | Early | `08.45-…` | Opens the store |
//! | Late | `…-21.15` | Closes the store |
//! | External | `A`, `FULL` | Counts as both early and late for balance |
//! | Leave | `B` | The mandated weekly day off |
//! | Manual | `R`, `Y`, `M` | Leave markers only set by hand |

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::TimeWindow;
use crate::error::RosterError;

/// Shift category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftCategory {
    /// Starts at store opening.
    Early,
    /// Ends at store closing.
    Late,
    /// Off-site or full-coverage work.
    External,
    /// Leave-primary day off.
    Leave,
    /// Manual-only leave marker (report, annual, excuse).
    Manual,
}

/// A shift code from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShiftCode {
    #[serde(rename = "08.45-15.45")]
    Open1545,
    #[serde(rename = "08.45-16.45")]
    Open1645,
    #[serde(rename = "08.45-17.45")]
    Open1745,
    #[serde(rename = "08.45-18.15")]
    Open1815,
    #[serde(rename = "08.45-18.45")]
    Open1845,
    #[serde(rename = "12.15-21.15")]
    Close1215,
    #[serde(rename = "14.15-21.15")]
    Close1415,
    #[serde(rename = "14.45-21.15")]
    Close1445,
    #[serde(rename = "15.45-21.15")]
    Close1545,
    #[serde(rename = "16.45-21.15")]
    Close1645,
    /// External duty; the employee is away and does not cover the store.
    #[serde(rename = "A")]
    External,
    /// Full-coverage day across the whole operating window.
    #[serde(rename = "FULL")]
    Full,
    /// Leave-primary day off.
    #[serde(rename = "B")]
    Leave,
    /// Medical report.
    #[serde(rename = "R")]
    Report,
    /// Annual leave.
    #[serde(rename = "Y")]
    Annual,
    /// Excused absence.
    #[serde(rename = "M")]
    Excuse,
}

/// Static catalog entry for a shift code.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftInfo {
    /// Display label.
    pub label: &'static str,
    /// Net working hours (breaks excluded).
    pub net_hours: f64,
    /// Category.
    pub category: ShiftCategory,
    /// Time-of-day span that counts toward store coverage.
    pub span: Option<TimeWindow>,
}

const fn entry(
    label: &'static str,
    net_hours: f64,
    category: ShiftCategory,
    span: Option<TimeWindow>,
) -> ShiftInfo {
    ShiftInfo {
        label,
        net_hours,
        category,
        span,
    }
}

impl ShiftCode {
    /// Every code in catalog order.
    pub const ALL: [ShiftCode; 16] = [
        ShiftCode::Open1545,
        ShiftCode::Open1645,
        ShiftCode::Open1745,
        ShiftCode::Open1815,
        ShiftCode::Open1845,
        ShiftCode::Close1215,
        ShiftCode::Close1415,
        ShiftCode::Close1445,
        ShiftCode::Close1545,
        ShiftCode::Close1645,
        ShiftCode::External,
        ShiftCode::Full,
        ShiftCode::Leave,
        ShiftCode::Report,
        ShiftCode::Annual,
        ShiftCode::Excuse,
    ];

    /// Catalog lookup.
    pub const fn info(self) -> ShiftInfo {
        use ShiftCategory::*;
        match self {
            ShiftCode::Open1545 => entry("08.45-15.45", 6.0, Early, Some(TimeWindow::hm(8, 45, 15, 45))),
            ShiftCode::Open1645 => entry("08.45-16.45", 7.0, Early, Some(TimeWindow::hm(8, 45, 16, 45))),
            ShiftCode::Open1745 => entry("08.45-17.45", 7.5, Early, Some(TimeWindow::hm(8, 45, 17, 45))),
            ShiftCode::Open1815 => entry("08.45-18.15", 8.0, Early, Some(TimeWindow::hm(8, 45, 18, 15))),
            ShiftCode::Open1845 => entry("08.45-18.45", 8.5, Early, Some(TimeWindow::hm(8, 45, 18, 45))),
            ShiftCode::Close1215 => entry("12.15-21.15", 7.5, Late, Some(TimeWindow::hm(12, 15, 21, 15))),
            ShiftCode::Close1415 => entry("14.15-21.15", 6.0, Late, Some(TimeWindow::hm(14, 15, 21, 15))),
            ShiftCode::Close1445 => entry("14.45-21.15", 5.5, Late, Some(TimeWindow::hm(14, 45, 21, 15))),
            ShiftCode::Close1545 => entry("15.45-21.15", 5.0, Late, Some(TimeWindow::hm(15, 45, 21, 15))),
            ShiftCode::Close1645 => entry("16.45-21.15", 4.0, Late, Some(TimeWindow::hm(16, 45, 21, 15))),
            ShiftCode::External => entry("A", 9.0, External, None),
            ShiftCode::Full => entry("FULL", 11.0, External, Some(TimeWindow::hm(8, 45, 21, 15))),
            ShiftCode::Leave => entry("B", 0.0, Leave, None),
            ShiftCode::Report => entry("R", 0.0, Manual, None),
            ShiftCode::Annual => entry("Y", 0.0, Manual, None),
            ShiftCode::Excuse => entry("M", 0.0, Manual, None),
        }
    }

    /// Display label.
    #[inline]
    pub fn label(self) -> &'static str {
        self.info().label
    }

    /// Net working hours.
    #[inline]
    pub fn net_hours(self) -> f64 {
        self.info().net_hours
    }

    /// Category.
    #[inline]
    pub fn category(self) -> ShiftCategory {
        self.info().category
    }

    /// Coverage span, if the code staffs the store.
    #[inline]
    pub fn span(self) -> Option<TimeWindow> {
        self.info().span
    }

    pub fn is_early(self) -> bool {
        self.category() == ShiftCategory::Early
    }

    pub fn is_late(self) -> bool {
        self.category() == ShiftCategory::Late
    }

    pub fn is_external(self) -> bool {
        self.category() == ShiftCategory::External
    }

    /// Any day-off marker: the leave-primary code or a manual-only one.
    pub fn is_leave(self) -> bool {
        matches!(self.category(), ShiftCategory::Leave | ShiftCategory::Manual)
    }

    /// The single mandated weekly day off.
    pub fn is_leave_primary(self) -> bool {
        self == ShiftCode::Leave
    }

    /// Codes that only ever appear through locked cells.
    pub fn is_manual_only(self) -> bool {
        self.category() == ShiftCategory::Manual
    }

    /// Whether the employee is working (net hours above zero).
    pub fn is_working(self) -> bool {
        self.net_hours() > 0.0
    }

    /// Whether the code starts at the earliest catalog start time.
    ///
    /// Only early-category codes open the store; `FULL` is a coverage code.
    pub fn is_opening(self) -> bool {
        self.is_early()
            && matches!(
                (self.span(), opening_time()),
                (Some(span), Some(open)) if span.start_min == open
            )
    }

    /// Codes eligible for automatic assignment in the fill phase.
    ///
    /// Excludes leave, external, full-coverage and manual-only codes.
    pub fn planning_codes() -> Vec<ShiftCode> {
        Self::ALL
            .into_iter()
            .filter(|c| c.is_early() || c.is_late())
            .collect()
    }

    /// Codes that may only be set by hand.
    pub fn manual_codes() -> Vec<ShiftCode> {
        Self::ALL.into_iter().filter(|c| c.is_manual_only()).collect()
    }
}

/// Earliest start time across the catalog (minutes since midnight).
pub fn opening_time() -> Option<u32> {
    ShiftCode::ALL
        .iter()
        .filter_map(|c| c.span())
        .map(|s| s.start_min)
        .min()
}

impl fmt::Display for ShiftCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ShiftCode {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        ShiftCode::ALL
            .into_iter()
            .find(|c| c.label() == trimmed)
            .ok_or_else(|| RosterError::UnknownShiftCode(s.to_string()))
    }
}
