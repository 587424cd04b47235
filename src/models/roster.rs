//! Weekly roster grid.
//!
//! A roster maps (employee slot, weekday) to an optional shift code.
//! `None` means the cell has not been assigned yet; a roster built for an
//! attempt may keep `None` cells, which the validator reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::team::SLOT_COUNT;
use super::ShiftCode;

/// Number of days in a planning week.
pub const DAY_COUNT: usize = 7;

/// Day of the planning week, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Weekday {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl Weekday {
    /// Every day in week order.
    pub const ALL: [Weekday; DAY_COUNT] = [
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
        Weekday::Sun,
    ];

    /// Zero-based index (Monday = 0).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Previous day within the same week.
    pub fn prev(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// Next day within the same week.
    pub fn next(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single roster cell address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub slot: usize,
    pub day: Weekday,
}

impl Cell {
    pub fn new(slot: usize, day: Weekday) -> Self {
        Self { slot, day }
    }
}

/// Slot × day grid of shift codes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    cells: [[Option<ShiftCode>; DAY_COUNT]; SLOT_COUNT],
}

impl Roster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a roster from full weeks, one row per slot starting at slot 0.
    ///
    /// Rows beyond the slot count are ignored.
    pub fn from_rows(rows: &[[ShiftCode; DAY_COUNT]]) -> Self {
        let mut roster = Self::new();
        for (slot, row) in rows.iter().enumerate().take(SLOT_COUNT) {
            roster.set_week(slot, *row);
        }
        roster
    }

    pub fn get(&self, slot: usize, day: Weekday) -> Option<ShiftCode> {
        self.cells.get(slot).and_then(|row| row[day.index()])
    }

    pub fn get_cell(&self, cell: Cell) -> Option<ShiftCode> {
        self.get(cell.slot, cell.day)
    }

    /// Sets a cell. Out-of-range slots are ignored.
    pub fn set(&mut self, slot: usize, day: Weekday, code: ShiftCode) {
        if let Some(row) = self.cells.get_mut(slot) {
            row[day.index()] = Some(code);
        }
    }

    /// Clears a cell back to unassigned.
    pub fn clear(&mut self, slot: usize, day: Weekday) {
        if let Some(row) = self.cells.get_mut(slot) {
            row[day.index()] = None;
        }
    }

    pub fn is_free(&self, slot: usize, day: Weekday) -> bool {
        self.get(slot, day).is_none()
    }

    /// Replaces a slot's whole week.
    pub fn set_week(&mut self, slot: usize, week: [ShiftCode; DAY_COUNT]) {
        if let Some(row) = self.cells.get_mut(slot) {
            *row = week.map(Some);
        }
    }

    /// A slot's week, empty for out-of-range slots.
    pub fn week(&self, slot: usize) -> [Option<ShiftCode>; DAY_COUNT] {
        self.cells.get(slot).copied().unwrap_or_default()
    }

    /// Iterates a slot's assigned codes with their days.
    pub fn assigned(&self, slot: usize) -> impl Iterator<Item = (Weekday, ShiftCode)> {
        let week = self.week(slot);
        Weekday::ALL
            .into_iter()
            .filter_map(move |d| week[d.index()].map(|c| (d, c)))
    }

    /// How many times a slot holds `code` this week.
    pub fn count(&self, slot: usize, code: ShiftCode) -> usize {
        self.assigned(slot).filter(|&(_, c)| c == code).count()
    }

    pub fn contains(&self, slot: usize, code: ShiftCode) -> bool {
        self.count(slot, code) > 0
    }

    /// Sum of net hours over a slot's assigned cells.
    pub fn weekly_hours(&self, slot: usize) -> f64 {
        self.assigned(slot).map(|(_, c)| c.net_hours()).sum()
    }

    /// Whether all seven cells of the slot are assigned.
    pub fn is_complete_for(&self, slot: usize) -> bool {
        self.week(slot).iter().all(Option::is_some)
    }
}

/// Cells whose current code is fixed input for generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSet {
    cells: BTreeSet<Cell>,
}

impl LockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks every cell of the given slots.
    pub fn whole_weeks(slots: &[usize]) -> Self {
        let mut locks = Self::new();
        for &slot in slots {
            for day in Weekday::ALL {
                locks.lock(Cell::new(slot, day));
            }
        }
        locks
    }

    pub fn with(mut self, slot: usize, day: Weekday) -> Self {
        self.lock(Cell::new(slot, day));
        self
    }

    /// Returns `true` if the cell was newly locked.
    pub fn lock(&mut self, cell: Cell) -> bool {
        self.cells.insert(cell)
    }

    /// Returns `true` if the cell was locked.
    pub fn unlock(&mut self, cell: Cell) -> bool {
        self.cells.remove(&cell)
    }

    /// Merges another set (e.g. edits collected before locking).
    pub fn extend(&mut self, other: &LockSet) {
        self.cells.extend(other.cells.iter().copied());
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn is_locked(&self, slot: usize, day: Weekday) -> bool {
        self.cells.contains(&Cell::new(slot, day))
    }

    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
