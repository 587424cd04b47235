//! Special-day marks.
//!
//! Store events that fall on particular weekdays. Some kinds (by default
//! delivery days) suppress early shifts during generation.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::Weekday;

/// Kind of store event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialDayKind {
    Meeting,
    Delivery,
    TasteTest,
    FlyerDistribution,
}

/// Event kind → marked weekdays.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialDays {
    marks: BTreeMap<SpecialDayKind, BTreeSet<Weekday>>,
}

impl SpecialDays {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a day.
    pub fn with(mut self, kind: SpecialDayKind, day: Weekday) -> Self {
        self.mark(kind, day);
        self
    }

    pub fn mark(&mut self, kind: SpecialDayKind, day: Weekday) {
        self.marks.entry(kind).or_default().insert(day);
    }

    pub fn unmark(&mut self, kind: SpecialDayKind, day: Weekday) {
        if let Some(days) = self.marks.get_mut(&kind) {
            days.remove(&day);
            if days.is_empty() {
                self.marks.remove(&kind);
            }
        }
    }

    pub fn is_marked(&self, kind: SpecialDayKind, day: Weekday) -> bool {
        self.marks.get(&kind).is_some_and(|d| d.contains(&day))
    }

    /// Whether the day carries any of the given kinds.
    pub fn any_marked(&self, kinds: &[SpecialDayKind], day: Weekday) -> bool {
        kinds.iter().any(|&k| self.is_marked(k, day))
    }

    pub fn days(&self, kind: SpecialDayKind) -> impl Iterator<Item = Weekday> + '_ {
        self.marks.get(&kind).into_iter().flatten().copied()
    }
}
