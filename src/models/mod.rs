//! Rostering domain models.
//!
//! Provides the data types the engine works on: the closed shift catalog,
//! the six-slot team, the weekly roster grid with its lock set, and the
//! special-day marks.
//!
//! # Domain Mappings
//!
//! | u-roster | Store |
//! |----------|-------|
//! | ShiftCode | Work pattern or day off |
//! | Employee | Team member slot |
//! | Roster | Weekly plan |
//! | LockSet | Hand-fixed cells |

mod roster;
mod shift;
mod special_day;
mod team;
mod window;

pub use roster::{Cell, LockSet, Roster, Weekday, DAY_COUNT};
pub use shift::{opening_time, ShiftCategory, ShiftCode, ShiftInfo};
pub use special_day::{SpecialDayKind, SpecialDays};
pub use team::{Employee, Position, RoleGroup, Team, SLOT_COUNT};
pub use window::{ClockTime, TimeWindow};
