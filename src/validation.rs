//! Roster rule validation.
//!
//! Checks a weekly roster against the store's labor-balance and coverage
//! rules. Every rule is evaluated on every call; nothing short-circuits.
//! Detects:
//! - Unassigned cells of active employees
//! - Too many people on leave, or opening the store, on one day
//! - Missing early/late balance inside a role group
//! - Weekly hours outside the configured range
//! - Wrong leave-day or FULL-day counts
//! - Leave days without an early shift before and a late shift after
//! - Manager and staff pairing around leave days
//! - Fewer than the required staff on the floor at any time of day
//!
//! Only active employees are considered. The result is ordered (per-day
//! rules, then per-employee, then pairing, then coverage) and
//! de-duplicated by message text.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::config::PlanningConfig;
use crate::error::RosterError;
use crate::models::{Employee, Position, RoleGroup, Roster, ShiftCode, Team, Weekday};

/// A rule violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Which rule failed.
    pub kind: RuleKind,
    /// Day involved, if the rule is day-scoped.
    pub day: Option<Weekday>,
    /// Employee slot involved, if the rule is employee-scoped.
    pub slot: Option<usize>,
    /// Human-readable description.
    pub message: String,
}

/// Roster rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// An active employee's cell has no shift.
    UnassignedCell,
    /// Too many employees on leave-primary the same day.
    DailyLeaveCap,
    /// Too many employees on an opening shift the same day.
    OpeningShiftCap,
    /// A working role group lacks an early or a late shift.
    EarlyLateBalance,
    /// Weekly hours above the maximum.
    WeeklyHoursAbove,
    /// Weekly hours below the minimum.
    WeeklyHoursBelow,
    /// Not exactly one leave-primary day in the week.
    WeeklyLeaveCount,
    /// More than one FULL day in the week.
    FullCoverageCap,
    /// Leave day not framed by an early day before and a late day after.
    LeaveAdjacency,
    /// Manager pair breaks the leave/FULL pairing.
    ManagerPairing,
    /// Staff group breaks the leave/FULL pairing.
    StaffPairing,
    /// Fewer employees on the floor than required.
    Coverage,
}

impl Violation {
    fn new(kind: RuleKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            day: None,
            slot: None,
            message: message.into(),
        }
    }

    fn on(mut self, day: Weekday) -> Self {
        self.day = Some(day);
        self
    }

    fn of(mut self, slot: usize) -> Self {
        self.slot = Some(slot);
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Validates a roster.
///
/// Pure: the same roster, team and configuration always yield the same
/// list. An empty list means the roster is acceptable.
pub fn validate(roster: &Roster, team: &Team, config: &PlanningConfig) -> Vec<Violation> {
    let mut out = Vec::new();

    for day in Weekday::ALL {
        check_daily_caps(roster, team, config, day, &mut out);
        check_group_balance(roster, team, day, RoleGroup::Manager, &mut out);
        check_group_balance(roster, team, day, RoleGroup::Staff, &mut out);
    }

    for employee in team.active() {
        check_employee_week(roster, employee, config, &mut out);
    }

    for day in Weekday::ALL {
        check_manager_pairing(roster, team, day, &mut out);
        check_staff_pairing(roster, team, day, &mut out);
    }

    for day in Weekday::ALL {
        check_coverage(roster, team, config, day, &mut out);
    }

    dedup_by_message(out)
}

/// Pre-export check: `Ok(())` only when no rule fails.
pub fn ensure_valid(roster: &Roster, team: &Team, config: &PlanningConfig) -> Result<(), RosterError> {
    let violations = validate(roster, team, config);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(RosterError::RuleViolations(violations))
    }
}

fn dedup_by_message(violations: Vec<Violation>) -> Vec<Violation> {
    let mut seen = HashSet::new();
    violations
        .into_iter()
        .filter(|v| seen.insert(v.message.clone()))
        .collect()
}

/// Codes held by active employees on a day.
fn day_codes<'a>(
    roster: &'a Roster,
    team: &'a Team,
    day: Weekday,
) -> impl Iterator<Item = (&'a Employee, ShiftCode)> + 'a {
    team.active()
        .filter_map(move |e| roster.get(e.slot, day).map(|c| (e, c)))
}

fn check_daily_caps(
    roster: &Roster,
    team: &Team,
    config: &PlanningConfig,
    day: Weekday,
    out: &mut Vec<Violation>,
) {
    let on_leave = day_codes(roster, team, day)
        .filter(|(_, c)| c.is_leave_primary())
        .count();
    if on_leave > config.max_daily_leave {
        out.push(
            Violation::new(
                RuleKind::DailyLeaveCap,
                format!(
                    "{day}: at most {} employee(s) may be on leave (B) per day, found {on_leave}.",
                    config.max_daily_leave
                ),
            )
            .on(day),
        );
    }

    let opening = day_codes(roster, team, day)
        .filter(|(_, c)| c.is_opening())
        .count();
    if opening > config.max_opening_shifts {
        out.push(
            Violation::new(
                RuleKind::OpeningShiftCap,
                format!(
                    "{day}: at most {} employees may work the opening shift (found {opening}).",
                    config.max_opening_shifts
                ),
            )
            .on(day),
        );
    }
}

fn check_group_balance(
    roster: &Roster,
    team: &Team,
    day: Weekday,
    group: RoleGroup,
    out: &mut Vec<Violation>,
) {
    let codes: Vec<ShiftCode> = day_codes(roster, team, day)
        .filter(|(e, _)| e.group() == group)
        .map(|(_, c)| c)
        .collect();

    if !codes.iter().any(|c| c.is_working()) {
        return;
    }
    let has_early = codes.iter().any(|c| c.is_early() || c.is_external());
    let has_late = codes.iter().any(|c| c.is_late() || c.is_external());
    if !has_early || !has_late {
        let name = match group {
            RoleGroup::Manager => "manager",
            RoleGroup::Staff => "staff",
        };
        out.push(
            Violation::new(
                RuleKind::EarlyLateBalance,
                format!("{day}: the {name} group needs both an early and a late shift."),
            )
            .on(day),
        );
    }
}

fn check_employee_week(
    roster: &Roster,
    employee: &Employee,
    config: &PlanningConfig,
    out: &mut Vec<Violation>,
) {
    let slot = employee.slot;
    let name = employee.display_name();
    let week = roster.week(slot);

    for day in Weekday::ALL {
        if week[day.index()].is_none() {
            out.push(
                Violation::new(
                    RuleKind::UnassignedCell,
                    format!("{name} ({day}): no shift assigned."),
                )
                .on(day)
                .of(slot),
            );
        }
    }

    let hours = roster.weekly_hours(slot);
    if hours > config.max_weekly_hours {
        out.push(
            Violation::new(
                RuleKind::WeeklyHoursAbove,
                format!(
                    "{name}: weekly hour limit ({}) exceeded ({hours:.1}).",
                    config.max_weekly_hours
                ),
            )
            .of(slot),
        );
    }
    if hours < config.min_weekly_hours {
        out.push(
            Violation::new(
                RuleKind::WeeklyHoursBelow,
                format!(
                    "{name}: weekly minimum hours ({}) not reached ({hours:.1}).",
                    config.min_weekly_hours
                ),
            )
            .of(slot),
        );
    }

    let leave_days = roster.count(slot, ShiftCode::Leave);
    let has_manual = roster.assigned(slot).any(|(_, c)| c.is_manual_only());
    if leave_days == 0 && !has_manual {
        out.push(
            Violation::new(
                RuleKind::WeeklyLeaveCount,
                format!("{name}: must take one leave day (B) per week."),
            )
            .of(slot),
        );
    }
    if leave_days > 1 {
        out.push(
            Violation::new(
                RuleKind::WeeklyLeaveCount,
                format!("{name}: cannot take more than one leave day (B) per week ({leave_days})."),
            )
            .of(slot),
        );
    }

    let full_days = roster.count(slot, ShiftCode::Full);
    if full_days > 1 {
        out.push(
            Violation::new(
                RuleKind::FullCoverageCap,
                format!("{name}: cannot work more than one FULL day per week ({full_days})."),
            )
            .of(slot),
        );
    }

    for day in Weekday::ALL {
        if week[day.index()] != Some(ShiftCode::Leave) {
            continue;
        }
        if let Some(prev) = day.prev() {
            let ok = week[prev.index()].is_some_and(|c| c.is_early() || c.is_leave());
            if !ok {
                out.push(
                    Violation::new(
                        RuleKind::LeaveAdjacency,
                        format!("{name} ({day}): the day before leave must be an early shift."),
                    )
                    .on(day)
                    .of(slot),
                );
            }
        }
        if let Some(next) = day.next() {
            let after = week[next.index()];
            if !after.is_some_and(|c| c.is_late() || c.is_leave()) {
                out.push(
                    Violation::new(
                        RuleKind::LeaveAdjacency,
                        format!("{name} ({day}): the day after leave must be a late shift."),
                    )
                    .on(day)
                    .of(slot),
                );
            }
            if after == Some(ShiftCode::External) {
                out.push(
                    Violation::new(
                        RuleKind::LeaveAdjacency,
                        format!("{name} ({next}): no 'A' shift right after leave."),
                    )
                    .on(next)
                    .of(slot),
                );
            }
        }
    }
}

fn check_manager_pairing(roster: &Roster, team: &Team, day: Weekday, out: &mut Vec<Violation>) {
    let (Some(a), Some(b)) = (
        team.active_slot_of(Position::StoreManager),
        team.active_slot_of(Position::AssistantManager),
    ) else {
        return;
    };
    let a_code = roster.get(a, day);
    let b_code = roster.get(b, day);
    let a_label = Position::StoreManager.label();
    let b_label = Position::AssistantManager.label();
    let leave = Some(ShiftCode::Leave);
    let full = Some(ShiftCode::Full);

    let mut push = |message: String| {
        out.push(Violation::new(RuleKind::ManagerPairing, message).on(day));
    };

    if a_code == leave && b_code != full {
        push(format!(
            "Manager group ({day}): when {a_label} is on leave (B), {b_label} must work FULL (now: {}).",
            label_or_empty(b_code)
        ));
    }
    if b_code == leave && a_code != full {
        push(format!(
            "Manager group ({day}): when {b_label} is on leave (B), {a_label} must work FULL (now: {}).",
            label_or_empty(a_code)
        ));
    }
    if a_code == leave && b_code == leave {
        push(format!(
            "Manager group ({day}): {a_label} and {b_label} cannot be on leave (B) at the same time."
        ));
    }
    if a_code == full && b_code == full {
        push(format!(
            "Manager group ({day}): {a_label} and {b_label} cannot both work FULL."
        ));
    }
}

fn check_staff_pairing(roster: &Roster, team: &Team, day: Weekday, out: &mut Vec<Violation>) {
    let codes: Vec<ShiftCode> = day_codes(roster, team, day)
        .filter(|(e, _)| e.group() == RoleGroup::Staff)
        .map(|(_, c)| c)
        .collect();
    let on_leave = codes.iter().filter(|c| c.is_leave_primary()).count();
    let on_full = codes.iter().filter(|&&c| c == ShiftCode::Full).count();

    if on_leave > 0 && on_full == 0 {
        out.push(
            Violation::new(
                RuleKind::StaffPairing,
                format!(
                    "Staff group ({day}): when a staff member is on leave (B), another must work FULL ({on_leave} on leave, 0 FULL)."
                ),
            )
            .on(day),
        );
    }
    if on_leave > 1 {
        out.push(
            Violation::new(
                RuleKind::StaffPairing,
                format!("Staff group ({day}): more than one staff member cannot be on leave (B) at once."),
            )
            .on(day),
        );
    }
}

fn check_coverage(
    roster: &Roster,
    team: &Team,
    config: &PlanningConfig,
    day: Weekday,
    out: &mut Vec<Violation>,
) {
    let spans: Vec<_> = day_codes(roster, team, day)
        .filter_map(|(_, c)| c.span())
        .collect();

    for slice in config.operating_window.slices(config.coverage_step_min) {
        let on_floor = spans.iter().filter(|s| s.overlaps(&slice)).count();
        if on_floor < config.min_coverage {
            out.push(
                Violation::new(
                    RuleKind::Coverage,
                    format!(
                        "{day} {slice}: at least {} employees must be in the store (found {on_floor}).",
                        config.min_coverage
                    ),
                )
                .on(day),
            );
        }
    }
}

fn label_or_empty(code: Option<ShiftCode>) -> &'static str {
    code.map_or("empty", ShiftCode::label)
}
