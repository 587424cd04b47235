//! Randomized candidate roster construction.
//!
//! # Algorithm
//!
//! Each call builds one roster from scratch in five phases:
//!
//! 1. **Seed**: copy the current code of every locked cell of an active
//!    employee.
//! 2. **External day**: give one eligible associate the external `A` code on
//!    the configured day, if that cell is still free and the team is large
//!    enough to keep both ends of that day covered without them.
//! 3. **Leave**: give every active employee without a leave day (`B`, or a
//!    manual-only marker) one `B` on a free, unclaimed, non-blocked day.
//! 4. **Pairing backfill**: whoever covers a teammate's leave gets `FULL`,
//!    at most once per week.
//! 5. **Fill**: a few passes over the still-empty cells, drawing uniformly
//!    from the planning pool minus the codes that would break a local rule.
//!
//! Cells that no pass can fill stay empty; the validator reports them.
//! The generator keeps no state between calls beyond the caller's RNG.

use rand::prelude::IndexedRandom;
use rand::Rng;
use tracing::trace;

use crate::config::{ExternalDayPolicy, PlanningConfig};
use crate::models::{
    LockSet, Position, RoleGroup, Roster, ShiftCode, SpecialDays, Team, Weekday, DAY_COUNT,
    SLOT_COUNT,
};

/// Builds candidate rosters for one team.
///
/// # Example
/// ```
/// use u_roster::config::PlanningConfig;
/// use u_roster::generator::ScheduleGenerator;
/// use u_roster::models::Team;
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
///
/// let team = Team::default();
/// let config = PlanningConfig::default();
/// let generator = ScheduleGenerator::new(&team, &config);
/// let roster = generator.generate(&mut SmallRng::seed_from_u64(7));
/// assert_eq!(roster.count(0, u_roster::models::ShiftCode::Leave), 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ScheduleGenerator<'a> {
    team: &'a Team,
    config: &'a PlanningConfig,
    current: Option<&'a Roster>,
    locks: Option<&'a LockSet>,
    special_days: Option<&'a SpecialDays>,
}

/// Attempt-local construction state.
struct Draft {
    roster: Roster,
    hours: [f64; SLOT_COUNT],
}

impl Draft {
    fn assign(&mut self, slot: usize, day: Weekday, code: ShiftCode) {
        let Some(hours) = self.hours.get_mut(slot) else {
            return;
        };
        self.roster.set(slot, day, code);
        *hours += code.net_hours();
    }

    fn on_leave(&self, slot: usize, day: Weekday) -> bool {
        self.roster.get(slot, day) == Some(ShiftCode::Leave)
    }

    fn has_leave_day(&self, slot: usize) -> bool {
        self.roster
            .assigned(slot)
            .any(|(_, c)| c.is_leave_primary() || c.is_manual_only())
    }

    /// Gives `slot` the FULL code on `day` if the cell is free and the
    /// weekly FULL cap is not used up.
    fn try_full(&mut self, slot: usize, day: Weekday) -> bool {
        if !self.roster.is_free(slot, day) || self.roster.contains(slot, ShiftCode::Full) {
            return false;
        }
        self.assign(slot, day, ShiftCode::Full);
        true
    }
}

impl<'a> ScheduleGenerator<'a> {
    /// Creates a generator with no locked cells and no special days.
    pub fn new(team: &'a Team, config: &'a PlanningConfig) -> Self {
        Self {
            team,
            config,
            current: None,
            locks: None,
            special_days: None,
        }
    }

    /// Locked cells keep their code from `current`.
    pub fn with_locks(mut self, current: &'a Roster, locks: &'a LockSet) -> Self {
        self.current = Some(current);
        self.locks = Some(locks);
        self
    }

    pub fn with_special_days(mut self, special_days: &'a SpecialDays) -> Self {
        self.special_days = Some(special_days);
        self
    }

    /// Builds one candidate roster.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Roster {
        let mut draft = Draft {
            roster: Roster::new(),
            hours: [0.0; SLOT_COUNT],
        };

        self.seed_locked(&mut draft);
        self.place_external(&mut draft, rng);
        self.place_leave(&mut draft, rng);
        self.backfill_pairs(&mut draft);
        self.fill(&mut draft, rng);

        trace!(
            unfilled = self
                .team
                .active()
                .map(|e| DAY_COUNT - draft.roster.assigned(e.slot).count())
                .sum::<usize>(),
            "candidate roster built"
        );
        draft.roster
    }

    fn seed_locked(&self, draft: &mut Draft) {
        let (Some(current), Some(locks)) = (self.current, self.locks) else {
            return;
        };
        for cell in locks.iter() {
            if !self.team.is_active(cell.slot) {
                continue;
            }
            if let Some(code) = current.get_cell(cell) {
                draft.assign(cell.slot, cell.day, code);
            }
        }
    }

    fn place_external<R: Rng>(&self, draft: &mut Draft, rng: &mut R) {
        // Without the external employee, an early pair and a late pair must
        // still be on the floor.
        if self.team.active_count() <= 2 * self.config.min_coverage {
            return;
        }
        let eligible = |slot: usize, day: Weekday| draft.roster.is_free(slot, day);
        let candidates: Vec<(usize, Weekday)> = match self.config.external_day {
            ExternalDayPolicy::Disabled => return,
            ExternalDayPolicy::Fixed(day) => self
                .team
                .active()
                .filter(|e| !e.position.is_protected() && eligible(e.slot, day))
                .map(|e| (e.slot, day))
                .collect(),
            ExternalDayPolicy::AnyDay => {
                let slots: Vec<usize> = self
                    .team
                    .active()
                    .filter(|e| !e.position.is_protected())
                    .filter(|e| Weekday::ALL.iter().any(|&d| eligible(e.slot, d)))
                    .map(|e| e.slot)
                    .collect();
                let Some(&slot) = slots.choose(rng) else {
                    return;
                };
                Weekday::ALL
                    .into_iter()
                    .filter(|&d| eligible(slot, d))
                    .map(|d| (slot, d))
                    .collect()
            }
        };

        if let Some(&(slot, day)) = candidates.choose(rng) {
            draft.assign(slot, day, ShiftCode::External);
        }
    }

    fn place_leave<R: Rng>(&self, draft: &mut Draft, rng: &mut R) {
        let mut claimed = [false; 7];
        for slot in 0..SLOT_COUNT {
            for (day, code) in draft.roster.assigned(slot) {
                if code.is_leave_primary() {
                    claimed[day.index()] = true;
                }
            }
        }

        for employee in self.team.active() {
            let slot = employee.slot;
            if draft.has_leave_day(slot) {
                continue;
            }
            let days: Vec<Weekday> = Weekday::ALL
                .into_iter()
                .filter(|&d| {
                    draft.roster.is_free(slot, d)
                        && !claimed[d.index()]
                        && !self.config.leave_blocked_days.contains(&d)
                })
                .collect();
            if let Some(&day) = days.choose(rng) {
                draft.assign(slot, day, ShiftCode::Leave);
                claimed[day.index()] = true;
            }
        }
    }

    fn backfill_pairs(&self, draft: &mut Draft) {
        let manager = self.team.active_slot_of(Position::StoreManager);
        let assistant = self.team.active_slot_of(Position::AssistantManager);

        // Other associates are asked before the protected shift lead.
        let mut staff: Vec<(bool, usize)> = self
            .team
            .active_in(RoleGroup::Staff)
            .map(|e| (e.position.is_protected(), e.slot))
            .collect();
        staff.sort();

        for day in Weekday::ALL {
            if let (Some(a), Some(b)) = (manager, assistant) {
                if draft.on_leave(a, day) {
                    draft.try_full(b, day);
                }
                if draft.on_leave(b, day) {
                    draft.try_full(a, day);
                }
            }

            for &(_, absent) in &staff {
                if !draft.on_leave(absent, day) {
                    continue;
                }
                let covered = staff.iter().any(|&(_, s)| {
                    s != absent && draft.roster.get(s, day) == Some(ShiftCode::Full)
                });
                if covered {
                    continue;
                }
                for &(_, cover) in &staff {
                    if cover != absent && draft.try_full(cover, day) {
                        break;
                    }
                }
            }
        }
    }

    fn fill<R: Rng>(&self, draft: &mut Draft, rng: &mut R) {
        let pool = self.config.fill_pool();
        let suppressed = &self.config.early_suppressed_by;

        for _ in 0..self.config.fill_passes {
            for employee in self.team.active() {
                let slot = employee.slot;
                for day in Weekday::ALL {
                    if !draft.roster.is_free(slot, day) {
                        continue;
                    }
                    let prev = day.prev().and_then(|d| draft.roster.get(slot, d));
                    let next = day.next().and_then(|d| draft.roster.get(slot, d));
                    let no_early = prev.is_some_and(|c| c.is_leave() || c.is_late())
                        || self
                            .special_days
                            .is_some_and(|s| s.any_marked(suppressed, day));
                    let no_late = next.is_some_and(|c| c.is_leave());
                    let budget = self.config.max_weekly_hours - draft.hours[slot];

                    let options: Vec<ShiftCode> = pool
                        .iter()
                        .copied()
                        .filter(|c| !(no_early && c.is_early()))
                        .filter(|c| !(no_late && c.is_late()))
                        .filter(|c| c.net_hours() <= budget)
                        .collect();

                    if let Some(&code) = options.choose(rng) {
                        draft.assign(slot, day, code);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::valid_week;
    use crate::models::{SpecialDayKind, DAY_COUNT};
    use crate::validation::{validate, RuleKind};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn generate_many(
        team: &Team,
        config: &PlanningConfig,
        runs: u64,
        mut check: impl FnMut(&Roster),
    ) {
        let generator = ScheduleGenerator::new(team, config);
        for seed in 0..runs {
            let mut rng = SmallRng::seed_from_u64(seed);
            check(&generator.generate(&mut rng));
        }
    }

    #[test]
    fn test_incomplete_rosters_never_pass() {
        let team = Team::full();
        let config = PlanningConfig::default();
        generate_many(&team, &config, 200, |roster| {
            let complete = team.active().all(|e| roster.is_complete_for(e.slot));
            assert!(complete || !validate(roster, &team, &config).is_empty());
        });
    }

    #[test]
    fn test_one_leave_day_each_never_friday() {
        let team = Team::default();
        let config = PlanningConfig::default();
        generate_many(&team, &config, 100, |roster| {
            let mut days = Vec::new();
            for e in team.active() {
                assert_eq!(roster.count(e.slot, ShiftCode::Leave), 1);
                let (day, _) = roster
                    .assigned(e.slot)
                    .find(|&(_, c)| c == ShiftCode::Leave)
                    .unwrap();
                assert_ne!(day, Weekday::Fri);
                days.push(day);
            }
            days.sort();
            days.dedup();
            assert_eq!(days.len(), 4, "leave days must not collide");
        });
    }

    #[test]
    fn test_external_day_goes_to_associate() {
        let team = Team::full();
        let config = PlanningConfig::default();
        generate_many(&team, &config, 50, |roster| {
            let holders: Vec<usize> = (0..SLOT_COUNT)
                .filter(|&s| roster.contains(s, ShiftCode::External))
                .collect();
            assert_eq!(holders.len(), 1);
            assert!(holders[0] >= 3, "protected slot {} got A", holders[0]);
            assert_eq!(roster.get(holders[0], Weekday::Fri), Some(ShiftCode::External));
        });

        let disabled = PlanningConfig::default().with_external_day(ExternalDayPolicy::Disabled);
        generate_many(&team, &disabled, 50, |roster| {
            assert!(team.active().all(|e| !roster.contains(e.slot, ShiftCode::External)));
        });
    }

    #[test]
    fn test_small_team_keeps_everyone_on_the_floor() {
        // Four people: sending one away on Friday leaves too few to cover
        // both the morning and the evening.
        let team = Team::default();
        for config in [PlanningConfig::default(), PlanningConfig::legacy()] {
            generate_many(&team, &config, 50, |roster| {
                assert!(team.active().all(|e| !roster.contains(e.slot, ShiftCode::External)));
            });
        }

        let team = Team::with_active(&[0, 1, 2, 3, 4]);
        generate_many(&team, &PlanningConfig::default(), 20, |roster| {
            assert!((3..5).any(|s| roster.get(s, Weekday::Fri) == Some(ShiftCode::External)));
        });
    }

    #[test]
    fn test_external_any_day() {
        let team = Team::full();
        let config = PlanningConfig::legacy();
        generate_many(&team, &config, 50, |roster| {
            let holders: Vec<_> = team
                .active()
                .filter(|e| roster.contains(e.slot, ShiftCode::External))
                .collect();
            assert_eq!(holders.len(), 1);
            assert!(!holders[0].position.is_protected());
        });
    }

    #[test]
    fn test_pairing_backfill() {
        let team = Team::default();
        let config = PlanningConfig::default();
        generate_many(&team, &config, 100, |roster| {
            for day in Weekday::ALL {
                let code = |slot| roster.get(slot, day);
                if code(0) == Some(ShiftCode::Leave) {
                    assert_eq!(code(1), Some(ShiftCode::Full));
                }
                if code(1) == Some(ShiftCode::Leave) {
                    assert_eq!(code(0), Some(ShiftCode::Full));
                }
                if code(2) == Some(ShiftCode::Leave) {
                    assert_eq!(code(3), Some(ShiftCode::Full));
                }
                if code(3) == Some(ShiftCode::Leave) {
                    assert_eq!(code(2), Some(ShiftCode::Full));
                }
            }
            for e in team.active() {
                assert!(roster.count(e.slot, ShiftCode::Full) <= 1);
            }
        });
    }

    #[test]
    fn test_fill_respects_hours_and_leave_neighbours() {
        let team = Team::full();
        let config = PlanningConfig::default();
        generate_many(&team, &config, 100, |roster| {
            for e in team.active() {
                assert!(roster.weekly_hours(e.slot) <= config.max_weekly_hours);
                for (day, code) in roster.assigned(e.slot) {
                    if code != ShiftCode::Leave {
                        continue;
                    }
                    if let Some(after) = day.next().and_then(|d| roster.get(e.slot, d)) {
                        assert!(!after.is_early(), "early shift right after leave");
                    }
                    if let Some(before) = day.prev().and_then(|d| roster.get(e.slot, d)) {
                        assert!(!before.is_late(), "late shift right before leave");
                    }
                }
            }
        });
    }

    #[test]
    fn test_delivery_days_suppress_early_shifts() {
        let team = Team::full();
        let config = PlanningConfig::default();
        let special = SpecialDays::new()
            .with(SpecialDayKind::Delivery, Weekday::Tue)
            .with(SpecialDayKind::Delivery, Weekday::Sat)
            .with(SpecialDayKind::Meeting, Weekday::Mon);
        let generator = ScheduleGenerator::new(&team, &config).with_special_days(&special);
        let mut saw_monday_early = false;
        for seed in 0..100 {
            let roster = generator.generate(&mut SmallRng::seed_from_u64(seed));
            for e in team.active() {
                for day in [Weekday::Tue, Weekday::Sat] {
                    assert!(!roster.get(e.slot, day).is_some_and(|c| c.is_early()));
                }
                saw_monday_early |= roster.get(e.slot, Weekday::Mon).is_some_and(|c| c.is_early());
            }
        }
        assert!(saw_monday_early, "meeting days do not suppress early shifts");
    }

    #[test]
    fn test_locked_cells_are_preserved() {
        let (team, current) = valid_week();
        let locks = LockSet::new()
            .with(0, Weekday::Mon)
            .with(2, Weekday::Thu)
            .with(3, Weekday::Sun);
        let config = PlanningConfig::default();
        let generator = ScheduleGenerator::new(&team, &config).with_locks(&current, &locks);
        for seed in 0..100 {
            let roster = generator.generate(&mut SmallRng::seed_from_u64(seed));
            for cell in locks.iter() {
                assert_eq!(roster.get_cell(cell), current.get_cell(cell));
            }
            // M.S. keeps the locked Monday leave and gets no second one.
            assert_eq!(roster.count(0, ShiftCode::Leave), 1);
        }
    }

    #[test]
    fn test_fully_locked_week_is_reproduced() {
        let (team, current) = valid_week();
        let locks = LockSet::whole_weeks(&team.active_slots());
        let config = PlanningConfig::default();
        let generator = ScheduleGenerator::new(&team, &config).with_locks(&current, &locks);
        let roster = generator.generate(&mut SmallRng::seed_from_u64(1));
        assert_eq!(roster, current);
        assert!(validate(&roster, &team, &config).is_empty());
    }

    #[test]
    fn test_locks_of_inactive_slots_are_ignored() {
        let team = Team::default();
        let mut current = Roster::new();
        current.set(5, Weekday::Mon, ShiftCode::Full);
        let locks = LockSet::new().with(5, Weekday::Mon);
        let config = PlanningConfig::default();
        let roster = ScheduleGenerator::new(&team, &config)
            .with_locks(&current, &locks)
            .generate(&mut SmallRng::seed_from_u64(3));
        assert_eq!(roster.week(5), [None; DAY_COUNT]);
    }

    #[test]
    fn test_manual_code_replaces_generated_leave() {
        let team = Team::default();
        let mut current = Roster::new();
        current.set(3, Weekday::Wed, ShiftCode::Report);
        let locks = LockSet::new().with(3, Weekday::Wed);
        let config = PlanningConfig::default();
        let generator = ScheduleGenerator::new(&team, &config).with_locks(&current, &locks);
        for seed in 0..50 {
            let roster = generator.generate(&mut SmallRng::seed_from_u64(seed));
            assert_eq!(roster.count(3, ShiftCode::Leave), 0);
            assert_eq!(roster.get(3, Weekday::Wed), Some(ShiftCode::Report));
        }
    }

    #[test]
    fn test_same_seed_same_roster() {
        let team = Team::full();
        let config = PlanningConfig::default();
        let generator = ScheduleGenerator::new(&team, &config);
        let a = generator.generate(&mut SmallRng::seed_from_u64(42));
        let b = generator.generate(&mut SmallRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_unfillable_cells_stay_empty_and_are_flagged() {
        let team = Team::default();
        let config = PlanningConfig::default().with_weekly_hours(0.0, 10.0);
        let roster = ScheduleGenerator::new(&team, &config).generate(&mut SmallRng::seed_from_u64(5));
        assert!(team.active().any(|e| !roster.is_complete_for(e.slot)));
        let violations = validate(&roster, &team, &config);
        assert!(violations.iter().any(|v| v.kind == RuleKind::UnassignedCell));
        assert!(roster.week(0).iter().flatten().count() < DAY_COUNT);
    }
}
