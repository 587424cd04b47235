//! Weekly roster totals.
//!
//! Computes the figures a planner reviews next to the grid.
//!
//! # Figures
//!
//! | Figure | Definition |
//! |--------|-----------|
//! | Weekly hours | Sum of net hours of an employee's 7 cells |
//! | Total hours | Sum of weekly hours over active employees |
//! | Active count | Employees taking part in the week |
//! | Locked cells | Locked cells belonging to active employees |
//! | Unassigned cells | Empty cells of active employees |
//!
//! Inactive employees are left out of every figure.

use serde::{Deserialize, Serialize};

use crate::config::PlanningConfig;
use crate::models::{LockSet, Position, Roster, Team, DAY_COUNT};

/// One employee's line in the summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeHours {
    pub slot: usize,
    pub name: String,
    pub position: Position,
    pub hours: f64,
    /// Hours inside the configured weekly range.
    pub within_range: bool,
}

/// Roster totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterSummary {
    /// Active employees in slot order.
    pub employees: Vec<EmployeeHours>,
    pub total_hours: f64,
    pub active_count: usize,
    pub locked_cells: usize,
    pub unassigned_cells: usize,
}

impl RosterSummary {
    /// Computes the totals for the active part of `roster`.
    pub fn calculate(roster: &Roster, team: &Team, locks: &LockSet, config: &PlanningConfig) -> Self {
        let employees: Vec<EmployeeHours> = team
            .active()
            .map(|e| {
                let hours = roster.weekly_hours(e.slot);
                EmployeeHours {
                    slot: e.slot,
                    name: e.display_name(),
                    position: e.position,
                    hours,
                    within_range: (config.min_weekly_hours..=config.max_weekly_hours)
                        .contains(&hours),
                }
            })
            .collect();

        let unassigned_cells = team
            .active()
            .map(|e| DAY_COUNT - roster.assigned(e.slot).count())
            .sum();

        Self {
            total_hours: employees.iter().map(|e| e.hours).sum(),
            active_count: employees.len(),
            locked_cells: locks.iter().filter(|c| team.is_active(c.slot)).count(),
            unassigned_cells,
            employees,
        }
    }

    /// Whether every active employee's hours are in range.
    pub fn hours_in_range(&self) -> bool {
        self.employees.iter().all(|e| e.within_range)
    }

    pub fn hours_of(&self, slot: usize) -> Option<f64> {
        self.employees.iter().find(|e| e.slot == slot).map(|e| e.hours)
    }
}
