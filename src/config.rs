//! Planning configuration.
//!
//! One record drives the validator, the generator and the search driver.
//! Two rule-set variants exist in practice; [`PlanningConfig::default`]
//! follows the current one and [`PlanningConfig::legacy`] the older one.
//!
//! | Setting | Default | Legacy |
//! |---------|---------|--------|
//! | Weekly hours | 25-55 | 45-55 |
//! | External day | Friday | Any day |
//!
//! # Usage
//!
//! ```
//! use u_roster::config::PlanningConfig;
//!
//! let config = PlanningConfig::default()
//!     .with_weekly_hours(30.0, 50.0)
//!     .with_max_attempts(10_000);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RosterError;
use crate::models::{ShiftCode, SpecialDayKind, TimeWindow, Weekday};

/// Where the generator may place the external `A` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExternalDayPolicy {
    /// Never assigned automatically.
    Disabled,
    /// Only on the given day.
    Fixed(Weekday),
    /// On any free day.
    AnyDay,
}

/// Planning configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanningConfig {
    /// Lower bound of weekly net hours per active employee.
    pub min_weekly_hours: f64,
    /// Upper bound of weekly net hours per active employee.
    pub max_weekly_hours: f64,
    /// Active employees allowed on leave-primary per day.
    pub max_daily_leave: usize,
    /// Active employees allowed on an opening shift per day.
    pub max_opening_shifts: usize,
    /// Employees required on the floor at every point of the operating window.
    pub min_coverage: usize,
    /// Store opening hours.
    pub operating_window: TimeWindow,
    /// Coverage check resolution (minutes).
    pub coverage_step_min: u32,
    /// External code placement.
    pub external_day: ExternalDayPolicy,
    /// Days that never receive a generated leave day.
    pub leave_blocked_days: Vec<Weekday>,
    /// Pool of codes the fill phase draws from.
    pub planning_codes: Vec<ShiftCode>,
    /// Special-day kinds on which early shifts are not generated.
    pub early_suppressed_by: Vec<SpecialDayKind>,
    /// Fill passes over still-empty cells.
    pub fill_passes: usize,
    /// Attempt ceiling for one search run.
    pub max_attempts: u64,
}

impl Default for PlanningConfig {
    fn default() -> Self {
        Self {
            min_weekly_hours: 25.0,
            max_weekly_hours: 55.0,
            max_daily_leave: 1,
            max_opening_shifts: 2,
            min_coverage: 2,
            operating_window: TimeWindow::hm(8, 45, 21, 15),
            coverage_step_min: 15,
            external_day: ExternalDayPolicy::Fixed(Weekday::Fri),
            leave_blocked_days: vec![Weekday::Fri],
            planning_codes: ShiftCode::planning_codes(),
            early_suppressed_by: vec![SpecialDayKind::Delivery],
            fill_passes: 5,
            max_attempts: 50_000,
        }
    }
}

impl PlanningConfig {
    /// The older rule-set: 45-55 hours, external code on any day.
    pub fn legacy() -> Self {
        Self {
            min_weekly_hours: 45.0,
            external_day: ExternalDayPolicy::AnyDay,
            ..Self::default()
        }
    }

    /// Sets the weekly hours range.
    pub fn with_weekly_hours(mut self, min: f64, max: f64) -> Self {
        self.min_weekly_hours = min;
        self.max_weekly_hours = max;
        self
    }

    pub fn with_external_day(mut self, policy: ExternalDayPolicy) -> Self {
        self.external_day = policy;
        self
    }

    pub fn with_leave_blocked_days(mut self, days: Vec<Weekday>) -> Self {
        self.leave_blocked_days = days;
        self
    }

    /// Restricts the fill pool. Non-working codes are dropped.
    pub fn with_planning_codes(mut self, codes: Vec<ShiftCode>) -> Self {
        self.planning_codes = codes;
        self
    }

    pub fn with_early_suppressed_by(mut self, kinds: Vec<SpecialDayKind>) -> Self {
        self.early_suppressed_by = kinds;
        self
    }

    pub fn with_fill_passes(mut self, passes: usize) -> Self {
        self.fill_passes = passes;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the coverage requirement.
    pub fn with_coverage(mut self, window: TimeWindow, step_min: u32, min_staff: usize) -> Self {
        self.operating_window = window;
        self.coverage_step_min = step_min;
        self.min_coverage = min_staff;
        self
    }

    /// Checks that the configuration is usable.
    pub fn validate(&self) -> Result<(), RosterError> {
        let invalid = |msg: String| -> Result<(), RosterError> {
            Err(RosterError::InvalidConfig(msg))
        };

        if !self.min_weekly_hours.is_finite() || !self.max_weekly_hours.is_finite() {
            return invalid("weekly hours must be finite".into());
        }
        if self.min_weekly_hours < 0.0 {
            return invalid(format!(
                "minimum weekly hours must not be negative ({})",
                self.min_weekly_hours
            ));
        }
        if self.min_weekly_hours > self.max_weekly_hours {
            return invalid(format!(
                "minimum weekly hours {} exceed maximum {}",
                self.min_weekly_hours, self.max_weekly_hours
            ));
        }
        if self.operating_window.is_empty() {
            return invalid(format!("empty operating window {}", self.operating_window));
        }
        if self.coverage_step_min == 0 {
            return invalid("coverage step must be at least one minute".into());
        }
        if !self
            .planning_codes
            .iter()
            .any(|c| c.is_early() || c.is_late())
        {
            return invalid("planning pool has no early or late codes".into());
        }
        if self.max_attempts == 0 {
            return invalid("attempt ceiling must be positive".into());
        }
        Ok(())
    }

    /// Fill pool restricted to working early/late codes.
    pub(crate) fn fill_pool(&self) -> Vec<ShiftCode> {
        self.planning_codes
            .iter()
            .copied()
            .filter(|c| c.is_early() || c.is_late())
            .collect()
    }
}
