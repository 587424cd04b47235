//! Retry-until-valid roster search.
//!
//! A [`SearchDriver`] repeats generate-then-validate attempts until a
//! roster breaks no rule, the attempt ceiling is reached, or the run is
//! cancelled. It never blocks for a whole run: [`SearchDriver::step`]
//! performs a single attempt and hands control back, so a host event loop
//! can interleave its own work between attempts.
//!
//! # States
//!
//! | State | Entered when |
//! |-------|--------------|
//! | `Idle` | Driver created, no run started |
//! | `Searching` | [`SearchDriver::start`] accepted a request |
//! | `Found` | An attempt produced a roster with no violations |
//! | `ExhaustedLimit` | The attempt ceiling was reached |
//! | `Cancelled` | The run's [`CancelToken`] was triggered |
//! | `NoActiveEmployees` | The request had nobody to plan for |
//!
//! Terminal states are left by the next `start`, which resets the attempt
//! counter. Only one run is active per driver; starting a new one cancels
//! the previous run's token first.
//!
//! # Usage
//!
//! ```
//! use u_roster::config::PlanningConfig;
//! use u_roster::models::Team;
//! use u_roster::search::{SearchDriver, SearchRequest, SearchStep};
//!
//! let request = SearchRequest::new(Team::default(), PlanningConfig::default().with_max_attempts(50));
//! let mut driver = SearchDriver::seeded(42);
//! let token = driver.start(request).unwrap();
//! loop {
//!     match driver.step() {
//!         SearchStep::Pending => { /* host work between attempts */ }
//!         SearchStep::Done(outcome) => {
//!             println!("{outcome:?}");
//!             break;
//!         }
//!         SearchStep::Idle => break,
//!     }
//! }
//! assert!(!token.is_cancelled());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::PlanningConfig;
use crate::error::RosterError;
use crate::generator::ScheduleGenerator;
use crate::models::{LockSet, Roster, SpecialDays, Team};
use crate::validation::{validate, Violation};

/// Attempts between progress events.
const PROGRESS_INTERVAL: u64 = 1_000;

/// Shared cancellation flag for one search run.
///
/// Cloning shares the flag. Cancellation is observed at the start of the
/// driver's next attempt.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Everything a run reads at start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub team: Team,
    /// Current grid; only its locked cells are used.
    pub current: Roster,
    pub locks: LockSet,
    pub special_days: SpecialDays,
    pub config: PlanningConfig,
}

impl SearchRequest {
    /// A request with an empty grid, no locks and no special days.
    pub fn new(team: Team, config: PlanningConfig) -> Self {
        Self {
            team,
            current: Roster::new(),
            locks: LockSet::new(),
            special_days: SpecialDays::new(),
            config,
        }
    }

    /// Keeps the locked cells of `current`.
    pub fn with_locked(mut self, current: Roster, locks: LockSet) -> Self {
        self.current = current;
        self.locks = locks;
        self
    }

    pub fn with_special_days(mut self, special_days: SpecialDays) -> Self {
        self.special_days = special_days;
        self
    }
}

/// Fewest-violations roster seen during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestSeen {
    pub roster: Roster,
    pub violations: Vec<Violation>,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// A roster that breaks no rule.
    Found(Roster),
    /// No valid roster within the attempt ceiling.
    ExhaustedLimit {
        attempts: u64,
        /// Diagnostic only.
        best: Option<BestSeen>,
    },
    Cancelled,
    NoActiveEmployees,
}

impl SearchOutcome {
    /// The terminal state this outcome leaves the driver in.
    pub fn state(&self) -> SearchState {
        match self {
            SearchOutcome::Found(_) => SearchState::Found,
            SearchOutcome::ExhaustedLimit { .. } => SearchState::ExhaustedLimit,
            SearchOutcome::Cancelled => SearchState::Cancelled,
            SearchOutcome::NoActiveEmployees => SearchState::NoActiveEmployees,
        }
    }

    pub fn roster(&self) -> Option<&Roster> {
        match self {
            SearchOutcome::Found(roster) => Some(roster),
            _ => None,
        }
    }
}

/// Driver lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchState {
    Idle,
    Searching,
    Found,
    ExhaustedLimit,
    Cancelled,
    NoActiveEmployees,
}

impl SearchState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, SearchState::Idle | SearchState::Searching)
    }
}

/// Result of one [`SearchDriver::step`].
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStep {
    /// No run in progress.
    Idle,
    /// One attempt done, call again.
    Pending,
    /// The run ended.
    Done(SearchOutcome),
}

struct Run {
    request: SearchRequest,
    token: CancelToken,
    attempts: u64,
    best: Option<BestSeen>,
}

/// Resumable retry-until-valid search.
pub struct SearchDriver<R: Rng = SmallRng> {
    rng: R,
    run: Option<Run>,
    state: SearchState,
}

impl SearchDriver<SmallRng> {
    /// Reproducible driver.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }

    /// Driver seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(SmallRng::from_os_rng())
    }
}

impl<R: Rng> SearchDriver<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            run: None,
            state: SearchState::Idle,
        }
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    /// Attempts made by the current run (0 when idle).
    pub fn attempts(&self) -> u64 {
        self.run.as_ref().map_or(0, |run| run.attempts)
    }

    pub fn is_searching(&self) -> bool {
        self.state == SearchState::Searching
    }

    /// Requests cancellation of the current run, if any.
    pub fn cancel(&self) {
        if let Some(run) = &self.run {
            run.token.cancel();
        }
    }

    /// Starts a new run, cancelling any run still in progress.
    ///
    /// Returns the new run's cancellation token.
    ///
    /// # Errors
    /// - [`RosterError::InvalidConfig`] if the request's configuration is
    ///   unusable. The driver state is left unchanged.
    /// - [`RosterError::NoActiveEmployees`] if nobody is active. No run is
    ///   installed and the driver is left in
    ///   [`SearchState::NoActiveEmployees`].
    pub fn start(&mut self, request: SearchRequest) -> Result<CancelToken, RosterError> {
        let run = self.prepare(request)?;
        let token = run.token.clone();
        self.run = Some(run);
        self.state = SearchState::Searching;
        Ok(token)
    }

    /// Performs at most one attempt of the current run.
    pub fn step(&mut self) -> SearchStep {
        let Some(run) = self.run.as_mut() else {
            return SearchStep::Idle;
        };

        match Self::attempt(&mut self.rng, run) {
            Some(outcome) => {
                let attempts = run.attempts;
                self.run = None;
                SearchStep::Done(self.finish(outcome, attempts))
            }
            None => SearchStep::Pending,
        }
    }

    /// Runs `request` to the end without yielding.
    ///
    /// Nobody being active is reported as
    /// [`SearchOutcome::NoActiveEmployees`] here rather than as an error.
    pub fn run(&mut self, request: SearchRequest) -> Result<SearchOutcome, RosterError> {
        let mut run = match self.prepare(request) {
            Ok(run) => run,
            Err(RosterError::NoActiveEmployees) => return Ok(SearchOutcome::NoActiveEmployees),
            Err(e) => return Err(e),
        };
        self.state = SearchState::Searching;
        loop {
            if let Some(outcome) = Self::attempt(&mut self.rng, &mut run) {
                return Ok(self.finish(outcome, run.attempts));
            }
        }
    }

    /// Checks the request and retires the previous run.
    fn prepare(&mut self, request: SearchRequest) -> Result<Run, RosterError> {
        request.config.validate()?;

        if let Some(previous) = self.run.take() {
            debug!(attempts = previous.attempts, "cancelling previous search");
            previous.token.cancel();
        }

        if request.team.active_count() == 0 {
            info!("no active employees, search skipped");
            self.state = SearchState::NoActiveEmployees;
            return Err(RosterError::NoActiveEmployees);
        }

        info!(
            active = request.team.active_count(),
            locked = request.locks.len(),
            max_attempts = request.config.max_attempts,
            "roster search started"
        );

        Ok(Run {
            request,
            token: CancelToken::new(),
            attempts: 0,
            best: None,
        })
    }

    fn attempt(rng: &mut R, run: &mut Run) -> Option<SearchOutcome> {
        if run.token.is_cancelled() {
            return Some(SearchOutcome::Cancelled);
        }
        let request = &run.request;
        if run.attempts >= request.config.max_attempts {
            return Some(SearchOutcome::ExhaustedLimit {
                attempts: run.attempts,
                best: run.best.take(),
            });
        }

        run.attempts += 1;
        let roster = ScheduleGenerator::new(&request.team, &request.config)
            .with_locks(&request.current, &request.locks)
            .with_special_days(&request.special_days)
            .generate(rng);
        let violations = validate(&roster, &request.team, &request.config);

        if violations.is_empty() {
            return Some(SearchOutcome::Found(roster));
        }

        if run
            .best
            .as_ref()
            .map_or(true, |best| violations.len() < best.violations.len())
        {
            run.best = Some(BestSeen { roster, violations });
        }

        if run.attempts % PROGRESS_INTERVAL == 0 {
            debug!(
                attempts = run.attempts,
                best_violations = run.best.as_ref().map_or(0, |b| b.violations.len()),
                "roster search progress"
            );
        }

        if run.attempts >= request.config.max_attempts {
            return Some(SearchOutcome::ExhaustedLimit {
                attempts: run.attempts,
                best: run.best.take(),
            });
        }
        None
    }

    fn finish(&mut self, outcome: SearchOutcome, attempts: u64) -> SearchOutcome {
        match &outcome {
            SearchOutcome::Found(_) => info!(attempts, "valid roster found"),
            SearchOutcome::ExhaustedLimit { best, .. } => warn!(
                attempts,
                best_violations = ?best.as_ref().map(|b| b.violations.len()),
                "no valid roster within attempt limit"
            ),
            SearchOutcome::Cancelled => info!(attempts, "roster search cancelled"),
            SearchOutcome::NoActiveEmployees => info!("no active employees, search skipped"),
        }
        self.state = outcome.state();
        outcome
    }
}

/// Runs one search to completion.
///
/// # Errors
/// [`RosterError::InvalidConfig`] for an unusable configuration. Every
/// other ending, including exhaustion and an empty team, is a
/// [`SearchOutcome`].
pub fn run_search<R: Rng>(request: SearchRequest, rng: R) -> Result<SearchOutcome, RosterError> {
    SearchDriver::new(rng).run(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::valid_week;
    use crate::models::{ShiftCode, SpecialDayKind, Weekday};

    /// Hours no week can reach, so every attempt fails.
    fn unsatisfiable() -> SearchRequest {
        SearchRequest::new(
            Team::default(),
            PlanningConfig::default().with_weekly_hours(1000.0, 2000.0),
        )
    }

    #[test]
    fn test_new_driver_is_idle() {
        let mut driver = SearchDriver::seeded(42);
        assert_eq!(driver.state(), SearchState::Idle);
        assert_eq!(driver.step(), SearchStep::Idle);
        assert_eq!(driver.attempts(), 0);
    }

    #[test]
    fn test_no_active_employees() {
        let mut driver = SearchDriver::seeded(42);
        let request = SearchRequest::new(Team::with_active(&[]), PlanningConfig::default());
        assert!(matches!(
            driver.start(request),
            Err(RosterError::NoActiveEmployees)
        ));
        assert_eq!(driver.state(), SearchState::NoActiveEmployees);
        assert_eq!(driver.step(), SearchStep::Idle);
        assert_eq!(driver.attempts(), 0);
    }

    #[test]
    fn test_empty_team_retires_running_search() {
        let mut driver = SearchDriver::seeded(42);
        let token = driver.start(unsatisfiable()).unwrap();
        driver.step();

        let empty = SearchRequest::new(Team::with_active(&[]), PlanningConfig::default());
        assert!(driver.start(empty).is_err());
        assert!(token.is_cancelled());
        assert_eq!(driver.state(), SearchState::NoActiveEmployees);
        assert_eq!(driver.step(), SearchStep::Idle);
    }

    #[test]
    fn test_default_team_found_from_empty_grid() {
        let team = Team::default();
        let config = PlanningConfig::default().with_max_attempts(20_000);
        let request = SearchRequest::new(team.clone(), config.clone());

        let outcome = run_search(request, SmallRng::seed_from_u64(42)).unwrap();
        let roster = match outcome {
            SearchOutcome::Found(roster) => roster,
            other => panic!("expected Found, got {:?}", other.state()),
        };
        assert!(validate(&roster, &team, &config).is_empty());
        for e in team.active() {
            assert!(roster.is_complete_for(e.slot));
            assert!(!roster.contains(e.slot, ShiftCode::External));
        }
    }

    #[test]
    fn test_found_with_locked_week() {
        let (team, current) = valid_week();
        let locks = LockSet::whole_weeks(&team.active_slots());
        let request =
            SearchRequest::new(team, PlanningConfig::default()).with_locked(current.clone(), locks);

        let mut driver = SearchDriver::seeded(42);
        driver.start(request).unwrap();
        match driver.step() {
            SearchStep::Done(SearchOutcome::Found(roster)) => assert_eq!(roster, current),
            other => panic!("expected Found, got {other:?}"),
        }
        assert_eq!(driver.state(), SearchState::Found);
        assert!(driver.state().is_terminal());
    }

    #[test]
    fn test_exhausted_limit_reports_best_seen() {
        let mut request = unsatisfiable();
        request.config.max_attempts = 20;
        let outcome = run_search(request.clone(), SmallRng::seed_from_u64(42)).unwrap();

        match outcome {
            SearchOutcome::ExhaustedLimit { attempts, best } => {
                assert_eq!(attempts, 20);
                let best = best.unwrap();
                assert!(!best.violations.is_empty());
                assert_eq!(
                    best.violations,
                    validate(&best.roster, &request.team, &request.config)
                );
            }
            other => panic!("expected ExhaustedLimit, got {other:?}"),
        }
    }

    #[test]
    fn test_cancel_mid_search() {
        let mut driver = SearchDriver::seeded(42);
        let token = driver.start(unsatisfiable()).unwrap();
        for _ in 0..3 {
            assert_eq!(driver.step(), SearchStep::Pending);
        }
        assert_eq!(driver.attempts(), 3);

        token.cancel();
        assert_eq!(driver.step(), SearchStep::Done(SearchOutcome::Cancelled));
        assert_eq!(driver.state(), SearchState::Cancelled);
        assert_eq!(driver.step(), SearchStep::Idle);
    }

    #[test]
    fn test_cancel_before_first_attempt() {
        let mut driver = SearchDriver::seeded(7);
        driver.start(unsatisfiable()).unwrap();
        driver.cancel();
        let step = driver.step();
        assert_eq!(step, SearchStep::Done(SearchOutcome::Cancelled));
        if let SearchStep::Done(outcome) = step {
            assert!(outcome.roster().is_none());
        }
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let mut driver = SearchDriver::seeded(1);
        let token = driver.start(unsatisfiable()).unwrap();
        let remote = token.clone();
        std::thread::spawn(move || remote.cancel()).join().unwrap();
        assert!(token.is_cancelled());
        assert_eq!(driver.step(), SearchStep::Done(SearchOutcome::Cancelled));
    }

    #[test]
    fn test_restart_cancels_previous_and_resets_counter() {
        let mut driver = SearchDriver::seeded(42);
        let first = driver.start(unsatisfiable()).unwrap();
        for _ in 0..5 {
            driver.step();
        }
        assert_eq!(driver.attempts(), 5);

        let second = driver.start(unsatisfiable()).unwrap();
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert_eq!(driver.attempts(), 0);
        assert_eq!(driver.state(), SearchState::Searching);

        assert_eq!(driver.step(), SearchStep::Pending);
        assert_eq!(driver.attempts(), 1);
    }

    #[test]
    fn test_terminal_state_restarts() {
        let mut driver = SearchDriver::seeded(42);
        let outcome = driver
            .run(SearchRequest::new(Team::with_active(&[]), PlanningConfig::default()))
            .unwrap();
        assert_eq!(outcome, SearchOutcome::NoActiveEmployees);

        driver.start(unsatisfiable()).unwrap();
        assert!(driver.is_searching());
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let mut driver = SearchDriver::seeded(42);
        let request = SearchRequest::new(
            Team::default(),
            PlanningConfig::default().with_weekly_hours(50.0, 20.0),
        );
        assert!(matches!(
            driver.start(request),
            Err(RosterError::InvalidConfig(_))
        ));
        assert_eq!(driver.state(), SearchState::Idle);
    }

    #[test]
    fn test_found_roster_is_valid() {
        let (team, current) = valid_week();
        let config = PlanningConfig::default();
        let locks = LockSet::whole_weeks(&team.active_slots());
        let request = SearchRequest::new(team.clone(), config.clone()).with_locked(current, locks);
        let outcome = run_search(request, SmallRng::seed_from_u64(3)).unwrap();
        let roster = outcome.roster().unwrap();
        assert!(validate(roster, &team, &config).is_empty());
    }

    #[test]
    fn test_outcome_serializes() {
        let mut request = unsatisfiable();
        request.config.max_attempts = 3;
        let outcome = run_search(request, SmallRng::seed_from_u64(9)).unwrap();
        assert!(matches!(outcome, SearchOutcome::ExhaustedLimit { attempts: 3, .. }));

        let json = serde_json::to_string(&outcome).unwrap();
        let back: SearchOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(back, outcome);

        let json = serde_json::to_string(&SearchOutcome::Cancelled).unwrap();
        assert_eq!(json, r#""Cancelled""#);
    }

    #[test]
    fn test_request_with_malformed_team_is_rejected() {
        let mut value = serde_json::to_value(unsatisfiable()).unwrap();
        value["team"] = serde_json::json!({
            "employees": [{ "slot": 7, "position": "Associate", "active": true, "name": "" }]
        });
        let err = serde_json::from_value::<SearchRequest>(value).unwrap_err();
        assert!(err.to_string().contains("invalid team"));
    }

    #[test]
    fn test_request_serializes() {
        let request = unsatisfiable()
            .with_special_days(SpecialDays::new().with(SpecialDayKind::Delivery, Weekday::Tue));
        let json = serde_json::to_string(&request).unwrap();
        let back: SearchRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back, request);
    }
}
