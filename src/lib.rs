//! Weekly shift rostering for a small retail store.
//!
//! Builds a 7-day roster for up to six employees that satisfies the store's
//! labor-balance and coverage rules, by repeated randomized construction
//! and validation.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ShiftCode` catalog, `TimeWindow`, `Team`,
//!   `Roster`, `LockSet`, `SpecialDays`
//! - **`config`**: `PlanningConfig` (hours range, caps, coverage window,
//!   external-day policy, attempt ceiling)
//! - **`validation`**: Rule checks returning every violation of a roster
//! - **`generator`**: Five-phase randomized candidate construction
//! - **`search`**: Cancellable, step-wise retry-until-valid driver
//! - **`summary`**: Weekly hours and totals
//!
//! # Example
//!
//! ```
//! use u_roster::config::PlanningConfig;
//! use u_roster::models::Team;
//! use u_roster::search::{run_search, SearchOutcome, SearchRequest};
//! use rand::SeedableRng;
//! use rand::rngs::SmallRng;
//!
//! let config = PlanningConfig::default().with_max_attempts(20_000);
//! let request = SearchRequest::new(Team::default(), config);
//! match run_search(request, SmallRng::seed_from_u64(42)).unwrap() {
//!     SearchOutcome::Found(roster) => println!("{:?}", roster.week(0)),
//!     other => println!("no roster: {other:?}"),
//! }
//! ```
//!
//! # References
//!
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering"

pub mod config;
pub mod error;
pub mod generator;
pub mod models;
pub mod search;
pub mod summary;
pub mod validation;

#[cfg(test)]
mod fixtures;

pub use error::RosterError;
