//! Error type.

use thiserror::Error;

use crate::models::Position;
use crate::validation::Violation;

/// Errors raised by the rostering engine.
///
/// Search outcomes that are not faults (limit reached, cancelled) are
/// reported through [`crate::search::SearchOutcome`] instead.
#[derive(Debug, Error)]
pub enum RosterError {
    /// No employee is active, so there is nothing to plan.
    #[error("no active employees to plan for")]
    NoActiveEmployees,

    /// The planning configuration is inconsistent.
    #[error("invalid planning configuration: {0}")]
    InvalidConfig(String),

    /// A label does not name any catalog shift.
    #[error("unknown shift code: {0:?}")]
    UnknownShiftCode(String),

    /// A team does not have the fixed six-slot layout.
    #[error("invalid team: {0}")]
    InvalidTeam(String),

    #[error("employee slot {0} is out of range")]
    SlotOutOfRange(usize),

    /// Protected positions cannot be deactivated.
    #[error("{position} (slot {slot}) cannot be deactivated")]
    ProtectedPosition { slot: usize, position: Position },

    /// The roster breaks one or more rules.
    #[error("roster breaks {} rule(s)", .0.len())]
    RuleViolations(Vec<Violation>),
}
