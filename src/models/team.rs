//! Team model.
//!
//! A store team has six fixed slots. The position of each slot, and hence
//! its role group, never changes; only the active flag and display name do.
//!
//! | Slot | Position | Group | Protected |
//! |------|----------|-------|-----------|
//! | 0 | M.S. | Manager | yes |
//! | 1 | M.S.Y. | Manager | yes |
//! | 2 | G.T. | Staff | yes |
//! | 3-5 | PER. | Staff | no |
//!
//! Protected positions cannot be deactivated and never take the external
//! `A` code during generation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RosterError;

/// Number of employee slots.
pub const SLOT_COUNT: usize = 6;

/// Position held by a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// Store manager (M.S.).
    StoreManager,
    /// Assistant store manager (M.S.Y.).
    AssistantManager,
    /// Shift lead (G.T.).
    ShiftLead,
    /// Sales associate (PER.).
    Associate,
}

/// Role partition used by the balance and pairing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleGroup {
    Manager,
    Staff,
}

impl Position {
    /// Position of each slot.
    pub const BY_SLOT: [Position; SLOT_COUNT] = [
        Position::StoreManager,
        Position::AssistantManager,
        Position::ShiftLead,
        Position::Associate,
        Position::Associate,
        Position::Associate,
    ];

    /// Short label as printed on the roster.
    pub fn label(self) -> &'static str {
        match self {
            Position::StoreManager => "M.S.",
            Position::AssistantManager => "M.S.Y.",
            Position::ShiftLead => "G.T.",
            Position::Associate => "PER.",
        }
    }

    pub fn group(self) -> RoleGroup {
        match self {
            Position::StoreManager | Position::AssistantManager => RoleGroup::Manager,
            Position::ShiftLead | Position::Associate => RoleGroup::Staff,
        }
    }

    /// Protected positions stay active and are never sent off-site.
    pub fn is_protected(self) -> bool {
        !matches!(self, Position::Associate)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An employee slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Slot index (0..SLOT_COUNT).
    pub slot: usize,
    /// Fixed position of the slot.
    pub position: Position,
    /// Whether the employee takes part in planning.
    pub active: bool,
    /// Display name (may be empty).
    pub name: String,
}

impl Employee {
    pub fn group(&self) -> RoleGroup {
        self.position.group()
    }

    /// Name used in violation messages.
    ///
    /// Falls back to `"<position> (<slot + 1>)"` when no name is set.
    pub fn display_name(&self) -> String {
        let name = self.name.trim();
        if name.is_empty() {
            format!("{} ({})", self.position, self.slot + 1)
        } else {
            name.to_string()
        }
    }
}

/// The six employee slots of a store.
///
/// Deserialization checks the slot layout: six employees, each at its own
/// index and holding that slot's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TeamRecord")]
pub struct Team {
    employees: Vec<Employee>,
}

/// Unchecked wire form of [`Team`].
#[derive(Deserialize)]
struct TeamRecord {
    employees: Vec<Employee>,
}

impl TryFrom<TeamRecord> for Team {
    type Error = RosterError;

    fn try_from(record: TeamRecord) -> Result<Self, Self::Error> {
        if record.employees.len() != SLOT_COUNT {
            return Err(RosterError::InvalidTeam(format!(
                "expected {SLOT_COUNT} employees, found {}",
                record.employees.len()
            )));
        }
        for (index, e) in record.employees.iter().enumerate() {
            if e.slot != index {
                return Err(RosterError::InvalidTeam(format!(
                    "employee at index {index} claims slot {}",
                    e.slot
                )));
            }
            let expected = Position::BY_SLOT[index];
            if e.position != expected {
                return Err(RosterError::InvalidTeam(format!(
                    "slot {index} must hold {expected}, found {}",
                    e.position
                )));
            }
        }
        Ok(Self {
            employees: record.employees,
        })
    }
}

impl Default for Team {
    /// Slots 0-3 active, the two extra associates inactive.
    fn default() -> Self {
        Self::with_active(&[0, 1, 2, 3])
    }
}

impl Team {
    /// Creates a team where exactly the given slots are active.
    ///
    /// Out-of-range slots are ignored.
    pub fn with_active(active: &[usize]) -> Self {
        let employees = Position::BY_SLOT
            .iter()
            .enumerate()
            .map(|(slot, &position)| Employee {
                slot,
                position,
                active: active.contains(&slot),
                name: String::new(),
            })
            .collect();
        Self { employees }
    }

    /// Creates a team with every slot active.
    pub fn full() -> Self {
        Self::with_active(&[0, 1, 2, 3, 4, 5])
    }

    /// Sets a display name.
    pub fn with_name(mut self, slot: usize, name: impl Into<String>) -> Self {
        if let Some(e) = self.employees.get_mut(slot) {
            e.name = name.into();
        }
        self
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn employee(&self, slot: usize) -> Option<&Employee> {
        self.employees.get(slot)
    }

    pub fn is_active(&self, slot: usize) -> bool {
        self.employees.get(slot).is_some_and(|e| e.active)
    }

    /// Active employees in slot order.
    pub fn active(&self) -> impl Iterator<Item = &Employee> {
        self.employees.iter().filter(|e| e.active)
    }

    pub fn active_slots(&self) -> Vec<usize> {
        self.active().map(|e| e.slot).collect()
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    /// Active members of a role group, in slot order.
    pub fn active_in(&self, group: RoleGroup) -> impl Iterator<Item = &Employee> {
        self.active().filter(move |e| e.group() == group)
    }

    /// First active slot holding the given position.
    pub fn active_slot_of(&self, position: Position) -> Option<usize> {
        self.active().find(|e| e.position == position).map(|e| e.slot)
    }

    /// Activates a slot.
    pub fn activate(&mut self, slot: usize) -> Result<(), RosterError> {
        let e = self
            .employees
            .get_mut(slot)
            .ok_or(RosterError::SlotOutOfRange(slot))?;
        e.active = true;
        Ok(())
    }

    /// Deactivates a slot. Protected positions are refused.
    pub fn deactivate(&mut self, slot: usize) -> Result<(), RosterError> {
        let e = self
            .employees
            .get_mut(slot)
            .ok_or(RosterError::SlotOutOfRange(slot))?;
        if e.position.is_protected() {
            return Err(RosterError::ProtectedPosition {
                slot,
                position: e.position,
            });
        }
        e.active = false;
        Ok(())
    }

    /// Sets the display name of a slot.
    pub fn rename(&mut self, slot: usize, name: impl Into<String>) -> Result<(), RosterError> {
        let e = self
            .employees
            .get_mut(slot)
            .ok_or(RosterError::SlotOutOfRange(slot))?;
        e.name = name.into();
        Ok(())
    }
}
