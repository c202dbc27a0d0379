// src/grid.rs
//
// Shift assignment grid: the invariant-checked upsert at the heart of the
// plan. Every slot (date, shift, line, position) is independently EMPTY or
// OCCUPIED; a write validates the employee reference, the sick-day block
// and the Packer position restriction before committing.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::plan::{
    iso_week_of, AbsenceType, Color, EmployeeId, PlanError, Role, Shift, ShiftAssignment, SlotKey,
};
use crate::store::{PlanData, PlanStore};

// --- Fixed plan topology ---

pub const LINES: [&str; 5] = ["Linie 1", "Linie 2", "Linie 3", "Linie 4", "Linie 5"];

/// Named positions every production line carries in every shift.
pub const LINE_POSITIONS: [&str; 4] = [
    "Linienführer",
    "Maschine/Linienbediner",
    "Maschine/Anlagenführer AZUBIS",
    "Packer",
];

/// Generic numbered "Position N" slots per line, on top of the named ones.
pub const GENERIC_POSITIONS_PER_LINE: u32 = 3;

/// Cross-shift special-role slots. They live on the synthetic "Sonder"
/// shift with an empty line value and share the slot machinery otherwise.
pub const SPECIAL_ROLE_POSITIONS: [&str; 5] =
    ["Kantine", "Springer", "Schulung", "Qualifizierung", "Lager"];

/// Machine-operator positions a Packer may never take.
pub const PACKER_FORBIDDEN_POSITIONS: [&str; 2] =
    ["Maschine/Linienbediner", "Maschine/Anlagenführer AZUBIS"];

pub fn generic_position(n: u32) -> String {
    format!("Position {}", n)
}

// --- Read-side shapes ---

/// An assignment populated with the employee's display data. A dangling
/// reference renders as "Unbekannt" rather than failing the read.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedAssignment {
    #[serde(flatten)]
    pub assignment: ShiftAssignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_role: Option<Role>,
}

pub(crate) fn populate(data: &PlanData, assignment: &ShiftAssignment) -> PopulatedAssignment {
    let employee = assignment
        .employee_id
        .as_deref()
        .map(|id| data.employee_by_id(id));
    PopulatedAssignment {
        assignment: assignment.clone(),
        employee_name: employee.map(|found| {
            found
                .map(|e| e.name.clone())
                .unwrap_or_else(|| "Unbekannt".to_string())
        }),
        employee_role: employee.and_then(|found| found.map(|e| e.role)),
    }
}

/// All assignments of one day, populated and in stable grid order.
pub(crate) fn collect_for_day(data: &PlanData, date: NaiveDate) -> Vec<PopulatedAssignment> {
    let mut rows: Vec<PopulatedAssignment> = data
        .assignments
        .values()
        .filter(|a| a.date == date)
        .map(|a| populate(data, a))
        .collect();
    rows.sort_by(|a, b| {
        let ka = (shift_order(a.assignment.shift), &a.assignment.line, &a.assignment.position);
        let kb = (shift_order(b.assignment.shift), &b.assignment.line, &b.assignment.position);
        ka.cmp(&kb)
    });
    rows
}

fn shift_order(shift: Shift) -> u8 {
    match shift {
        Shift::Frueh => 0,
        Shift::Spaet => 1,
        Shift::Nacht => 2,
        Shift::Sonder => 3,
    }
}

// --- Write-side spec ---

#[derive(Debug, Clone)]
pub struct AssignSpec {
    pub date: NaiveDate,
    pub shift: Shift,
    pub line: String,
    pub position: String,
    pub employee_id: Option<EmployeeId>,
    pub custom_name: Option<String>,
    pub color: Option<Color>,
}

#[derive(Clone)]
pub struct AssignmentGrid {
    store: Arc<PlanStore>,
}

impl AssignmentGrid {
    pub fn new(store: Arc<PlanStore>) -> Self {
        Self { store }
    }

    /// Validates and upserts one slot. Last write wins per slot; there is
    /// no assignment history and no notification beyond the returned
    /// record.
    pub fn assign(&self, spec: AssignSpec) -> Result<PopulatedAssignment, PlanError> {
        let position = spec.position.trim().to_string();
        if position.is_empty() {
            return Err(PlanError::MissingField("position"));
        }
        let custom_name = spec
            .custom_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let employee_id = spec.employee_id.filter(|id| !id.trim().is_empty());
        if employee_id.is_none() && custom_name.is_none() {
            // An assignment with neither occupant is "unassigned" and is
            // never stored.
            return Err(PlanError::NothingToAssign);
        }
        // Exactly one occupant is stored per slot; a registered employee
        // supersedes a custom name sent alongside it.
        let custom_name = if employee_id.is_some() {
            None
        } else {
            custom_name
        };

        let key = SlotKey {
            date: spec.date,
            shift: spec.shift,
            line: spec.line.clone(),
            position: position.clone(),
        };

        let mut data = self.store.lock()?;
        if let Some(ref id) = employee_id {
            let employee = data
                .employee_by_id(id)
                .ok_or_else(|| PlanError::EmployeeNotFound {
                    employee_id: id.clone(),
                })?
                .clone();

            // The sick-day block guards fresh assignment creation only; an
            // edit of the slot's existing occupant (color change) passes.
            let already_holds_slot = data
                .assignments
                .get(&key)
                .map_or(false, |a| a.employee_id.as_deref() == Some(id.as_str()));
            if !already_holds_slot
                && data.absences.get(&(id.clone(), spec.date)) == Some(&AbsenceType::Krank)
            {
                return Err(PlanError::SickDay {
                    name: employee.name.clone(),
                    date: spec.date,
                });
            }

            if employee.role == Role::Packer
                && PACKER_FORBIDDEN_POSITIONS.contains(&position.as_str())
            {
                return Err(PlanError::ForbiddenPosition {
                    role: employee.role.as_str().to_string(),
                    position,
                });
            }
        }

        let assignment = ShiftAssignment {
            date: spec.date,
            shift: spec.shift,
            line: spec.line,
            position,
            employee_id,
            custom_name,
            color: spec.color,
            calendar_week: iso_week_of(spec.date),
        };
        info!(
            "Assigning slot {}/{}/{}/{} -> {}",
            assignment.date,
            assignment.shift.as_str(),
            assignment.line,
            assignment.position,
            assignment
                .employee_id
                .as_deref()
                .or(assignment.custom_name.as_deref())
                .unwrap_or("-")
        );
        data.assignments.insert(key, assignment.clone());
        Ok(populate(&data, &assignment))
    }

    /// Clears a slot. Deleting an already-empty slot is not an error.
    pub fn unassign(&self, key: &SlotKey) -> Result<Option<ShiftAssignment>, PlanError> {
        let mut data = self.store.lock()?;
        let removed = data.assignments.remove(key);
        if removed.is_some() {
            info!(
                "Cleared slot {}/{}/{}/{}",
                key.date,
                key.shift.as_str(),
                key.line,
                key.position
            );
        }
        Ok(removed)
    }

    /// Every assignment for the day across all shifts, lines and
    /// positions, populated for display.
    pub fn query(&self, date: NaiveDate) -> Result<Vec<PopulatedAssignment>, PlanError> {
        let data = self.store.lock()?;
        Ok(collect_for_day(&data, date))
    }
}
