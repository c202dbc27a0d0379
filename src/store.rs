// src/store.rs
//
// In-memory document store backing the plan. One mutex guards all three
// collections so the employee-delete cascade is atomic to readers; every
// keyed insert is the atomic commit-or-fail upsert the write paths rely on.

use rand::RngCore;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use tracing::debug;

use crate::plan::{AbsenceType, Employee, EmployeeId, PlanError, ShiftAssignment, SlotKey};

#[derive(Debug, Default)]
pub struct PlanData {
    /// Roster in insertion order. Small enough that linear scans by id or
    /// name are fine.
    pub employees: Vec<Employee>,
    /// At most one absence per (employee, day).
    pub absences: HashMap<(EmployeeId, NaiveDate), AbsenceType>,
    /// At most one assignment per slot.
    pub assignments: HashMap<SlotKey, ShiftAssignment>,
}

impl PlanData {
    pub fn employee_by_id(&self, id: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.id == id)
    }

    pub fn employee_by_name(&self, name: &str) -> Option<&Employee> {
        self.employees.iter().find(|e| e.name == name)
    }

    /// Removes every assignment and absence referencing the employee, then
    /// the employee itself. Caller holds the store lock, so the whole
    /// cascade is one atomic step from any reader's point of view.
    pub fn remove_employee_cascade(&mut self, id: &str) -> Option<(usize, usize)> {
        let index = self.employees.iter().position(|e| e.id == id)?;
        let before_assignments = self.assignments.len();
        self.assignments
            .retain(|_, a| a.employee_id.as_deref() != Some(id));
        let before_absences = self.absences.len();
        self.absences.retain(|(emp, _), _| emp != id);
        self.employees.remove(index);
        Some((
            before_assignments - self.assignments.len(),
            before_absences - self.absences.len(),
        ))
    }
}

pub struct PlanStore {
    data: Mutex<PlanData>,
}

impl PlanStore {
    pub fn new() -> Self {
        Self {
            data: Mutex::new(PlanData::default()),
        }
    }

    /// Acquires the store lock. A poisoned lock surfaces as a storage
    /// error instead of a panic; the read side degrades on it, the write
    /// side reports it to the caller.
    pub fn lock(&self) -> Result<MutexGuard<'_, PlanData>, PlanError> {
        self.data
            .lock()
            .map_err(|_| PlanError::Storage("plan store lock poisoned".to_string()))
    }

    /// Mints an opaque employee id: 8 random bytes, hex-encoded. The loop
    /// re-rolls on the (practically unreachable) collision.
    pub fn mint_id(data: &PlanData) -> EmployeeId {
        let mut rng = rand::thread_rng();
        loop {
            let mut bytes = [0u8; 8];
            rng.fill_bytes(&mut bytes);
            let id = hex::encode(bytes);
            if data.employee_by_id(&id).is_none() {
                return id;
            }
            debug!("Employee id collision on {}, re-rolling", id);
        }
    }

    /// Snapshot of collection sizes for the status endpoint.
    pub fn counts(&self) -> Result<(usize, usize, usize), PlanError> {
        let data = self.lock()?;
        Ok((
            data.employees.len(),
            data.absences.len(),
            data.assignments.len(),
        ))
    }
}

impl Default for PlanStore {
    fn default() -> Self {
        Self::new()
    }
}
