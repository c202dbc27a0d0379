// src/roster.rs
//
// Employee directory: the leaf component everything else references.

use std::sync::Arc;

use tracing::info;

use crate::plan::{Employee, PlanError, Role};
use crate::store::PlanStore;

#[derive(Clone)]
pub struct RosterService {
    store: Arc<PlanStore>,
}

impl RosterService {
    pub fn new(store: Arc<PlanStore>) -> Self {
        Self { store }
    }

    /// Insert-if-absent upsert keyed by the trimmed name: adding an
    /// existing name returns the existing record unchanged.
    pub fn add_employee(&self, name: &str, role: &str) -> Result<Employee, PlanError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlanError::MissingField("name"));
        }
        let role = Role::parse(role)?;

        let mut data = self.store.lock()?;
        if let Some(existing) = data.employee_by_name(name) {
            return Ok(existing.clone());
        }
        let employee = Employee {
            id: PlanStore::mint_id(&data),
            name: name.to_string(),
            role,
        };
        info!(
            "Adding employee: id={}, name={}, role={}",
            employee.id,
            employee.name,
            employee.role.as_str()
        );
        data.employees.push(employee.clone());
        Ok(employee)
    }

    pub fn update_employee(&self, id: &str, name: &str, role: &str) -> Result<Employee, PlanError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlanError::MissingField("name"));
        }
        let role = Role::parse(role)?;

        let mut data = self.store.lock()?;
        // Resolve the id first: a missing employee is NotFound even when
        // the requested name would also conflict.
        let index = data
            .employees
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| PlanError::EmployeeNotFound {
                employee_id: id.to_string(),
            })?;
        if data
            .employees
            .iter()
            .any(|e| e.name == name && e.id != id)
        {
            return Err(PlanError::NameTaken {
                name: name.to_string(),
            });
        }
        let employee = &mut data.employees[index];
        employee.name = name.to_string();
        employee.role = role;
        Ok(employee.clone())
    }

    /// Deletes the employee together with every assignment and absence
    /// referencing it. Dependent records go first, the employee last.
    pub fn delete_employee(&self, id: &str) -> Result<(), PlanError> {
        let mut data = self.store.lock()?;
        let (assignments, absences) =
            data.remove_employee_cascade(id)
                .ok_or_else(|| PlanError::EmployeeNotFound {
                    employee_id: id.to_string(),
                })?;
        info!(
            "Deleted employee {} (cascade removed {} assignments, {} absences)",
            id, assignments, absences
        );
        Ok(())
    }

    /// Roster in insertion order; grouping by role is a caller concern.
    pub fn list_employees(&self) -> Result<Vec<Employee>, PlanError> {
        Ok(self.store.lock()?.employees.clone())
    }
}
