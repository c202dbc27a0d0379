// src/absence.rs
//
// Absence ledger: one record per (employee, day), upserted. The "NONE"
// sentinel on the write path deletes instead of storing, so a cleared day
// leaves no record behind.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::plan::{month_bounds, Absence, AbsenceType, EmployeeId, PlanError, Role};
use crate::store::PlanStore;

/// Result of a single absence write: the stored record, or confirmation
/// that the day was cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbsenceOutcome {
    Saved(Absence),
    Removed,
}

/// Month-listing row, populated with employee display data on the read
/// side. A dangling reference renders as an unknown employee.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedAbsence {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_role: Option<Role>,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub kind: AbsenceType,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FailedDay {
    pub date: NaiveDate,
    pub error: String,
}

/// Best-effort outcome of a range fill: days that stuck and days that
/// failed. There is no rollback of the applied part.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceRangeReport {
    pub applied: Vec<NaiveDate>,
    pub removed: Vec<NaiveDate>,
    pub failed: Vec<FailedDay>,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct AbsenceTotals {
    pub u: u32,
    pub za: u32,
    pub k: u32,
}

#[derive(Clone)]
pub struct AbsenceLedger {
    store: Arc<PlanStore>,
}

impl AbsenceLedger {
    pub fn new(store: Arc<PlanStore>) -> Self {
        Self { store }
    }

    /// Upserts the (employee, day) record, or deletes it when `kind` is
    /// `None` (the request-level "NONE" sentinel). The employee reference
    /// is validated on every write, same as on the assignment path.
    pub fn set_absence(
        &self,
        employee_id: &str,
        day: NaiveDate,
        kind: Option<AbsenceType>,
    ) -> Result<AbsenceOutcome, PlanError> {
        let mut data = self.store.lock()?;
        if data.employee_by_id(employee_id).is_none() {
            return Err(PlanError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            });
        }
        let key = (employee_id.to_string(), day);
        match kind {
            None => {
                data.absences.remove(&key);
                info!("Cleared absence for employee {} on {}", employee_id, day);
                Ok(AbsenceOutcome::Removed)
            }
            Some(kind) => {
                data.absences.insert(key, kind);
                info!(
                    "Set absence for employee {} on {}: {}",
                    employee_id,
                    day,
                    kind.as_str()
                );
                Ok(AbsenceOutcome::Saved(Absence {
                    employee_id: employee_id.to_string(),
                    date: day,
                    kind,
                }))
            }
        }
    }

    /// Applies `set_absence` to every day in [start, end] inclusive. Days
    /// that succeed are kept even when later days fail; the report tells
    /// the caller which days stuck.
    pub fn set_absence_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
        kind: Option<AbsenceType>,
    ) -> Result<AbsenceRangeReport, PlanError> {
        if start > end {
            return Err(PlanError::RangeInverted { start, end });
        }
        // Resolve the reference once up front; a per-day NotFound for
        // every single day would only repeat the same answer.
        {
            let data = self.store.lock()?;
            if data.employee_by_id(employee_id).is_none() {
                return Err(PlanError::EmployeeNotFound {
                    employee_id: employee_id.to_string(),
                });
            }
        }

        let mut report = AbsenceRangeReport::default();
        let mut day = start;
        while day <= end {
            match self.set_absence(employee_id, day, kind) {
                Ok(AbsenceOutcome::Saved(_)) => report.applied.push(day),
                Ok(AbsenceOutcome::Removed) => report.removed.push(day),
                Err(e) => {
                    warn!(
                        "Absence range fill failed for employee {} on {}: {}",
                        employee_id, day, e
                    );
                    report.failed.push(FailedDay {
                        date: day,
                        error: e.to_string(),
                    });
                }
            }
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        Ok(report)
    }

    /// All records of a calendar month ("YYYY-MM"), populated with the
    /// employee's display data. An empty month string yields an empty
    /// list; callers are expected to bound the result set.
    pub fn list_absences(&self, year_month: &str) -> Result<Vec<PopulatedAbsence>, PlanError> {
        if year_month.is_empty() {
            return Ok(Vec::new());
        }
        let (first, next_first) = month_bounds(year_month)?;

        let data = self.store.lock()?;
        let mut rows: Vec<PopulatedAbsence> = data
            .absences
            .iter()
            .filter(|((_, date), _)| *date >= first && *date < next_first)
            .map(|((employee_id, date), kind)| {
                let employee = data.employee_by_id(employee_id);
                PopulatedAbsence {
                    employee_id: employee_id.clone(),
                    employee_name: employee
                        .map(|e| e.name.clone())
                        .unwrap_or_else(|| "Unbekannt".to_string()),
                    employee_role: employee.map(|e| e.role),
                    date: *date,
                    kind: *kind,
                }
            })
            .collect();
        rows.sort_by(|a, b| (a.date, &a.employee_name).cmp(&(b.date, &b.employee_name)));
        Ok(rows)
    }

    /// Per-employee counts of U, ZA and K. Feiertag is a calendar fact and
    /// the F/S/N preference markers are transient; neither is counted.
    pub fn totals(&self, employee_id: &str) -> Result<AbsenceTotals, PlanError> {
        let data = self.store.lock()?;
        if data.employee_by_id(employee_id).is_none() {
            return Err(PlanError::EmployeeNotFound {
                employee_id: employee_id.to_string(),
            });
        }
        let mut totals = AbsenceTotals::default();
        for ((emp, _), kind) in data.absences.iter() {
            if emp != employee_id {
                continue;
            }
            match kind {
                AbsenceType::Urlaub => totals.u += 1,
                AbsenceType::Zeitausgleich => totals.za += 1,
                AbsenceType::Krank => totals.k += 1,
                _ => {}
            }
        }
        Ok(totals)
    }
}
