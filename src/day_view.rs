// src/day_view.rs
//
// Read-only aggregation for the on-screen/printed day plan: the complete
// grid over the fixed topology (every cell present, empty or occupied) plus
// the per-day absence summary. Holds no state of its own. This path is
// best-effort: a store failure renders an empty plan instead of an error.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::error;

use crate::grid::{
    collect_for_day, generic_position, PopulatedAssignment, GENERIC_POSITIONS_PER_LINE,
    LINES, LINE_POSITIONS, SPECIAL_ROLE_POSITIONS,
};
use crate::plan::{iso_week_of, AbsenceType, EmployeeId, Shift, PRODUCTION_SHIFTS};
use crate::store::PlanStore;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub position: String,
    /// `None` is an explicitly empty cell; the printed layout depends on
    /// positional completeness, so empty cells are never skipped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignment: Option<PopulatedAssignment>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LineBlock {
    pub line: String,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftBlock {
    pub shift: Shift,
    pub lines: Vec<LineBlock>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DayGrid {
    pub date: NaiveDate,
    pub calendar_week: u32,
    pub shifts: Vec<ShiftBlock>,
    /// Cross-shift special-role cells (Sonder pseudo-shift, empty line).
    pub special: Vec<GridCell>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceBadge {
    pub employee_id: EmployeeId,
    pub employee_name: String,
    #[serde(rename = "type")]
    pub kind: AbsenceType,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AbsenceSummary {
    pub date: NaiveDate,
    /// Feiertag renders as a full-day calendar marker, not as a badge.
    pub holiday: bool,
    pub badges: Vec<AbsenceBadge>,
}

#[derive(Clone)]
pub struct DayViewService {
    store: Arc<PlanStore>,
}

impl DayViewService {
    pub fn new(store: Arc<PlanStore>) -> Self {
        Self { store }
    }

    /// Joins the day's assignments against the fixed topology of shifts x
    /// lines x positions. Every cell of the printable plan is present.
    pub fn build_day_grid(&self, date: NaiveDate) -> DayGrid {
        let assignments = match self.store.lock() {
            Ok(data) => collect_for_day(&data, date),
            Err(e) => {
                error!("Day grid degraded to empty for {}: {}", date, e);
                Vec::new()
            }
        };

        let cell = |shift: Shift, line: &str, position: String| -> GridCell {
            let assignment = assignments
                .iter()
                .find(|a| {
                    a.assignment.shift == shift
                        && a.assignment.line == line
                        && a.assignment.position == position
                })
                .cloned();
            GridCell {
                position,
                assignment,
            }
        };

        let shifts = PRODUCTION_SHIFTS
            .iter()
            .map(|&shift| ShiftBlock {
                shift,
                lines: LINES
                    .iter()
                    .map(|&line| {
                        let mut cells: Vec<GridCell> = LINE_POSITIONS
                            .iter()
                            .map(|&p| cell(shift, line, p.to_string()))
                            .collect();
                        for n in 1..=GENERIC_POSITIONS_PER_LINE {
                            cells.push(cell(shift, line, generic_position(n)));
                        }
                        LineBlock {
                            line: line.to_string(),
                            cells,
                        }
                    })
                    .collect(),
            })
            .collect();

        let special = SPECIAL_ROLE_POSITIONS
            .iter()
            .map(|&p| cell(Shift::Sonder, "", p.to_string()))
            .collect();

        DayGrid {
            date,
            calendar_week: iso_week_of(date),
            shifts,
            special,
        }
    }

    /// Per-day absence summary: at most one badge per employee (first
    /// found wins), U/K/ZA only; Feiertag sets the day flag instead.
    pub fn build_absence_summary(&self, date: NaiveDate) -> AbsenceSummary {
        let data = match self.store.lock() {
            Ok(data) => data,
            Err(e) => {
                error!("Absence summary degraded to empty for {}: {}", date, e);
                return AbsenceSummary {
                    date,
                    holiday: false,
                    badges: Vec::new(),
                };
            }
        };

        let mut holiday = false;
        let mut seen: HashSet<&str> = HashSet::new();
        let mut badges = Vec::new();
        for ((employee_id, day), kind) in data.absences.iter() {
            if *day != date {
                continue;
            }
            if *kind == AbsenceType::Feiertag {
                holiday = true;
                continue;
            }
            if !kind.is_countable() || !seen.insert(employee_id.as_str()) {
                continue;
            }
            let employee = data.employee_by_id(employee_id);
            badges.push(AbsenceBadge {
                employee_id: employee_id.clone(),
                employee_name: employee
                    .map(|e| e.name.clone())
                    .unwrap_or_else(|| "Unbekannt".to_string()),
                kind: *kind,
            });
        }
        badges.sort_by(|a, b| a.employee_name.cmp(&b.employee_name));

        AbsenceSummary {
            date,
            holiday,
            badges,
        }
    }
}
