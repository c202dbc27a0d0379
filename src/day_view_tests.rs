// src/day_view_tests.rs

#[cfg(test)]
mod tests {
    use crate::absence::AbsenceLedger;
    use crate::day_view::DayViewService;
    use crate::grid::{
        AssignSpec, AssignmentGrid, GENERIC_POSITIONS_PER_LINE, LINES, LINE_POSITIONS,
        SPECIAL_ROLE_POSITIONS,
    };
    use crate::plan::{AbsenceType, Employee, Shift};
    use crate::roster::RosterService;
    use crate::store::PlanStore;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    fn setup() -> (Arc<PlanStore>, DayViewService, Employee) {
        let store = Arc::new(PlanStore::new());
        let roster = RosterService::new(store.clone());
        let anna = roster.add_employee("Anna Muster", "Packer").unwrap();
        (store.clone(), DayViewService::new(store), anna)
    }

    #[test]
    fn day_grid_carries_every_topology_cell_even_when_empty() {
        let (_store, view, _anna) = setup();
        let grid = view.build_day_grid(d("2025-06-02"));

        assert_eq!(grid.calendar_week, 23);
        assert_eq!(grid.shifts.len(), 3, "Three production shifts");
        let cells_per_line = LINE_POSITIONS.len() + GENERIC_POSITIONS_PER_LINE as usize;
        for block in &grid.shifts {
            assert_eq!(block.lines.len(), LINES.len());
            for line in &block.lines {
                assert_eq!(
                    line.cells.len(),
                    cells_per_line,
                    "Every position of {} must be present",
                    line.line
                );
                assert!(line.cells.iter().all(|c| c.assignment.is_none()));
            }
        }
        assert_eq!(grid.special.len(), SPECIAL_ROLE_POSITIONS.len());
    }

    #[test]
    fn assignments_project_into_their_cells() {
        let (store, view, anna) = setup();
        let grid = AssignmentGrid::new(store);
        grid.assign(AssignSpec {
            date: d("2025-06-02"),
            shift: Shift::Spaet,
            line: "Linie 2".to_string(),
            position: "Packer".to_string(),
            employee_id: Some(anna.id.clone()),
            custom_name: None,
            color: None,
        })
        .unwrap();
        grid.assign(AssignSpec {
            date: d("2025-06-02"),
            shift: Shift::Sonder,
            line: String::new(),
            position: "Kantine".to_string(),
            employee_id: Some(anna.id.clone()),
            custom_name: None,
            color: None,
        })
        .unwrap();

        let day = view.build_day_grid(d("2025-06-02"));
        let spaet = day
            .shifts
            .iter()
            .find(|b| b.shift == Shift::Spaet)
            .unwrap();
        let line2 = spaet.lines.iter().find(|l| l.line == "Linie 2").unwrap();
        let packer_cell = line2.cells.iter().find(|c| c.position == "Packer").unwrap();
        let occupant = packer_cell.assignment.as_ref().unwrap();
        assert_eq!(occupant.employee_name.as_deref(), Some("Anna Muster"));

        let kantine = day.special.iter().find(|c| c.position == "Kantine").unwrap();
        assert!(kantine.assignment.is_some());
        // Other days are untouched.
        let other = view.build_day_grid(d("2025-06-03"));
        assert!(other
            .shifts
            .iter()
            .flat_map(|b| &b.lines)
            .flat_map(|l| &l.cells)
            .all(|c| c.assignment.is_none()));
    }

    #[test]
    fn summary_shows_countable_badges_only() {
        let (store, view, anna) = setup();
        let roster = RosterService::new(store.clone());
        let ledger = AbsenceLedger::new(store);
        let bernd = roster.add_employee("Bernd Beispiel", "Reiniger").unwrap();
        let clara = roster.add_employee("Clara Muster", "Lagerist").unwrap();

        ledger
            .set_absence(&anna.id, d("2025-06-02"), Some(AbsenceType::Urlaub))
            .unwrap();
        ledger
            .set_absence(&bernd.id, d("2025-06-02"), Some(AbsenceType::Krank))
            .unwrap();
        // A shift preference is transient and never a badge.
        ledger
            .set_absence(&clara.id, d("2025-06-02"), Some(AbsenceType::WunschNacht))
            .unwrap();

        let summary = view.build_absence_summary(d("2025-06-02"));
        assert!(!summary.holiday);
        assert_eq!(summary.badges.len(), 2);
        assert_eq!(summary.badges[0].employee_name, "Anna Muster");
        assert_eq!(summary.badges[0].kind, AbsenceType::Urlaub);
        assert_eq!(summary.badges[1].employee_name, "Bernd Beispiel");
    }

    #[test]
    fn feiertag_is_a_day_flag_not_a_badge() {
        let (store, view, anna) = setup();
        let ledger = AbsenceLedger::new(store);
        ledger
            .set_absence(&anna.id, d("2025-06-09"), Some(AbsenceType::Feiertag))
            .unwrap();

        let summary = view.build_absence_summary(d("2025-06-09"));
        assert!(summary.holiday);
        assert!(summary.badges.is_empty());
    }

    #[test]
    fn at_most_one_badge_per_employee() {
        let (store, view, anna) = setup();
        let ledger = AbsenceLedger::new(store);
        ledger
            .set_absence(&anna.id, d("2025-06-02"), Some(AbsenceType::Urlaub))
            .unwrap();
        let summary = view.build_absence_summary(d("2025-06-02"));
        assert_eq!(summary.badges.len(), 1);
    }
}
