// src/roster_tests.rs

#[cfg(test)]
mod tests {
    use crate::absence::AbsenceLedger;
    use crate::grid::{AssignSpec, AssignmentGrid};
    use crate::plan::{AbsenceType, PlanError, Role, Shift};
    use crate::roster::RosterService;
    use crate::store::PlanStore;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn d(date_str: &str) -> NaiveDate {
        NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
            .unwrap_or_else(|_| panic!("Invalid date string format: {}", date_str))
    }

    fn setup() -> (Arc<PlanStore>, RosterService) {
        let store = Arc::new(PlanStore::new());
        let roster = RosterService::new(store.clone());
        (store, roster)
    }

    #[test]
    fn add_employee_is_an_idempotent_upsert_by_name() {
        let (_store, roster) = setup();
        let first = roster.add_employee("Anna Muster", "Packer").unwrap();
        let second = roster.add_employee("Anna Muster", "Packer").unwrap();
        assert_eq!(
            first.id, second.id,
            "Adding an existing name must return the existing record"
        );
        assert_eq!(roster.list_employees().unwrap().len(), 1);
    }

    #[test]
    fn add_employee_upserts_on_the_trimmed_name() {
        let (_store, roster) = setup();
        let first = roster.add_employee("  Anna Muster  ", "Packer").unwrap();
        assert_eq!(first.name, "Anna Muster");
        let second = roster.add_employee("Anna Muster", "Teamleiter").unwrap();
        assert_eq!(first.id, second.id);
        // Existing record is returned unchanged, role included.
        assert_eq!(second.role, Role::Packer);
    }

    #[test]
    fn add_employee_rejects_empty_name_and_unknown_role() {
        let (_store, roster) = setup();
        assert!(matches!(
            roster.add_employee("   ", "Packer"),
            Err(PlanError::MissingField("name"))
        ));
        assert!(matches!(
            roster.add_employee("Bernd Beispiel", "Pilot"),
            Err(PlanError::UnknownRole(_))
        ));
        assert!(roster.list_employees().unwrap().is_empty());
    }

    #[test]
    fn update_employee_changes_name_and_role_in_place() {
        let (_store, roster) = setup();
        let anna = roster.add_employee("Anna Muster", "Packer").unwrap();
        let updated = roster
            .update_employee(&anna.id, "Anna Musterfrau", "Linienführer")
            .unwrap();
        assert_eq!(updated.id, anna.id);
        assert_eq!(updated.name, "Anna Musterfrau");
        assert_eq!(updated.role, Role::Linienfuehrer);
        assert_eq!(roster.list_employees().unwrap().len(), 1);
    }

    #[test]
    fn update_employee_rejects_a_taken_name() {
        let (_store, roster) = setup();
        roster.add_employee("Anna Muster", "Packer").unwrap();
        let bernd = roster.add_employee("Bernd Beispiel", "Reiniger").unwrap();
        let result = roster.update_employee(&bernd.id, "Anna Muster", "Reiniger");
        assert!(matches!(result, Err(PlanError::NameTaken { .. })));
        // Renaming to its own current name is not a conflict.
        assert!(roster
            .update_employee(&bernd.id, "Bernd Beispiel", "Lagerist")
            .is_ok());
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let (_store, roster) = setup();
        assert!(matches!(
            roster.update_employee("ffffffffffffffff", "Anna", "Packer"),
            Err(PlanError::EmployeeNotFound { .. })
        ));
    }

    #[test]
    fn update_of_unknown_id_is_not_found_even_when_the_name_is_taken() {
        let (_store, roster) = setup();
        roster.add_employee("Anna Muster", "Packer").unwrap();
        let result = roster.update_employee("ffffffffffffffff", "Anna Muster", "Packer");
        assert!(
            matches!(result, Err(PlanError::EmployeeNotFound { .. })),
            "Missing id must resolve before the name conflict, got {:?}",
            result
        );
    }

    #[test]
    fn delete_employee_cascades_to_assignments_and_absences() {
        let (store, roster) = setup();
        let grid = AssignmentGrid::new(store.clone());
        let ledger = AbsenceLedger::new(store.clone());

        let anna = roster.add_employee("Anna Muster", "Packer").unwrap();
        let bernd = roster.add_employee("Bernd Beispiel", "Reiniger").unwrap();
        for (day, position) in [
            ("2025-06-02", "Packer"),
            ("2025-06-03", "Packer"),
            ("2025-06-04", "Position 1"),
        ] {
            grid.assign(AssignSpec {
                date: d(day),
                shift: Shift::Frueh,
                line: "Linie 1".to_string(),
                position: position.to_string(),
                employee_id: Some(anna.id.clone()),
                custom_name: None,
                color: None,
            })
            .unwrap();
        }
        ledger
            .set_absence(&anna.id, d("2025-06-10"), Some(AbsenceType::Urlaub))
            .unwrap();
        ledger
            .set_absence(&anna.id, d("2025-06-11"), Some(AbsenceType::Zeitausgleich))
            .unwrap();
        ledger
            .set_absence(&bernd.id, d("2025-06-10"), Some(AbsenceType::Urlaub))
            .unwrap();

        roster.delete_employee(&anna.id).unwrap();

        let data = store.lock().unwrap();
        assert!(data.employee_by_id(&anna.id).is_none());
        assert_eq!(
            data.assignments
                .values()
                .filter(|a| a.employee_id.as_deref() == Some(anna.id.as_str()))
                .count(),
            0,
            "No assignment may still reference the deleted employee"
        );
        assert_eq!(
            data.absences.keys().filter(|(emp, _)| *emp == anna.id).count(),
            0,
            "No absence may still reference the deleted employee"
        );
        // Unrelated records survive the cascade.
        assert_eq!(data.absences.len(), 1);
        assert!(data.employee_by_id(&bernd.id).is_some());
    }

    #[test]
    fn delete_of_unknown_id_is_not_found() {
        let (_store, roster) = setup();
        assert!(matches!(
            roster.delete_employee("ffffffffffffffff"),
            Err(PlanError::EmployeeNotFound { .. })
        ));
    }

    #[test]
    fn list_returns_insertion_order() {
        let (_store, roster) = setup();
        for name in ["Clara", "Anna", "Bernd"] {
            roster.add_employee(name, "Packer").unwrap();
        }
        let names: Vec<String> = roster
            .list_employees()
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Clara", "Anna", "Bernd"]);
    }
}
