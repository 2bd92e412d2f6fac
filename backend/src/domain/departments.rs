//! Department list derived from records.
//!
//! Departments are never stored on their own. They are recomputed from the
//! record list on every read, keyed by exact (case-sensitive) label.

use shared::{BirthdayRecord, Department};

/// Unique departments with record counts, in order of first appearance.
/// Records without a department are left out.
pub fn extract_departments(records: &[BirthdayRecord]) -> Vec<Department> {
    let mut departments: Vec<Department> = Vec::new();

    for name in records.iter().filter_map(|r| r.department.as_deref()) {
        match departments.iter_mut().find(|d| d.name == name) {
            Some(existing) => existing.count += 1,
            None => departments.push(Department {
                name: name.to_string(),
                count: 1,
            }),
        }
    }

    departments
}

/// Drop every record labelled exactly `name`
pub fn remove_department(records: Vec<BirthdayRecord>, name: &str) -> Vec<BirthdayRecord> {
    records
        .into_iter()
        .filter(|record| record.department.as_deref() != Some(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codec::parse_birthdays_text;

    #[test]
    fn test_extract_in_first_seen_order() {
        let records = parse_birthdays_text(
            "A-1-1-a-Sales\nB-1-2-a-Ops\nC-1-3-b-Sales\nD-1-4-a\nE-1990-1-5-a-HR\nF-1-6-a-Ops",
        );

        let departments = extract_departments(&records);
        assert_eq!(
            departments,
            vec![
                Department { name: "Sales".to_string(), count: 2 },
                Department { name: "Ops".to_string(), count: 2 },
                Department { name: "HR".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_extract_is_case_sensitive() {
        let records = parse_birthdays_text("A-1-1-a-sales\nB-1-2-a-Sales");
        let names: Vec<String> = extract_departments(&records).into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["sales", "Sales"]);
    }

    #[test]
    fn test_extract_without_departments_is_empty() {
        let records = parse_birthdays_text("A-1-1-a\nB-1990-1-2-b");
        assert!(extract_departments(&records).is_empty());
    }

    #[test]
    fn test_remove_keeps_other_records() {
        let records = parse_birthdays_text("A-1-1-a-Sales\nB-1-2-a\nC-1-3-b-Ops\nD-1-4-a-Sales");

        let remaining = remove_department(records, "Sales");
        let names: Vec<&str> = remaining.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn test_remove_unknown_department_is_noop() {
        let records = parse_birthdays_text("A-1-1-a-Sales\nB-1-2-a");
        let remaining = remove_department(records.clone(), "sales");
        assert_eq!(remaining, records);
    }
}
