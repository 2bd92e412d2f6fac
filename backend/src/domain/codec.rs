//! Flat-text birthday record format.
//!
//! One record per line, fields separated by `-`:
//!
//! ```text
//! Alice-1990-5-20-a-Sales    name, year, month, day, type, department
//! Bob-5-20-b                 name, month, day, type
//! ```
//!
//! The second field is a year only when it is exactly four ASCII digits.
//! Parsing is lenient: blank lines and lines with fewer than four fields are
//! dropped without error. [`parse_birthdays_strict`] yields the same records
//! and additionally reports what was dropped or looks suspicious.

use shared::{BirthdayRecord, DiagnosticReason, ParseDiagnostic, RecordFields, LUNAR_TYPE, SOLAR_TYPE};

use super::today::parse_leading_int;

const SEPARATOR: char = '-';
const MIN_FIELDS: usize = 4;

/// Records plus everything the strict parser flagged
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub records: Vec<BirthdayRecord>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

pub(crate) fn is_year(segment: &str) -> bool {
    segment.len() == 4 && segment.bytes().all(|b| b.is_ascii_digit())
}

fn non_empty(segment: Option<&str>) -> Option<String> {
    segment.filter(|s| !s.is_empty()).map(str::to_string)
}

/// Parse a single non-blank line, or `None` when it has too few fields
fn parse_line(line: &str) -> Option<BirthdayRecord> {
    let parts: Vec<&str> = line.split(SEPARATOR).map(str::trim).collect();
    if parts.len() < MIN_FIELDS {
        return None;
    }

    // Offset of the month field: 2 when a year is present
    let (year, base) = if is_year(parts[1]) {
        (Some(parts[1].to_string()), 2)
    } else {
        (None, 1)
    };

    Some(BirthdayRecord {
        name: parts[0].to_string(),
        year,
        month: parts[base].to_string(),
        day: parts[base + 1].to_string(),
        record_type: parts.get(base + 2).copied().unwrap_or_default().to_string(),
        department: non_empty(parts.get(base + 3).copied()),
        original_line: line.to_string(),
    })
}

/// Parse the stored text into records, silently dropping malformed lines
pub fn parse_birthdays_text(text: &str) -> Vec<BirthdayRecord> {
    text.split('\n')
        .filter(|line| !line.trim().is_empty())
        .filter_map(parse_line)
        .collect()
}

/// Parse the stored text and report every problem found along the way
pub fn parse_birthdays_strict(text: &str) -> ParseReport {
    let mut report = ParseReport::default();

    for (index, line) in text.split('\n').enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut flag = |reason: DiagnosticReason| {
            report.diagnostics.push(ParseDiagnostic {
                line_number: index + 1,
                line: line.to_string(),
                reason,
            })
        };

        let Some(record) = parse_line(line) else {
            flag(DiagnosticReason::TooFewFields);
            continue;
        };

        if record.name.is_empty() {
            flag(DiagnosticReason::EmptyName);
        }
        if parse_leading_int(&record.month).is_none() || parse_leading_int(&record.day).is_none() {
            flag(DiagnosticReason::NonNumericDate);
        }
        match record.record_type.as_str() {
            "" => flag(DiagnosticReason::MissingType),
            SOLAR_TYPE | LUNAR_TYPE => {}
            _ => flag(DiagnosticReason::UnknownCalendarType),
        }

        report.records.push(record);
    }

    report
}

/// Serialize a single record as `name[-year]-month-day-type[-department]`
pub fn record_to_line(record: &BirthdayRecord) -> String {
    let mut parts = vec![record.name.as_str()];
    if let Some(year) = record.year.as_deref().filter(|y| !y.is_empty()) {
        parts.push(year);
    }
    parts.extend([record.month.as_str(), record.day.as_str(), record.record_type.as_str()]);
    if let Some(department) = record.department.as_deref().filter(|d| !d.is_empty()) {
        parts.push(department);
    }
    parts.join("-")
}

/// Serialize records back to text, one per line
pub fn to_birthdays_text(records: &[BirthdayRecord]) -> String {
    records.iter().map(record_to_line).collect::<Vec<_>>().join("\n")
}

/// Build a record from client-supplied fields.
/// The source line is every non-empty field joined by `-`
pub fn record_from_fields(fields: RecordFields) -> BirthdayRecord {
    let year = non_empty(fields.year.as_deref());
    let department = non_empty(fields.department.as_deref());

    let original_line = [
        Some(fields.name.as_str()),
        year.as_deref(),
        Some(fields.month.as_str()),
        Some(fields.day.as_str()),
        Some(fields.record_type.as_str()),
        department.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter(|part| !part.is_empty())
    .collect::<Vec<_>>()
    .join("-");

    BirthdayRecord {
        name: fields.name,
        year,
        month: fields.month,
        day: fields.day,
        record_type: fields.record_type,
        department,
        original_line,
    }
}

/// Append a new record
pub fn add_record(mut records: Vec<BirthdayRecord>, fields: RecordFields) -> Vec<BirthdayRecord> {
    records.push(record_from_fields(fields));
    records
}

/// Replace every record whose source line equals `original_line`
pub fn update_record(
    records: Vec<BirthdayRecord>,
    original_line: &str,
    fields: RecordFields,
) -> Vec<BirthdayRecord> {
    let updated = record_from_fields(fields);
    records
        .into_iter()
        .map(|record| {
            if record.original_line == original_line {
                updated.clone()
            } else {
                record
            }
        })
        .collect()
}

/// Remove every record whose source line equals `original_line`
pub fn delete_record(records: Vec<BirthdayRecord>, original_line: &str) -> Vec<BirthdayRecord> {
    records
        .into_iter()
        .filter(|record| record.original_line != original_line)
        .collect()
}
