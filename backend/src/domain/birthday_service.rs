//! # Birthday Service
//!
//! Owns the `birthdays.txt` blob. Reads parse the stored text on every call;
//! structured edits (departments, records) parse leniently, apply the change
//! and write the re-serialized text back. Lines the lenient parser drops are
//! therefore not carried over by a structured edit. Concurrent writers are
//! last-write-wins.

use anyhow::Result;
use shared::{BirthdayRecord, Department, RecordFields, TodayBirthday};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::codec::{self, ParseReport};
use super::departments::{extract_departments, remove_department};
use super::today::{filter_today_birthdays, parse_leading_int, ReferenceDate};
use crate::storage::{KeyValueStore, BIRTHDAYS_KEY};

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{0}")]
    Invalid(String),
    #[error("Record not found")]
    NotFound,
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Reject fields that would not survive a write/parse cycle
fn validate_fields(fields: &RecordFields) -> Result<(), RecordError> {
    let all = [
        Some(fields.name.as_str()),
        fields.year.as_deref(),
        Some(fields.month.as_str()),
        Some(fields.day.as_str()),
        Some(fields.record_type.as_str()),
        fields.department.as_deref(),
    ];
    if all.iter().flatten().any(|f| f.contains(&['-', '\n', '\r'][..])) {
        return Err(RecordError::Invalid("Fields must not contain '-' or line breaks".to_string()));
    }
    if fields.name.trim().is_empty() {
        return Err(RecordError::Invalid("Name is required".to_string()));
    }
    if let Some(year) = fields.year.as_deref().filter(|y| !y.is_empty()) {
        if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RecordError::Invalid("Year must be four digits".to_string()));
        }
    }
    // Without a year, a four-digit month would be read back as the year
    let has_year = fields.year.as_deref().is_some_and(|y| !y.is_empty());
    if !has_year && codec::is_year(fields.month.trim()) {
        return Err(RecordError::Invalid("Month must not be a four-digit year".to_string()));
    }
    if parse_leading_int(&fields.month).is_none() || parse_leading_int(&fields.day).is_none() {
        return Err(RecordError::Invalid("Month and day must be numbers".to_string()));
    }
    if fields.record_type.trim().is_empty() {
        return Err(RecordError::Invalid("Type is required".to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct BirthdayService {
    store: Arc<dyn KeyValueStore>,
}

impl BirthdayService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored text, empty when nothing has been saved yet
    pub async fn get_text(&self) -> Result<String> {
        Ok(self.store.get(BIRTHDAYS_KEY).await?.unwrap_or_default())
    }

    /// Replace the stored text verbatim
    pub async fn save_text(&self, text: &str) -> Result<()> {
        self.store.put(BIRTHDAYS_KEY, text).await?;
        info!("Saved birthday text ({} bytes)", text.len());
        Ok(())
    }

    /// Store `text` only when the strict parser finds nothing to report.
    /// The report is returned either way.
    pub async fn save_text_strict(&self, text: &str) -> Result<ParseReport> {
        let report = codec::parse_birthdays_strict(text);
        if report.is_clean() {
            self.save_text(text).await?;
        } else {
            warn!("Strict save rejected with {} diagnostics", report.diagnostics.len());
        }
        Ok(report)
    }

    async fn load_records(&self) -> Result<Vec<BirthdayRecord>> {
        Ok(codec::parse_birthdays_text(&self.get_text().await?))
    }

    async fn store_records(&self, records: &[BirthdayRecord]) -> Result<()> {
        self.save_text(&codec::to_birthdays_text(records)).await
    }

    /// Parsed records together with what the strict parser flagged
    pub async fn list_records(&self) -> Result<ParseReport> {
        Ok(codec::parse_birthdays_strict(&self.get_text().await?))
    }

    pub async fn departments(&self) -> Result<Vec<Department>> {
        let departments = extract_departments(&self.load_records().await?);
        info!("Found {} departments", departments.len());
        Ok(departments)
    }

    /// Drop every record in department `name`, returning how many went
    pub async fn remove_department(&self, name: &str) -> Result<usize> {
        let records = self.load_records().await?;
        let before = records.len();

        let remaining = remove_department(records, name);
        let removed = before - remaining.len();

        self.store_records(&remaining).await?;
        info!("Removed department '{}' ({} records)", name, removed);
        Ok(removed)
    }

    pub async fn add_record(&self, fields: RecordFields) -> Result<BirthdayRecord, RecordError> {
        validate_fields(&fields)?;

        let added = codec::record_from_fields(fields.clone());
        let records = codec::add_record(self.load_records().await?, fields);
        self.store_records(&records).await?;

        info!("Added record '{}'", added.original_line);
        Ok(added)
    }

    /// Replace the record(s) whose source line is `original_line`
    pub async fn update_record(
        &self,
        original_line: &str,
        fields: RecordFields,
    ) -> Result<BirthdayRecord, RecordError> {
        validate_fields(&fields)?;

        let records = self.load_records().await?;
        if !records.iter().any(|r| r.original_line == original_line) {
            warn!("No record with line '{}'", original_line);
            return Err(RecordError::NotFound);
        }

        let updated = codec::record_from_fields(fields.clone());
        let records = codec::update_record(records, original_line, fields);
        self.store_records(&records).await?;

        info!("Updated record '{}' -> '{}'", original_line, updated.original_line);
        Ok(updated)
    }

    /// Remove the record(s) whose source line is `original_line`
    pub async fn delete_record(&self, original_line: &str) -> Result<(), RecordError> {
        let records = self.load_records().await?;
        let before = records.len();

        let remaining = codec::delete_record(records, original_line);
        if remaining.len() == before {
            warn!("No record with line '{}'", original_line);
            return Err(RecordError::NotFound);
        }

        self.store_records(&remaining).await?;
        info!("Deleted record '{}'", original_line);
        Ok(())
    }

    /// Records whose birthday falls on `today`
    pub async fn today_birthdays(&self, today: &ReferenceDate) -> Result<Vec<TodayBirthday>> {
        let matches = filter_today_birthdays(&self.load_records().await?, today);
        info!("{} birthdays on {} (lunar {})", matches.len(), today.solar, today.lunar);
        Ok(matches)
    }
}
