//! "Whose birthday is today" matching.
//!
//! Solar records (`type` other than `b`) match on today's civil month/day,
//! lunar records (`type == b`) on today's lunar month/day. Birth years are
//! ignored. Today is recomputed from the clock on every request.

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use shared::{BirthdayRecord, LunarDate, TodayBirthday};
use std::sync::Arc;

use super::lunar::solar_to_lunar;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl FixedClock {
    /// Noon UTC on the given date
    pub fn on(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default();
        Self(DateTime::from_naive_utc_and_offset(noon, Utc))
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Today's date in both calendars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceDate {
    pub solar: NaiveDate,
    pub lunar: LunarDate,
}

impl ReferenceDate {
    pub fn for_solar(solar: NaiveDate) -> Result<Self> {
        let lunar = solar_to_lunar(solar)?;
        Ok(Self { solar, lunar })
    }
}

/// Parse the leading integer of `input` the way lenient form input expects:
/// leading whitespace, an optional sign, then at least one digit. Anything
/// after the digits is ignored (`"05x"` is 5).
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let value: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -value } else { value })
}

fn matches_today(record: &BirthdayRecord, today: &ReferenceDate) -> bool {
    let (Some(month), Some(day)) = (parse_leading_int(&record.month), parse_leading_int(&record.day)) else {
        return false;
    };

    if record.is_lunar() {
        // An intercalary month carries no ordinary month number
        !today.lunar.is_leap
            && month == i64::from(today.lunar.month)
            && day == i64::from(today.lunar.day)
    } else {
        month == i64::from(today.solar.month()) && day == i64::from(today.solar.day())
    }
}

/// Records whose birthday falls on `today`, in input order
pub fn filter_today_birthdays(records: &[BirthdayRecord], today: &ReferenceDate) -> Vec<TodayBirthday> {
    records
        .iter()
        .filter(|record| matches_today(record, today))
        .map(|record| TodayBirthday {
            name: record.name.clone(),
            record_type: record.record_type.clone(),
            department: record.department.clone(),
            is_lunar: record.is_lunar(),
        })
        .collect()
}

/// Works out "today" for the configured time zone
#[derive(Clone)]
pub struct TodayService {
    clock: Arc<dyn Clock>,
    timezone: Tz,
}

impl TodayService {
    pub fn new(clock: Arc<dyn Clock>, timezone: Tz) -> Self {
        Self { clock, timezone }
    }

    /// Civil date in the configured zone
    pub fn solar_today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.timezone).date_naive()
    }

    /// Today in both calendars
    pub fn reference_date(&self) -> Result<ReferenceDate> {
        ReferenceDate::for_solar(self.solar_today())
    }
}
