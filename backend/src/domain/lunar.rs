//! Chinese lunisolar calendar conversion.
//!
//! Table driven, covering lunar years 1900 through 2100. Each table entry
//! encodes one lunar year:
//!
//! - bits 0-3: number of the month followed by a leap month (0 = none)
//! - bits 4-15: month sizes, bit `0x8000 >> (m - 1)` set when month `m` has 30 days
//! - bit 16: set when the leap month has 30 days (otherwise 29)
//!
//! Lunar 1900-01-01 fell on solar 1900-01-31, which anchors the day count.

use chrono::NaiveDate;
use shared::LunarDate;
use thiserror::Error;

const FIRST_YEAR: i32 = 1900;
const LAST_YEAR: i32 = 2100;

#[rustfmt::skip]
const LUNAR_INFO: [u32; 201] = [
    0x04bd8, 0x04ae0, 0x0a570, 0x054d5, 0x0d260, 0x0d950, 0x16554, 0x056a0, 0x09ad0, 0x055d2, // 1900
    0x04ae0, 0x0a5b6, 0x0a4d0, 0x0d250, 0x1d255, 0x0b540, 0x0d6a0, 0x0ada2, 0x095b0, 0x14977, // 1910
    0x04970, 0x0a4b0, 0x0b4b5, 0x06a50, 0x06d40, 0x1ab54, 0x02b60, 0x09570, 0x052f2, 0x04970, // 1920
    0x06566, 0x0d4a0, 0x0ea50, 0x16a95, 0x05ad0, 0x02b60, 0x186e3, 0x092e0, 0x1c8d7, 0x0c950, // 1930
    0x0d4a0, 0x1d8a6, 0x0b550, 0x056a0, 0x1a5b4, 0x025d0, 0x092d0, 0x0d2b2, 0x0a950, 0x0b557, // 1940
    0x06ca0, 0x0b550, 0x15355, 0x04da0, 0x0a5b0, 0x14573, 0x052b0, 0x0a9a8, 0x0e950, 0x06aa0, // 1950
    0x0aea6, 0x0ab50, 0x04b60, 0x0aae4, 0x0a570, 0x05260, 0x0f263, 0x0d950, 0x05b57, 0x056a0, // 1960
    0x096d0, 0x04dd5, 0x04ad0, 0x0a4d0, 0x0d4d4, 0x0d250, 0x0d558, 0x0b540, 0x0b6a0, 0x195a6, // 1970
    0x095b0, 0x049b0, 0x0a974, 0x0a4b0, 0x0b27a, 0x06a50, 0x06d40, 0x0af46, 0x0ab60, 0x09570, // 1980
    0x04af5, 0x04970, 0x064b0, 0x074a3, 0x0ea50, 0x06b58, 0x05ac0, 0x0ab60, 0x096d5, 0x092e0, // 1990
    0x0c960, 0x0d954, 0x0d4a0, 0x0da50, 0x07552, 0x056a0, 0x0abb7, 0x025d0, 0x092d0, 0x0cab5, // 2000
    0x0a950, 0x0b4a0, 0x0baa4, 0x0ad50, 0x055d9, 0x04ba0, 0x0a5b0, 0x15176, 0x052b0, 0x0a930, // 2010
    0x07954, 0x06aa0, 0x0ad50, 0x05b52, 0x04b60, 0x0a6e6, 0x0a4e0, 0x0d260, 0x0ea65, 0x0d530, // 2020
    0x05aa0, 0x076a3, 0x096d0, 0x04afb, 0x04ad0, 0x0a4d0, 0x1d0b6, 0x0d250, 0x0d520, 0x0dd45, // 2030
    0x0b5a0, 0x056d0, 0x055b2, 0x049b0, 0x0a577, 0x0a4b0, 0x0aa50, 0x1b255, 0x06d20, 0x0ada0, // 2040
    0x14b63, 0x09370, 0x049f8, 0x04970, 0x064b0, 0x168a6, 0x0ea50, 0x06b20, 0x1a6c4, 0x0aae0, // 2050
    0x092e0, 0x0d2e3, 0x0c960, 0x0d557, 0x0d4a0, 0x0da50, 0x05d55, 0x056a0, 0x0a6d0, 0x055d4, // 2060
    0x052d0, 0x0a9b8, 0x0a950, 0x0b4a0, 0x0b6a6, 0x0ad50, 0x055a0, 0x0aba4, 0x0a5b0, 0x052b0, // 2070
    0x0b273, 0x06930, 0x07337, 0x06aa0, 0x0ad50, 0x14b55, 0x04b60, 0x0a570, 0x054e4, 0x0d160, // 2080
    0x0e968, 0x0d520, 0x0daa0, 0x16aa6, 0x056d0, 0x04ae0, 0x0a9d4, 0x0a2d0, 0x0d150, 0x0f252, // 2090
    0x0d520,                                                                                   // 2100
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CalendarError {
    #[error("date {0} is outside the supported range 1900-01-31 to 2100-12-31")]
    OutOfRange(NaiveDate),
}

fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(FIRST_YEAR, 1, 31).expect("epoch is a valid date")
}

fn last_supported_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(LAST_YEAR, 12, 31).expect("range end is a valid date")
}

fn info(year: i32) -> u32 {
    LUNAR_INFO[(year - FIRST_YEAR) as usize]
}

/// Month followed by a leap month in `year`, 0 when there is none
fn leap_month(year: i32) -> u32 {
    info(year) & 0xf
}

fn leap_month_days(year: i32) -> i64 {
    match leap_month(year) {
        0 => 0,
        _ if info(year) & 0x10000 != 0 => 30,
        _ => 29,
    }
}

fn month_days(year: i32, month: u32) -> i64 {
    if info(year) & (0x10000 >> month) != 0 {
        30
    } else {
        29
    }
}

fn year_days(year: i32) -> i64 {
    (1..=12).map(|m| month_days(year, m)).sum::<i64>() + leap_month_days(year)
}

/// Convert a solar date to its lunar equivalent
pub fn solar_to_lunar(date: NaiveDate) -> Result<LunarDate, CalendarError> {
    if date < epoch() || date > last_supported_day() {
        return Err(CalendarError::OutOfRange(date));
    }

    let mut offset = (date - epoch()).num_days();

    let mut year = FIRST_YEAR;
    while offset >= year_days(year) {
        offset -= year_days(year);
        year += 1;
    }

    let leap = leap_month(year);
    for month in 1..=12 {
        let days = month_days(year, month);
        if offset < days {
            return Ok(LunarDate { year, month, day: offset as u32 + 1, is_leap: false });
        }
        offset -= days;

        if month == leap {
            let days = leap_month_days(year);
            if offset < days {
                return Ok(LunarDate { year, month, day: offset as u32 + 1, is_leap: true });
            }
            offset -= days;
        }
    }

    // The year loop leaves fewer days than the year holds
    unreachable!("lunar year {} exhausted with {} days left", year, offset)
}

/// Convert a lunar date to the solar calendar.
///
/// Returns `None` when the lunar date does not exist: a month or day out of
/// range, a leap flag on a month that has no leap month that year, or a year
/// outside the table.
pub fn lunar_to_solar(lunar: LunarDate) -> Option<NaiveDate> {
    if !(FIRST_YEAR..=LAST_YEAR).contains(&lunar.year) || !(1..=12).contains(&lunar.month) {
        return None;
    }

    let leap = leap_month(lunar.year);
    if lunar.is_leap && leap != lunar.month {
        return None;
    }

    let length = if lunar.is_leap {
        leap_month_days(lunar.year)
    } else {
        month_days(lunar.year, lunar.month)
    };
    if lunar.day < 1 || i64::from(lunar.day) > length {
        return None;
    }

    let mut offset: i64 = (FIRST_YEAR..lunar.year).map(year_days).sum();
    for month in 1..lunar.month {
        offset += month_days(lunar.year, month);
        if month == leap {
            offset += leap_month_days(lunar.year);
        }
    }
    if lunar.is_leap {
        offset += month_days(lunar.year, lunar.month);
    }
    offset += i64::from(lunar.day) - 1;

    let date = epoch() + chrono::Duration::days(offset);
    (date <= last_supported_day()).then_some(date)
}
