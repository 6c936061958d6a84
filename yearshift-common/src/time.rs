//! Timestamp utilities
//!
//! Parsing and formatting of ISO-8601 UTC timestamps, plus the calendar-year
//! shift used by the backfill transform.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};

use crate::{Error, Result};

/// Parse an ISO-8601 timestamp into UTC.
///
/// Accepts full RFC 3339 timestamps with any offset (converted to UTC) and
/// bare `YYYY-MM-DD` dates, which are taken as midnight UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc())
            .ok_or_else(|| Error::InvalidTimestamp {
                value: value.to_string(),
                reason: "midnight out of range".to_string(),
            }),
        Err(e) => Err(Error::InvalidTimestamp {
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Format a UTC timestamp as ISO-8601 with millisecond precision and `Z` suffix
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Gregorian leap year rule
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Move `timestamp` forward by `years` whole calendar years.
///
/// Month, day, time of day and sub-second part are kept. Returns `None` when
/// the target date does not exist (Feb 29 into a non-leap year) or the target
/// year is outside the representable range.
pub fn shift_years(timestamp: &DateTime<Utc>, years: u32) -> Option<DateTime<Utc>> {
    let offset = i32::try_from(years).ok()?;
    let target_year = timestamp.year().checked_add(offset)?;
    timestamp.with_year(target_year)
}
