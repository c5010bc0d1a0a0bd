//! Parsing and policy checks for the requested date range.
//!
//! [`validate`] is pure: the caller supplies "today" so results never depend
//! on the wall clock. Rules run in a fixed order and the first violation wins.

use crate::models::DateRange;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static COMPACT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})([0-9]{2})([0-9]{2})$").expect("static date pattern compiles"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid date format '{input}'. Use YYYYMMDD")]
    MalformedDate { input: String },

    #[error("Dates must be strictly before {today} (no today or future dates)")]
    FutureOrPresentDate { today: NaiveDate },

    #[error("End date must be after start date ({start} >= {end})")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("Dates must be on or after {earliest}")]
    BeforeDataAvailability { earliest: NaiveDate },

    #[error("Date range must be <= {max_days} days (got {days})")]
    RangeTooLarge { days: i64, max_days: i64 },
}

/// Parse an eight-digit `YYYYMMDD` string into a calendar date.
pub fn parse_compact_date(input: &str) -> Result<NaiveDate, ValidationError> {
    let malformed = || ValidationError::MalformedDate {
        input: input.to_string(),
    };

    let caps = COMPACT_DATE.captures(input).ok_or_else(malformed)?;
    let year: i32 = caps[1].parse().map_err(|_| malformed())?;
    let month: u32 = caps[2].parse().map_err(|_| malformed())?;
    let day: u32 = caps[3].parse().map_err(|_| malformed())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)
}

/// Validate the two boundary strings against the range policy.
///
/// Checks, in order: format, both dates before `today`, `end > start`,
/// `start >= earliest_supported`, and `end - start <= max_days`.
pub fn validate(
    start_str: &str,
    end_str: &str,
    today: NaiveDate,
    earliest_supported: NaiveDate,
    max_days: i64,
) -> Result<DateRange, ValidationError> {
    let start = parse_compact_date(start_str)?;
    let end = parse_compact_date(end_str)?;

    if start >= today || end >= today {
        return Err(ValidationError::FutureOrPresentDate { today });
    }
    if end <= start {
        return Err(ValidationError::InvertedRange { start, end });
    }
    if start < earliest_supported {
        return Err(ValidationError::BeforeDataAvailability {
            earliest: earliest_supported,
        });
    }

    let days = (end - start).num_days();
    if days > max_days {
        return Err(ValidationError::RangeTooLarge { days, max_days });
    }

    Ok(DateRange::new_unchecked(start, end))
}
