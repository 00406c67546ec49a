//! Input parsing for points in time.
//!
//! Accepted inputs, tried in this order:
//! - RFC3339 with offset or `Z` (e.g., `2026-03-29T00:15:00Z`): an aware instant
//! - naive datetime (e.g., `2026-03-29T02:30:00`, `2026-03-29 02:30`)
//! - plain date (e.g., `2026-03-29`): naive midnight
//! - integer: Unix epoch seconds, or milliseconds when large enough

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{PeriodError, Result};
use crate::tz::PointInTime;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a point in time, auto-detecting its format.
///
/// # Examples
///
/// ```
/// use calperiod_core::parse::parse_point;
/// use calperiod_core::tz::PointInTime;
///
/// assert!(matches!(parse_point("2026-03-29").unwrap(), PointInTime::Naive(_)));
/// assert!(matches!(parse_point("2026-03-29T00:15:00Z").unwrap(), PointInTime::Aware(_)));
/// ```
pub fn parse_point(input: &str) -> Result<PointInTime> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(PointInTime::Aware(dt.with_timezone(&Utc)));
    }

    for fmt in &NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Ok(PointInTime::Naive(naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date.into());
    }

    if let Ok(num) = trimmed.parse::<i64>() {
        // Heuristic: if the number is > 10^10, it's probably milliseconds
        // (year 2001 in seconds is ~10^9, year 2001 in ms is ~10^12)
        let instant = if num > 10_000_000_000 {
            Utc.timestamp_millis_opt(num).single()
        } else {
            Utc.timestamp_opt(num, 0).single()
        };
        return instant
            .map(PointInTime::Aware)
            .ok_or_else(|| PeriodError::ParseError(format!("Epoch value out of range: {}", num)));
    }

    Err(PeriodError::ParseError(format!(
        "Could not parse point in time: '{}'. Expected RFC3339, YYYY-MM-DDTHH:MM:SS, YYYY-MM-DD or epoch",
        input
    )))
}

/// Parse a naive local datetime (no offset allowed).
pub fn parse_local(input: &str) -> Result<NaiveDateTime> {
    match parse_point(input)? {
        PointInTime::Naive(naive) => Ok(naive),
        PointInTime::Aware(_) => Err(PeriodError::ParseError(format!(
            "Expected a local time without offset, got '{}'",
            input.trim()
        ))),
    }
}
