//! Timezone handling utilities.
//!
//! This module parses timezone names, normalizes points in time to UTC and
//! resolves local wall-clock times (including DST gaps and overlaps) to
//! UTC instants.

use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use crate::config::{AmbiguousPolicy, PeriodConfig};
use crate::error::{PeriodError, Result};

/// Search bound for the last valid local time before a DST gap.
/// The wide bound handles rare historical transitions with large gaps.
const MAX_GAP_MINUTES: i64 = 2 * 24 * 60;

/// A point in time that may or may not carry zone information.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointInTime {
    /// Wall-clock time with no zone attached.
    Naive(NaiveDateTime),
    /// An absolute instant.
    Aware(DateTime<Utc>),
}

impl PointInTime {
    /// The calendar date of this point as seen in `zone`.
    ///
    /// Naive points use their own date; aware instants are converted to
    /// `zone` (UTC when absent) first.
    pub fn date_in(self, zone: Option<Tz>) -> NaiveDate {
        match self {
            PointInTime::Naive(naive) => naive.date(),
            PointInTime::Aware(instant) => instant.with_timezone(&zone.unwrap_or(Tz::UTC)).date_naive(),
        }
    }
}

impl From<NaiveDateTime> for PointInTime {
    fn from(naive: NaiveDateTime) -> Self {
        PointInTime::Naive(naive)
    }
}

impl From<NaiveDate> for PointInTime {
    fn from(date: NaiveDate) -> Self {
        PointInTime::Naive(date.and_time(NaiveTime::MIN))
    }
}

impl<Z: TimeZone> From<DateTime<Z>> for PointInTime {
    fn from(dt: DateTime<Z>) -> Self {
        PointInTime::Aware(dt.with_timezone(&Utc))
    }
}

/// How a local wall-clock time maps onto a timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalStatus {
    /// Exactly one instant.
    Normal,
    /// Two instants (DST fall back).
    Ambiguous,
    /// No instant (DST spring forward).
    Nonexistent,
}

impl std::fmt::Display for LocalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalStatus::Normal => write!(f, "normal"),
            LocalStatus::Ambiguous => write!(f, "ambiguous"),
            LocalStatus::Nonexistent => write!(f, "nonexistent"),
        }
    }
}

/// Parse an IANA timezone name into a [`chrono_tz::Tz`].
///
/// # Examples
///
/// ```
/// use calperiod_core::tz::parse_tz;
///
/// let tz = parse_tz("Europe/Berlin").unwrap();
/// assert_eq!(tz.to_string(), "Europe/Berlin");
/// ```
pub fn parse_tz(name: &str) -> Result<Tz> {
    name.parse::<Tz>()
        .map_err(|_| PeriodError::InvalidTimezone(name.to_string()))
}

/// Normalize a point in time to a UTC instant.
///
/// - Aware points are converted directly.
/// - Naive points with a zone are interpreted in that zone, whether or not
///   timezone support is enabled. Callers decide which zone to pass.
/// - Naive points without a zone are taken as UTC; without timezone
///   support the value is the UTC-equivalent wall clock.
///
/// This never fails: local times that do not map cleanly onto `zone` are
/// resolved by [`local_to_utc`].
pub fn normalize(point: PointInTime, zone: Option<Tz>, config: &PeriodConfig) -> DateTime<Utc> {
    match (point, zone) {
        (PointInTime::Aware(instant), _) => instant,
        (PointInTime::Naive(naive), Some(tz)) => local_to_utc(naive, tz, config.ambiguous),
        // With timezone support the naive value already is UTC; without it
        // the wall clock stands in for UTC. Both land on the same instant.
        (PointInTime::Naive(naive), None) => naive.and_utc(),
    }
}

/// Classify how `local` maps onto `tz`.
pub fn inspect_local(local: NaiveDateTime, tz: Tz) -> LocalStatus {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(_) => LocalStatus::Normal,
        LocalResult::Ambiguous(_, _) => LocalStatus::Ambiguous,
        LocalResult::None => LocalStatus::Nonexistent,
    }
}

/// Convert a local datetime in a specific timezone to UTC.
///
/// Ambiguous times resolve by `policy`. Nonexistent times keep the offset
/// in force before the gap, so 02:30 in a skipped 02:00-03:00 hour becomes
/// 03:30 local.
pub fn local_to_utc(local: NaiveDateTime, tz: Tz, policy: AmbiguousPolicy) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(first, second) => match policy {
            AmbiguousPolicy::First => first.with_timezone(&Utc),
            AmbiguousPolicy::Second => second.with_timezone(&Utc),
        },
        LocalResult::None => offset_before_gap(local, tz)
            .and_then(|offset_seconds| local.checked_sub_signed(chrono::Duration::seconds(offset_seconds)))
            .map(|shifted| shifted.and_utc())
            // Fallback: construct from local components
            .unwrap_or_else(|| local.and_utc()),
    }
}

/// UTC offset (in seconds) of the last valid local time before `local`.
fn offset_before_gap(local: NaiveDateTime, tz: Tz) -> Option<i64> {
    (1..=MAX_GAP_MINUTES).find_map(|minutes| {
        let candidate = local.checked_sub_signed(chrono::Duration::minutes(minutes))?;
        tz.from_local_datetime(&candidate)
            .latest()
            .map(|dt| i64::from(dt.offset().fix().local_minus_utc()))
    })
}

/// Convert local midnight of `date` to UTC.
///
/// Without a zone the naive midnight is used as the UTC boundary.
pub fn local_midnight_to_utc(date: NaiveDate, zone: Option<Tz>, policy: AmbiguousPolicy) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match zone {
        Some(tz) => local_to_utc(midnight, tz, policy),
        None => midnight.and_utc(),
    }
}

/// Format a datetime as RFC3339 with timezone offset.
///
/// # Returns
///
/// An RFC3339 formatted string (e.g., "2026-03-29T00:00:00+01:00").
pub fn format_rfc3339<T: TimeZone>(dt: &DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Format a UTC datetime as RFC3339 with Z suffix.
///
/// # Returns
///
/// An RFC3339 formatted string with Z suffix (e.g., "2026-03-28T23:00:00Z").
pub fn format_rfc3339_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
