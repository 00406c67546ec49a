//! Core data types for calperiod.
//!
//! This module defines the primary types used throughout the library:
//! - [`UnitKind`] - Calendar unit granularity (year/month/week/day)
//! - [`WeekStart`] - Week boundary configuration
//! - [`EventMeta`] - The slice of an event the core cares about
//! - [`Occurrence`] - A concrete instance of an event
//! - [`OccurrenceClass`] - How an occurrence relates to a period
//! - [`Classification`] - A classified occurrence

use std::cmp::Ordering;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::PeriodError;

/// Calendar unit granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Jan 1 00:00:00 to the next Jan 1 00:00:00 in local time
    Year,
    /// 1st day 00:00:00 to 1st of next month 00:00:00
    Month,
    /// Week start 00:00:00 to next week start 00:00:00
    Week,
    /// 00:00:00 to next day 00:00:00
    #[default]
    Day,
}

impl std::fmt::Display for UnitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitKind::Year => write!(f, "year"),
            UnitKind::Month => write!(f, "month"),
            UnitKind::Week => write!(f, "week"),
            UnitKind::Day => write!(f, "day"),
        }
    }
}

impl FromStr for UnitKind {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "year" => Ok(UnitKind::Year),
            "month" => Ok(UnitKind::Month),
            "week" => Ok(UnitKind::Week),
            "day" => Ok(UnitKind::Day),
            _ => Err(PeriodError::ParseError(format!(
                "Unknown unit: '{}'. Expected 'year', 'month', 'week', or 'day'",
                s
            ))),
        }
    }
}

/// Week start day configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// Week starts on Monday (ISO 8601)
    #[default]
    Monday,
    /// Week starts on Sunday
    Sunday,
}

impl WeekStart {
    /// The weekday a week begins on.
    pub fn first_weekday(self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }

    /// Days between the start of the week and `weekday`.
    pub fn days_from_start(self, weekday: Weekday) -> u64 {
        match self {
            WeekStart::Monday => u64::from(weekday.num_days_from_monday()),
            // Sunday = 0, Monday = 1, ..., Saturday = 6
            WeekStart::Sunday => u64::from(weekday.num_days_from_sunday()),
        }
    }

    /// All seven weekdays in display order, beginning with the first day.
    ///
    /// ```
    /// use calperiod_core::WeekStart;
    /// use chrono::Weekday;
    ///
    /// assert_eq!(WeekStart::Sunday.weekdays()[0], Weekday::Sun);
    /// assert_eq!(WeekStart::Sunday.weekdays()[6], Weekday::Sat);
    /// ```
    pub fn weekdays(self) -> [Weekday; 7] {
        let mut days = [self.first_weekday(); 7];
        for i in 1..7 {
            days[i] = days[i - 1].succ();
        }
        days
    }

    /// Three-letter weekday names in display order.
    pub fn weekday_abbrs(self) -> [&'static str; 7] {
        self.weekdays().map(|day| match day {
            Weekday::Mon => "Mon",
            Weekday::Tue => "Tue",
            Weekday::Wed => "Wed",
            Weekday::Thu => "Thu",
            Weekday::Fri => "Fri",
            Weekday::Sat => "Sat",
            Weekday::Sun => "Sun",
        })
    }
}

impl std::fmt::Display for WeekStart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeekStart::Monday => write!(f, "monday"),
            WeekStart::Sunday => write!(f, "sunday"),
        }
    }
}

impl FromStr for WeekStart {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "monday" => Ok(WeekStart::Monday),
            "sunday" => Ok(WeekStart::Sunday),
            _ => Err(PeriodError::ParseError(format!(
                "Unknown week start: '{}'. Expected 'monday' or 'sunday'",
                s
            ))),
        }
    }
}

/// Event attributes the period machinery reads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventMeta {
    /// Stable event identifier.
    pub id: String,
    /// Human readable title.
    #[serde(default)]
    pub title: String,
    /// Whether occurrences of this event span whole days.
    #[serde(default)]
    pub all_day: bool,
}

impl EventMeta {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            all_day: false,
        }
    }

    pub fn all_day(mut self, all_day: bool) -> Self {
        self.all_day = all_day;
        self
    }
}

/// A single concrete instance of an event.
///
/// `original_start`/`original_end` identify the generated slot this
/// occurrence stands for; they differ from `start`/`end` only for persisted
/// overrides that moved the occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub event: Arc<EventMeta>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub cancelled: bool,
    pub original_start: DateTime<Utc>,
    pub original_end: DateTime<Utc>,
}

impl Occurrence {
    pub fn new(event: Arc<EventMeta>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            event,
            start,
            end,
            cancelled: false,
            original_start: start,
            original_end: end,
        }
    }

    pub fn cancelled(mut self, cancelled: bool) -> Self {
        self.cancelled = cancelled;
        self
    }

    /// Mark this occurrence as an override of the generated slot `[start, end)`.
    pub fn replacing(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.original_start = start;
        self.original_end = end;
        self
    }

    pub fn is_all_day(&self) -> bool {
        self.event.all_day
    }

    /// Strict overlap with `[start, end)`: touching either edge does not count.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    /// True if `self` is a persisted override for the generated `other`.
    pub fn overrides(&self, other: &Occurrence) -> bool {
        self.event.id == other.event.id
            && self.original_start == other.start
            && self.original_end == other.end
    }

    /// Chronological order: by start, then by end.
    pub fn cmp_bounds(&self, other: &Occurrence) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
    }
}

/// How an occurrence relates to the boundaries of a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u8")]
pub enum OccurrenceClass {
    /// Started in the period, ends after it.
    StartedOnly,
    /// Started and ended in the period.
    StartedAndEnded,
    /// Neither started nor ended in the period but exists during it.
    SpansThrough,
    /// Started before the period, ended in it.
    EndedOnly,
}

impl OccurrenceClass {
    /// Numeric code used by presentation layers (0 to 3).
    pub fn code(self) -> u8 {
        match self {
            OccurrenceClass::StartedOnly => 0,
            OccurrenceClass::StartedAndEnded => 1,
            OccurrenceClass::SpansThrough => 2,
            OccurrenceClass::EndedOnly => 3,
        }
    }
}

impl From<OccurrenceClass> for u8 {
    fn from(class: OccurrenceClass) -> Self {
        class.code()
    }
}

impl std::fmt::Display for OccurrenceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OccurrenceClass::StartedOnly => write!(f, "starts"),
            OccurrenceClass::StartedAndEnded => write!(f, "within"),
            OccurrenceClass::SpansThrough => write!(f, "continues"),
            OccurrenceClass::EndedOnly => write!(f, "ends"),
        }
    }
}

/// An occurrence together with its relationship to a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    pub occurrence: &'a Occurrence,
    pub class: OccurrenceClass,
    pub all_day: bool,
}
