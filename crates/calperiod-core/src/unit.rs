//! Calendar units: years, months, weeks and days.
//!
//! A [`CalendarUnit`] is a [`Period`] whose bounds follow from an anchor and
//! the unit's boundary rule. Units know their neighbours and the coarser
//! units containing them.

use std::fmt;
use std::ops::Deref;

use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{PeriodError, Result};
use crate::models::UnitKind;
use crate::period::{Inherited, Period, PeriodContext};
use crate::tz::PointInTime;

/// A year, month, week or day over a set of events.
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarUnit {
    kind: UnitKind,
    period: Period,
}

impl CalendarUnit {
    /// The unit of `kind` containing `anchor`.
    ///
    /// Aware anchors are located in the context's reference zone; naive
    /// anchors use their own date.
    ///
    /// # Examples
    ///
    /// ```
    /// use calperiod_core::{CalendarUnit, FixedEvent, PeriodContext, UnitKind};
    /// use chrono::NaiveDate;
    ///
    /// let context = PeriodContext::from_sources(Vec::<FixedEvent>::new());
    /// let anchor = NaiveDate::from_ymd_opt(2024, 2, 10).unwrap();
    /// let month = CalendarUnit::new(UnitKind::Month, context, anchor).unwrap();
    /// assert_eq!(month.key(), "2024-02");
    /// assert_eq!(month.get_days().unwrap().len(), 29);
    /// ```
    pub fn new(kind: UnitKind, context: PeriodContext, anchor: impl Into<PointInTime>) -> Result<Self> {
        let point: PointInTime = anchor.into();
        let date = point.date_in(context.reference_zone());
        Self::build(kind, context, date, Inherited::default())
    }

    /// The unit of `kind` containing the current instant.
    pub fn containing_now(kind: UnitKind, context: PeriodContext) -> Result<Self> {
        Self::new(kind, context, chrono::Utc::now())
    }

    pub fn year(context: PeriodContext, anchor: impl Into<PointInTime>) -> Result<Self> {
        Self::new(UnitKind::Year, context, anchor)
    }

    pub fn month(context: PeriodContext, anchor: impl Into<PointInTime>) -> Result<Self> {
        Self::new(UnitKind::Month, context, anchor)
    }

    pub fn week(context: PeriodContext, anchor: impl Into<PointInTime>) -> Result<Self> {
        Self::new(UnitKind::Week, context, anchor)
    }

    pub fn day(context: PeriodContext, anchor: impl Into<PointInTime>) -> Result<Self> {
        Self::new(UnitKind::Day, context, anchor)
    }

    pub(crate) fn build(
        kind: UnitKind,
        context: PeriodContext,
        anchor: NaiveDate,
        inherited: Inherited,
    ) -> Result<Self> {
        let (start, end) = kind.utc_bounds(anchor, context.reference_zone(), context.config())?;
        let period = Period::from_utc(context, start, end, inherited)?;
        Ok(Self { kind, period })
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn period(&self) -> &Period {
        &self.period
    }

    pub fn into_period(self) -> Period {
        self.period
    }

    /// First local date of this unit.
    pub fn start_date(&self) -> NaiveDate {
        self.start().date_naive()
    }

    /// First local date after this unit.
    pub fn end_date(&self) -> NaiveDate {
        self.end().date_naive()
    }

    /// The following unit of the same kind.
    pub fn next_unit(&self) -> Result<Self> {
        Self::build(self.kind, self.context().clone(), self.end_date(), Inherited::default())
    }

    /// The preceding unit of the same kind.
    pub fn prev_unit(&self) -> Result<Self> {
        let anchor = self.kind.prev_anchor(self.start_date())?;
        Self::build(self.kind, self.context().clone(), anchor, Inherited::default())
    }

    /// The unit of `kind` containing this unit's start.
    pub fn containing(&self, kind: UnitKind) -> Result<Self> {
        Self::build(kind, self.context().clone(), self.start_date(), Inherited::default())
    }

    pub fn current_year(&self) -> Result<Self> {
        self.containing(UnitKind::Year)
    }

    pub fn current_month(&self) -> Result<Self> {
        self.containing(UnitKind::Month)
    }

    pub fn current_week(&self) -> Result<Self> {
        self.containing(UnitKind::Week)
    }

    /// The year before the one containing this unit.
    pub fn prev_year(&self) -> Result<Self> {
        self.current_year()?.prev_unit()
    }

    /// The year after the one containing this unit.
    pub fn next_year(&self) -> Result<Self> {
        self.current_year()?.next_unit()
    }

    /// Calendar year of this unit's first local date.
    pub fn calendar_year(&self) -> i32 {
        self.start_date().year()
    }

    /// The `n`th day (1-indexed) of this unit, sharing its occurrences.
    ///
    /// Returns `None` when `n` is zero or past the unit's last day.
    pub fn get_day(&self, n: u32) -> Result<Option<Self>> {
        let Some(offset) = n.checked_sub(1) else {
            return Ok(None);
        };
        let date = self
            .start_date()
            .checked_add_days(Days::new(u64::from(offset)))
            .ok_or_else(|| PeriodError::OutOfRange(format!("day {} of {}", n, self.key())))?;
        if date >= self.end_date() {
            return Ok(None);
        }
        self.create_sub_period(UnitKind::Day, Some(date.into()))
            .map(Some)
    }

    pub fn get_months(&self) -> Result<Vec<Self>> {
        self.get_periods(UnitKind::Month)?.collect()
    }

    pub fn get_weeks(&self) -> Result<Vec<Self>> {
        self.get_periods(UnitKind::Week)?.collect()
    }

    pub fn get_days(&self) -> Result<Vec<Self>> {
        self.get_periods(UnitKind::Day)?.collect()
    }

    /// Short identifier such as `2024`, `2024-03` or `2024-03-04`.
    pub fn key(&self) -> String {
        self.kind.key(self.start_date())
    }

    /// Human readable name: the year, the month name, the week range or the
    /// weekday.
    pub fn name(&self) -> String {
        match self.kind {
            UnitKind::Year => self.start().format("%Y").to_string(),
            UnitKind::Month => self.start().format("%B").to_string(),
            UnitKind::Week => format!(
                "{} - {}",
                self.start().format("%a, %b %-d"),
                self.end().format("%a, %b %-d")
            ),
            UnitKind::Day => self.start().format("%A").to_string(),
        }
    }

    /// True if this unit starts on the current local date (compared against
    /// the UTC start's date).
    pub fn is_today(&self) -> bool {
        self.is_today_on(Local::now().date_naive())
    }

    pub fn is_today_on(&self, today: NaiveDate) -> bool {
        self.utc_start().date_naive() == today
    }

    /// True if this unit starts before the beginning of the current day.
    pub fn is_past(&self) -> bool {
        self.is_past_at(Local::now().naive_local())
    }

    pub fn is_past_at(&self, now: NaiveDateTime) -> bool {
        let start_of_day = now.date().and_time(NaiveTime::MIN);
        self.utc_start().naive_utc() < start_of_day
    }
}

impl Deref for CalendarUnit {
    type Target = Period;

    fn deref(&self) -> &Period {
        &self.period
    }
}

impl fmt::Display for CalendarUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            UnitKind::Year => write!(f, "{}", self.name()),
            UnitKind::Month => write!(f, "{} {}", self.name(), self.start().format("%Y")),
            UnitKind::Week => write!(
                f,
                "Week: {} - {}",
                self.start().format("%A, %B %-d, %Y"),
                self.end().format("%A, %B %-d, %Y")
            ),
            UnitKind::Day => write!(f, "{}", self.start().format("%A, %B %-d, %Y")),
        }
    }
}
