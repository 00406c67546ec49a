//! Calendar unit boundary rules.
//!
//! Boundaries are computed as naive local dates and each one is converted
//! independently to UTC. This correctly handles DST transitions, resulting
//! in 23-hour days on spring-forward days and 25-hour days on fall-back days.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use chrono_tz::Tz;

use crate::config::PeriodConfig;
use crate::error::{PeriodError, Result};
use crate::models::{UnitKind, WeekStart};
use crate::tz::local_midnight_to_utc;

impl UnitKind {
    /// Local start and end dates of the unit containing `anchor`.
    ///
    /// # Examples
    ///
    /// ```
    /// use calperiod_core::{UnitKind, WeekStart};
    /// use chrono::NaiveDate;
    ///
    /// let anchor = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();
    /// let (start, end) = UnitKind::Month.naive_bounds(anchor, WeekStart::Monday).unwrap();
    /// assert_eq!(start, NaiveDate::from_ymd_opt(2024, 12, 1).unwrap());
    /// assert_eq!(end, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    /// ```
    pub fn naive_bounds(self, anchor: NaiveDate, week_start: WeekStart) -> Result<(NaiveDate, NaiveDate)> {
        match self {
            UnitKind::Year => year_bounds(anchor),
            UnitKind::Month => month_bounds(anchor),
            UnitKind::Week => week_bounds(anchor, week_start),
            UnitKind::Day => day_bounds(anchor),
        }
    }

    /// UTC `[start, end)` of the unit containing `anchor`, with boundaries at
    /// local midnight in `zone`.
    pub fn utc_bounds(
        self,
        anchor: NaiveDate,
        zone: Option<Tz>,
        config: &PeriodConfig,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let (start, end) = self.naive_bounds(anchor, config.first_day_of_week)?;
        Ok((
            local_midnight_to_utc(start, zone, config.ambiguous),
            local_midnight_to_utc(end, zone, config.ambiguous),
        ))
    }

    /// An anchor inside the unit preceding the one that starts on `start`.
    pub fn prev_anchor(self, start: NaiveDate) -> Result<NaiveDate> {
        let prev = match self {
            UnitKind::Year => start.checked_sub_months(Months::new(12)),
            UnitKind::Month => start.with_day(1).and_then(|d| d.pred_opt()),
            UnitKind::Week => start.checked_sub_days(Days::new(7)),
            UnitKind::Day => start.pred_opt(),
        };
        prev.ok_or_else(|| out_of_range(self, start))
    }

    /// Short identifier of the unit starting on `start`.
    ///
    /// - Year: `YYYY`
    /// - Month: `YYYY-MM`
    /// - Week: the week starting date, `YYYY-MM-DD`
    /// - Day: `YYYY-MM-DD`
    pub fn key(self, start: NaiveDate) -> String {
        match self {
            UnitKind::Year => format!("{}", start.format("%Y")),
            UnitKind::Month => format!("{}", start.format("%Y-%m")),
            UnitKind::Week | UnitKind::Day => format!("{}", start.format("%Y-%m-%d")),
        }
    }
}

fn out_of_range(kind: UnitKind, date: NaiveDate) -> PeriodError {
    PeriodError::OutOfRange(format!("{} next to {}", kind, date))
}

fn year_bounds(anchor: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let year = anchor.year();
    let start = NaiveDate::from_ymd_opt(year, 1, 1);
    let end = NaiveDate::from_ymd_opt(year + 1, 1, 1);
    start
        .zip(end)
        .ok_or_else(|| out_of_range(UnitKind::Year, anchor))
}

fn month_bounds(anchor: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let year = anchor.year();
    let month = anchor.month();

    // First day of current month
    let start = NaiveDate::from_ymd_opt(year, month, 1);

    // First day of next month
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };

    start
        .zip(end)
        .ok_or_else(|| out_of_range(UnitKind::Month, anchor))
}

fn week_bounds(anchor: NaiveDate, week_start: WeekStart) -> Result<(NaiveDate, NaiveDate)> {
    let back = week_start.days_from_start(anchor.weekday());

    let start = anchor.checked_sub_days(Days::new(back));
    let end = start.and_then(|s| s.checked_add_days(Days::new(7)));

    start
        .zip(end)
        .ok_or_else(|| out_of_range(UnitKind::Week, anchor))
}

fn day_bounds(anchor: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    anchor
        .succ_opt()
        .map(|next| (anchor, next))
        .ok_or_else(|| out_of_range(UnitKind::Day, anchor))
}
