//! Time windows over a set of events.
//!
//! A [`Period`] is a half-open UTC window `[utc_start, utc_end)` that lazily
//! fetches the occurrences of its events, caches them sorted by
//! `(start, end)` and classifies them against its bounds. Sub-periods inherit
//! the parent's fetched occurrences as a pool so decomposing a month into
//! weeks and days queries the sources only once.

use std::cell::OnceCell;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, trace};

use crate::classify::classify;
use crate::config::PeriodConfig;
use crate::error::{PeriodError, Result};
use crate::models::{Classification, Occurrence, UnitKind};
use crate::source::{EventSet, OccurrenceSource, OccurrenceStore};
use crate::tz::{PointInTime, normalize};
use crate::unit::CalendarUnit;

/// Length of a period constructed without an end.
const DEFAULT_SPAN_DAYS: i64 = 30;

/// Everything a period needs besides its bounds: the events, the optional
/// override store, the configuration and the reference zone.
///
/// Cloning is cheap; events and store are shared.
#[derive(Debug, Clone)]
pub struct PeriodContext {
    events: EventSet,
    store: Option<Arc<dyn OccurrenceStore>>,
    config: PeriodConfig,
    zone: Option<Tz>,
}

impl PeriodContext {
    /// A context over `events`, default configuration, UTC reference zone
    /// and no override store.
    pub fn new(events: impl IntoIterator<Item = Arc<dyn OccurrenceSource>>) -> Self {
        Self {
            events: events.into_iter().collect(),
            store: None,
            config: PeriodConfig::default(),
            zone: Some(Tz::UTC),
        }
    }

    /// Convenience for a homogeneous list of sources.
    pub fn from_sources<S: OccurrenceSource + 'static>(sources: impl IntoIterator<Item = S>) -> Self {
        Self::new(
            sources
                .into_iter()
                .map(|s| Arc::new(s) as Arc<dyn OccurrenceSource>),
        )
    }

    pub fn with_store(mut self, store: Arc<dyn OccurrenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_config(mut self, config: PeriodConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_zone(mut self, zone: Option<Tz>) -> Self {
        self.zone = zone;
        self
    }

    pub fn events(&self) -> &EventSet {
        &self.events
    }

    pub fn config(&self) -> &PeriodConfig {
        &self.config
    }

    /// The display zone, present only when timezone support is on.
    pub fn reference_zone(&self) -> Option<Tz> {
        self.zone.filter(|_| self.config.use_timezone)
    }

    fn has_store(&self) -> bool {
        self.store.is_some()
    }
}

/// Read-only caches handed from a period to the periods carved out of it.
#[derive(Debug, Clone, Default)]
pub(crate) struct Inherited {
    pool: Option<Arc<[Occurrence]>>,
    persisted: Option<Arc<[Occurrence]>>,
}

/// A half-open window `[utc_start, utc_end)` over a set of events.
#[derive(Debug, Clone)]
pub struct Period {
    utc_start: DateTime<Utc>,
    utc_end: DateTime<Utc>,
    context: PeriodContext,
    occurrence_pool: Option<Arc<[Occurrence]>>,
    occurrences: OnceCell<Arc<[Occurrence]>>,
    persisted: OnceCell<Arc<[Occurrence]>>,
}

impl Period {
    /// Create a period, defaulting a missing start to now and a missing end
    /// to 30 days after the start.
    ///
    /// Naive bounds are read in the context's zone even when timezone
    /// support is off; the flag only affects display and unit boundaries.
    pub fn new(context: PeriodContext, start: Option<PointInTime>, end: Option<PointInTime>) -> Result<Self> {
        let zone = context.zone;
        let utc_start = start
            .map(|point| normalize(point, zone, &context.config))
            .unwrap_or_else(Utc::now);
        let utc_end = match end {
            Some(point) => normalize(point, zone, &context.config),
            None => utc_start
                .checked_add_signed(chrono::Duration::days(DEFAULT_SPAN_DAYS))
                .ok_or_else(|| {
                    PeriodError::OutOfRange(format!("{} days after {}", DEFAULT_SPAN_DAYS, utc_start))
                })?,
        };
        Self::from_utc(context, utc_start, utc_end, Inherited::default())
    }

    /// Create a period over `[start, end)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use calperiod_core::{Period, PeriodContext, FixedEvent};
    /// use chrono::NaiveDate;
    ///
    /// let context = PeriodContext::from_sources(Vec::<FixedEvent>::new());
    /// let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
    /// let end = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
    /// let period = Period::between(context, start, end).unwrap();
    /// assert_eq!(period.duration(), chrono::Duration::days(1));
    /// ```
    pub fn between(
        context: PeriodContext,
        start: impl Into<PointInTime>,
        end: impl Into<PointInTime>,
    ) -> Result<Self> {
        Self::new(context, Some(start.into()), Some(end.into()))
    }

    pub(crate) fn from_utc(
        context: PeriodContext,
        utc_start: DateTime<Utc>,
        utc_end: DateTime<Utc>,
        inherited: Inherited,
    ) -> Result<Self> {
        if utc_start > utc_end {
            return Err(PeriodError::InvalidRange {
                start: utc_start,
                end: utc_end,
            });
        }

        let persisted = match inherited.persisted {
            Some(persisted) => OnceCell::from(persisted),
            None => OnceCell::new(),
        };

        Ok(Self {
            utc_start,
            utc_end,
            context,
            occurrence_pool: inherited.pool,
            occurrences: OnceCell::new(),
            persisted,
        })
    }

    pub fn utc_start(&self) -> DateTime<Utc> {
        self.utc_start
    }

    pub fn utc_end(&self) -> DateTime<Utc> {
        self.utc_end
    }

    pub fn duration(&self) -> chrono::Duration {
        self.utc_end - self.utc_start
    }

    pub fn context(&self) -> &PeriodContext {
        &self.context
    }

    pub fn events(&self) -> &EventSet {
        &self.context.events
    }

    pub fn config(&self) -> &PeriodConfig {
        &self.context.config
    }

    pub fn reference_zone(&self) -> Option<Tz> {
        self.context.reference_zone()
    }

    /// Start in the reference zone, or the UTC wall clock without one.
    pub fn start(&self) -> DateTime<Tz> {
        self.utc_start.with_timezone(&self.display_zone())
    }

    /// End in the reference zone, or the UTC wall clock without one.
    pub fn end(&self) -> DateTime<Tz> {
        self.utc_end.with_timezone(&self.display_zone())
    }

    fn display_zone(&self) -> Tz {
        self.reference_zone().unwrap_or(Tz::UTC)
    }

    /// Occurrences intersecting this period, sorted by `(start, end)`.
    ///
    /// Fetched on first access and cached for the life of the period.
    /// Collaborator errors are returned unchanged.
    pub fn get_occurrences(&self) -> Result<&[Occurrence]> {
        Ok(&self.occurrence_list()?[..])
    }

    fn occurrence_list(&self) -> Result<&Arc<[Occurrence]>> {
        if let Some(cached) = self.occurrences.get() {
            return Ok(cached);
        }
        let fetched = self.fetch_sorted_occurrences()?;
        Ok(self.occurrences.get_or_init(|| fetched.into()))
    }

    fn fetch_sorted_occurrences(&self) -> Result<Vec<Occurrence>> {
        if let Some(pool) = &self.occurrence_pool {
            // The pool is sorted already; filtering keeps the order.
            let filtered: Vec<Occurrence> = pool
                .iter()
                .filter(|occ| occ.overlaps(self.utc_start, self.utc_end))
                .cloned()
                .collect();
            trace!(
                pool = pool.len(),
                kept = filtered.len(),
                start = %self.utc_start,
                end = %self.utc_end,
                "Filtered inherited occurrence pool"
            );
            return Ok(filtered);
        }

        let mut occurrences = Vec::new();
        for event in self.context.events.iter() {
            occurrences.extend(event.get_occurrences(self.utc_start, self.utc_end)?);
        }

        if self.context.has_store() {
            let persisted = self.persisted_list()?;
            occurrences = merge_persisted(occurrences, persisted, self.utc_start, self.utc_end);
        }

        occurrences.sort_by(Occurrence::cmp_bounds);
        debug!(
            events = self.context.events.len(),
            occurrences = occurrences.len(),
            start = %self.utc_start,
            end = %self.utc_end,
            "Fetched occurrences from sources"
        );
        Ok(occurrences)
    }

    /// Persisted overrides for this period's events, independent of window.
    ///
    /// Inherited from the parent period when there is one, otherwise
    /// queried from the store once and cached. Without a store this is empty.
    pub fn get_persisted_occurrences(&self) -> Result<&[Occurrence]> {
        Ok(&self.persisted_list()?[..])
    }

    fn persisted_list(&self) -> Result<&Arc<[Occurrence]>> {
        if let Some(cached) = self.persisted.get() {
            return Ok(cached);
        }
        let found = match &self.context.store {
            Some(store) => {
                let found = store.find_all(&self.context.events)?;
                debug!(persisted = found.len(), "Loaded persisted occurrences");
                found
            }
            None => Vec::new(),
        };
        Ok(self.persisted.get_or_init(|| found.into()))
    }

    /// All-day occurrences ending strictly before this period's end.
    pub fn get_all_day_occurrences(&self) -> Result<Vec<&Occurrence>> {
        Ok(self
            .get_occurrences()?
            .iter()
            .filter(|occ| occ.is_all_day() && occ.end < self.utc_end)
            .collect())
    }

    /// How `occurrence` relates to this period, if it is visible in it.
    pub fn classify_occurrence<'a>(&self, occurrence: &'a Occurrence) -> Option<Classification<'a>> {
        classify(
            self.utc_start,
            self.utc_end,
            occurrence,
            self.context.config.show_cancelled_occurrences,
        )
    }

    /// Classifications of every visible occurrence, in occurrence order.
    pub fn get_occurrence_partials(&self) -> Result<Vec<Classification<'_>>> {
        Ok(self
            .get_occurrences()?
            .iter()
            .filter_map(|occ| self.classify_occurrence(occ))
            .collect())
    }

    /// True if at least one occurrence is visible in this period.
    pub fn has_occurrences(&self) -> Result<bool> {
        Ok(self
            .get_occurrences()?
            .iter()
            .any(|occ| self.classify_occurrence(occ).is_some()))
    }

    /// A plain period over `[start, end)` if it lies within this one.
    ///
    /// The slot reuses this period's occurrences and persisted overrides.
    pub fn get_time_slot(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Option<Period>> {
        if start < self.utc_start || end > self.utc_end {
            return Ok(None);
        }
        let inherited = self.inherited()?;
        Period::from_utc(self.context.clone(), start, end, inherited).map(Some)
    }

    /// One unit of `kind` anchored at `start` (this period's start by default).
    pub fn create_sub_period(&self, kind: UnitKind, start: Option<PointInTime>) -> Result<CalendarUnit> {
        let anchor = start.unwrap_or(PointInTime::Aware(self.utc_start));
        let date = anchor.date_in(self.reference_zone());
        CalendarUnit::build(kind, self.context.clone(), date, self.inherited()?)
    }

    /// Contiguous units of `kind` covering this period.
    ///
    /// The first unit contains this period's start, so it may begin before
    /// it (the week holding the 1st of a month). Iteration stops at the
    /// first unit starting at or after this period's end. The iterator is
    /// lazy and can be cloned to restart.
    pub fn get_periods(&self, kind: UnitKind) -> Result<PeriodIter> {
        Ok(PeriodIter {
            kind,
            context: self.context.clone(),
            inherited: self.inherited()?,
            next_anchor: Some(PointInTime::Aware(self.utc_start).date_in(self.reference_zone())),
            limit: self.utc_end,
        })
    }

    fn inherited(&self) -> Result<Inherited> {
        Ok(Inherited {
            pool: Some(Arc::clone(self.occurrence_list()?)),
            persisted: Some(Arc::clone(self.persisted_list()?)),
        })
    }
}

impl PartialEq for Period {
    /// Same bounds over the same event set.
    fn eq(&self, other: &Self) -> bool {
        self.utc_start == other.utc_start
            && self.utc_end == other.utc_end
            && Arc::ptr_eq(&self.context.events, &other.context.events)
    }
}

/// Swap generated occurrences for their persisted overrides.
///
/// Overrides that moved out of the window are dropped; overrides that moved
/// into it from a slot the sources did not produce are added.
fn merge_persisted(
    generated: Vec<Occurrence>,
    persisted: &[Occurrence],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<Occurrence> {
    let mut used = vec![false; persisted.len()];

    let mut merged: Vec<Occurrence> = generated
        .into_iter()
        .filter_map(|occ| match persisted.iter().position(|p| p.overrides(&occ)) {
            Some(index) => {
                used[index] = true;
                let replacement = &persisted[index];
                replacement
                    .overlaps(start, end)
                    .then(|| replacement.clone())
            }
            None => Some(occ),
        })
        .collect();

    merged.extend(
        persisted
            .iter()
            .zip(&used)
            .filter(|(occ, used)| !**used && occ.overlaps(start, end))
            .map(|(occ, _)| occ.clone()),
    );
    merged
}

/// Iterator over the calendar units tiling a period.
#[derive(Debug, Clone)]
pub struct PeriodIter {
    kind: UnitKind,
    context: PeriodContext,
    inherited: Inherited,
    next_anchor: Option<NaiveDate>,
    limit: DateTime<Utc>,
}

impl Iterator for PeriodIter {
    type Item = Result<CalendarUnit>;

    fn next(&mut self) -> Option<Self::Item> {
        let anchor = self.next_anchor.take()?;
        let unit = match CalendarUnit::build(
            self.kind,
            self.context.clone(),
            anchor,
            self.inherited.clone(),
        ) {
            Ok(unit) => unit,
            Err(err) => return Some(Err(err)),
        };
        if unit.utc_start() >= self.limit {
            return None;
        }
        self.next_anchor = Some(unit.end().date_naive());
        Some(Ok(unit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventMeta, OccurrenceClass};
    use crate::source::{FixedEvent, MemoryStore};
    use chrono::TimeZone;
    use std::cell::Cell;
    use std::rc::Rc;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).single().unwrap()
    }

    #[derive(Debug)]
    struct CountingEvent {
        inner: FixedEvent,
        calls: Rc<Cell<usize>>,
    }

    impl OccurrenceSource for CountingEvent {
        fn event(&self) -> &Arc<EventMeta> {
            self.inner.event()
        }

        fn get_occurrences(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Occurrence>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.get_occurrences(start, end)
        }
    }

    #[derive(Debug)]
    struct FailingEvent(Arc<EventMeta>);

    impl OccurrenceSource for FailingEvent {
        fn event(&self) -> &Arc<EventMeta> {
            &self.0
        }

        fn get_occurrences(&self, _: DateTime<Utc>, _: DateTime<Utc>) -> Result<Vec<Occurrence>> {
            Err(PeriodError::Collaborator("recurrence backend unavailable".into()))
        }
    }

    #[derive(Debug)]
    struct CountingStore {
        inner: MemoryStore,
        calls: Rc<Cell<usize>>,
    }

    impl OccurrenceStore for CountingStore {
        fn find_all(&self, events: &[Arc<dyn OccurrenceSource>]) -> Result<Vec<Occurrence>> {
            self.calls.set(self.calls.get() + 1);
            self.inner.find_all(events)
        }
    }

    fn week_context() -> PeriodContext {
        PeriodContext::from_sources([
            FixedEvent::new(EventMeta::new("late", "Late"))
                .with_occurrence(at(4, 15), at(4, 16))
                .with_occurrence(at(6, 15), at(6, 16)),
            FixedEvent::new(EventMeta::new("early", "Early"))
                .with_occurrence(at(4, 9), at(4, 10))
                .with_occurrence(at(4, 9), at(4, 9) + chrono::Duration::minutes(30)),
        ])
    }

    fn counting_context(calls: &Rc<Cell<usize>>) -> PeriodContext {
        let inner = FixedEvent::new(EventMeta::new("e", "E"))
            .with_occurrence(at(4, 10), at(4, 11))
            .with_occurrence(at(5, 10), at(5, 11));
        let source: Arc<dyn OccurrenceSource> = Arc::new(CountingEvent {
            inner,
            calls: Rc::clone(calls),
        });
        PeriodContext::new([source])
    }

    #[test]
    fn occurrences_sorted_by_start_then_end() {
        let period = Period::between(week_context(), at(4, 0), at(11, 0)).unwrap();
        let starts: Vec<_> = period
            .get_occurrences()
            .unwrap()
            .iter()
            .map(|o| (o.event.id.as_str(), o.start, o.end))
            .collect();
        assert_eq!(starts.len(), 4);
        assert_eq!(starts[0].0, "early");
        assert!(starts[0].2 < starts[1].2);
        assert_eq!(starts[2].1, at(4, 15));
        assert_eq!(starts[3].1, at(6, 15));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let result = Period::between(week_context(), at(5, 0), at(4, 0));
        assert!(matches!(result, Err(PeriodError::InvalidRange { .. })));
    }

    #[test]
    fn empty_range_is_allowed() {
        let period = Period::between(week_context(), at(4, 0), at(4, 0)).unwrap();
        assert!(period.get_occurrences().unwrap().is_empty());
    }

    #[test]
    fn missing_end_defaults_to_thirty_days() {
        let period = Period::new(week_context(), Some(at(1, 0).into()), None).unwrap();
        assert_eq!(period.duration(), chrono::Duration::days(30));
    }

    #[test]
    fn missing_end_past_the_calendar_range_is_an_error() {
        let result = Period::new(week_context(), Some(DateTime::<Utc>::MAX_UTC.into()), None);
        assert!(matches!(result, Err(PeriodError::OutOfRange(_))));
    }

    #[test]
    fn naive_bounds_use_zone_without_timezone_support() {
        let berlin = crate::tz::parse_tz("Europe/Berlin").unwrap();
        let context = week_context()
            .with_zone(Some(berlin))
            .with_config(PeriodConfig::default().with_use_timezone(false));
        let noon = chrono::NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();

        let period = Period::between(context, noon, noon + chrono::Duration::hours(1)).unwrap();
        assert_eq!(period.utc_start(), at(4, 11));
        assert_eq!(period.utc_end(), at(4, 12));
        // display still ignores the zone
        assert_eq!(period.reference_zone(), None);
    }

    #[test]
    fn missing_start_defaults_to_now() {
        let before = Utc::now();
        let period = Period::new(week_context(), None, None).unwrap();
        assert!(period.utc_start() >= before);
        assert!(period.utc_start() <= Utc::now());
    }

    #[test]
    fn occurrences_are_fetched_once() {
        let calls = Rc::new(Cell::new(0));
        let period = Period::between(counting_context(&calls), at(4, 0), at(6, 0)).unwrap();
        assert_eq!(period.get_occurrences().unwrap().len(), 2);
        assert_eq!(period.get_occurrences().unwrap().len(), 2);
        assert!(period.has_occurrences().unwrap());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn sub_periods_reuse_the_pool() {
        let calls = Rc::new(Cell::new(0));
        let period = Period::between(counting_context(&calls), at(4, 0), at(6, 0)).unwrap();
        let days: Vec<CalendarUnit> = period
            .get_periods(UnitKind::Day)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();

        assert_eq!(days.len(), 2);
        for day in &days {
            assert_eq!(day.get_occurrences().unwrap().len(), 1);
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn pool_and_direct_fetch_agree() {
        let context = week_context();
        let week = Period::between(context.clone(), at(4, 0), at(11, 0)).unwrap();
        let slot = week.get_time_slot(at(4, 12), at(6, 16)).unwrap().unwrap();
        let direct = Period::between(context, at(4, 12), at(6, 16)).unwrap();

        assert_eq!(
            slot.get_occurrences().unwrap(),
            direct.get_occurrences().unwrap()
        );
        assert_eq!(slot.get_occurrences().unwrap().len(), 2);
    }

    #[test]
    fn pool_filter_excludes_touching_occurrences() {
        let week = Period::between(week_context(), at(4, 0), at(11, 0)).unwrap();
        // [4 10:00, 4 15:00) touches "early" at its end and "late" at its start
        let slot = week.get_time_slot(at(4, 10), at(4, 15)).unwrap().unwrap();
        assert!(slot.get_occurrences().unwrap().is_empty());
    }

    #[test]
    fn time_slot_outside_is_none() {
        let period = Period::between(week_context(), at(4, 0), at(5, 0)).unwrap();
        assert!(period.get_time_slot(at(3, 23), at(4, 2)).unwrap().is_none());
        assert!(period.get_time_slot(at(4, 22), at(5, 1)).unwrap().is_none());
        assert!(period.get_time_slot(at(4, 0), at(5, 0)).unwrap().is_some());
    }

    #[test]
    fn partials_keep_order_and_classes() {
        let period = Period::between(week_context(), at(4, 9), at(4, 16)).unwrap();
        let partials = period.get_occurrence_partials().unwrap();
        let classes: Vec<_> = partials.iter().map(|c| c.class).collect();
        assert_eq!(
            classes,
            vec![
                OccurrenceClass::StartedAndEnded,
                OccurrenceClass::StartedAndEnded,
                // ends exactly at the window end
                OccurrenceClass::StartedOnly,
            ]
        );
    }

    #[test]
    fn cancelled_occurrences_follow_config() {
        let event = FixedEvent::new(EventMeta::new("c", "Cancelled")).with_cancellable(at(4, 10), at(4, 11), true);
        let hidden = PeriodContext::from_sources([event.clone()]);
        let shown = PeriodContext::from_sources([event])
            .with_config(PeriodConfig::default().with_show_cancelled(true));

        let period = Period::between(hidden, at(4, 0), at(5, 0)).unwrap();
        assert_eq!(period.get_occurrences().unwrap().len(), 1);
        assert!(period.get_occurrence_partials().unwrap().is_empty());
        assert!(!period.has_occurrences().unwrap());

        let period = Period::between(shown, at(4, 0), at(5, 0)).unwrap();
        let partials = period.get_occurrence_partials().unwrap();
        assert_eq!(partials.len(), 1);
        assert_eq!(partials[0].class, OccurrenceClass::StartedAndEnded);
    }

    #[test]
    fn all_day_occurrences_end_before_period_end() {
        let last_second = at(4, 23) + chrono::Duration::minutes(59) + chrono::Duration::seconds(59);
        let context = PeriodContext::from_sources([
            FixedEvent::new(EventMeta::new("holiday", "Holiday").all_day(true))
                .with_occurrence(at(4, 0), last_second),
            FixedEvent::new(EventMeta::new("meeting", "Meeting")).with_occurrence(at(4, 9), at(4, 10)),
        ]);

        let monday = Period::between(context.clone(), at(4, 0), at(5, 0)).unwrap();
        let all_day = monday.get_all_day_occurrences().unwrap();
        assert_eq!(all_day.len(), 1);
        assert_eq!(all_day[0].event.id, "holiday");

        let tuesday = Period::between(context, at(5, 0), at(6, 0)).unwrap();
        assert!(tuesday.get_all_day_occurrences().unwrap().is_empty());
    }

    #[test]
    fn all_day_occurrence_ending_on_the_boundary_is_excluded() {
        let context = PeriodContext::from_sources([
            FixedEvent::new(EventMeta::new("holiday", "Holiday").all_day(true)).with_occurrence(at(4, 0), at(5, 0)),
        ]);

        let monday = Period::between(context.clone(), at(4, 0), at(5, 0)).unwrap();
        assert_eq!(monday.get_occurrences().unwrap().len(), 1);
        assert!(monday.get_all_day_occurrences().unwrap().is_empty());

        let tuesday = Period::between(context.clone(), at(5, 0), at(6, 0)).unwrap();
        assert!(tuesday.get_occurrences().unwrap().is_empty());

        // no lower bound: started before the window, ends inside it
        let overlapping = Period::between(context, at(4, 12), at(6, 0)).unwrap();
        assert_eq!(overlapping.get_all_day_occurrences().unwrap().len(), 1);
    }

    #[test]
    fn source_errors_propagate_unchanged() {
        let source: Arc<dyn OccurrenceSource> =
            Arc::new(FailingEvent(Arc::new(EventMeta::new("broken", "Broken"))));
        let period = Period::between(PeriodContext::new([source]), at(4, 0), at(5, 0)).unwrap();
        let err = period.get_occurrences().unwrap_err();
        assert!(matches!(err, PeriodError::Collaborator(_)));
        assert_eq!(err.to_string(), "recurrence backend unavailable");
        assert!(period.get_periods(UnitKind::Day).is_err());
    }

    #[test]
    fn persisted_overrides_replace_generated_occurrences() {
        let event = FixedEvent::new(EventMeta::new("e", "E"))
            .with_occurrence(at(4, 10), at(4, 11))
            .with_occurrence(at(5, 10), at(5, 11));
        let meta = Arc::clone(event.meta());
        let store = MemoryStore::new(vec![
            // moved later on the same day
            Occurrence::new(Arc::clone(&meta), at(4, 14), at(4, 15)).replacing(at(4, 10), at(4, 11)),
            // cancelled
            Occurrence::new(Arc::clone(&meta), at(5, 10), at(5, 11))
                .cancelled(true)
                .replacing(at(5, 10), at(5, 11)),
        ]);
        let context = PeriodContext::from_sources([event]).with_store(Arc::new(store));

        let period = Period::between(context, at(4, 0), at(6, 0)).unwrap();
        let occurrences = period.get_occurrences().unwrap();
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0].start, at(4, 14));
        assert!(occurrences[1].cancelled);

        let partials = period.get_occurrence_partials().unwrap();
        assert_eq!(partials.len(), 1);
        assert_eq!(partials[0].occurrence.start, at(4, 14));
    }

    #[test]
    fn overrides_moved_across_the_window_edge() {
        let event = FixedEvent::new(EventMeta::new("e", "E"))
            .with_occurrence(at(4, 10), at(4, 11))
            .with_occurrence(at(6, 10), at(6, 11));
        let meta = Arc::clone(event.meta());
        let store = MemoryStore::new(vec![
            // moved out of day 4
            Occurrence::new(Arc::clone(&meta), at(7, 10), at(7, 11)).replacing(at(4, 10), at(4, 11)),
            // moved into day 4 from day 6
            Occurrence::new(Arc::clone(&meta), at(4, 18), at(4, 19)).replacing(at(6, 10), at(6, 11)),
        ]);
        let context = PeriodContext::from_sources([event]).with_store(Arc::new(store));

        let day = Period::between(context, at(4, 0), at(5, 0)).unwrap();
        let occurrences = day.get_occurrences().unwrap();
        assert_eq!(occurrences.len(), 1);
        assert_eq!(occurrences[0].start, at(4, 18));
    }

    #[test]
    fn persisted_occurrences_cached_and_inherited() {
        let calls = Rc::new(Cell::new(0));
        let event = FixedEvent::new(EventMeta::new("e", "E")).with_occurrence(at(4, 10), at(4, 11));
        let store = CountingStore {
            inner: MemoryStore::new(vec![
                Occurrence::new(Arc::clone(event.meta()), at(4, 12), at(4, 13)).replacing(at(4, 10), at(4, 11)),
            ]),
            calls: Rc::clone(&calls),
        };
        let context = PeriodContext::from_sources([event]).with_store(Arc::new(store));

        let period = Period::between(context, at(4, 0), at(6, 0)).unwrap();
        assert_eq!(period.get_persisted_occurrences().unwrap().len(), 1);
        assert_eq!(period.get_persisted_occurrences().unwrap().len(), 1);
        assert_eq!(period.get_occurrences().unwrap()[0].start, at(4, 12));

        let slot = period.get_time_slot(at(4, 0), at(5, 0)).unwrap().unwrap();
        assert_eq!(slot.get_persisted_occurrences().unwrap().len(), 1);
        for day in period.get_periods(UnitKind::Day).unwrap() {
            day.unwrap().get_persisted_occurrences().unwrap();
        }
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn no_store_means_no_persisted_occurrences() {
        let period = Period::between(week_context(), at(4, 0), at(5, 0)).unwrap();
        assert!(period.get_persisted_occurrences().unwrap().is_empty());
    }

    #[test]
    fn periods_tile_the_window() {
        let period = Period::between(week_context(), at(4, 0), at(11, 0)).unwrap();
        let iter = period.get_periods(UnitKind::Day).unwrap();
        let days: Vec<CalendarUnit> = iter.clone().collect::<Result<_>>().unwrap();

        assert_eq!(days.len(), 7);
        assert_eq!(days[0].utc_start(), period.utc_start());
        assert_eq!(days[6].utc_end(), period.utc_end());
        for pair in days.windows(2) {
            assert_eq!(pair[0].utc_end(), pair[1].utc_start());
        }

        // restartable
        assert_eq!(iter.count(), 7);
    }

    #[test]
    fn periods_cover_partial_last_unit() {
        let period = Period::between(week_context(), at(4, 12), at(6, 1)).unwrap();
        let days: Vec<CalendarUnit> = period
            .get_periods(UnitKind::Day)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(days.len(), 3);
        assert_eq!(days[0].utc_start(), at(4, 0));
        assert_eq!(days[2].utc_start(), at(6, 0));
    }

    #[test]
    fn create_sub_period_defaults_to_period_start() {
        let period = Period::between(week_context(), at(6, 12), at(20, 0)).unwrap();
        let week = period.create_sub_period(UnitKind::Week, None).unwrap();
        // 2024-03-06 is a Wednesday
        assert_eq!(week.utc_start(), at(4, 0));
        assert_eq!(week.get_occurrences().unwrap().len(), 1);

        let day = period
            .create_sub_period(UnitKind::Day, Some(at(7, 5).into()))
            .unwrap();
        assert_eq!(day.utc_start(), at(7, 0));
    }

    #[test]
    fn equality_requires_same_events() {
        let context = week_context();
        let a = Period::between(context.clone(), at(4, 0), at(5, 0)).unwrap();
        let b = Period::between(context, at(4, 0), at(5, 0)).unwrap();
        let c = Period::between(week_context(), at(4, 0), at(5, 0)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn localized_accessors() {
        let berlin = crate::tz::parse_tz("Europe/Berlin").unwrap();
        let zoned = Period::between(week_context().with_zone(Some(berlin)), at(4, 0), at(5, 0)).unwrap();
        assert_eq!(crate::tz::format_rfc3339(&zoned.start()), "2024-03-04T01:00:00+01:00");

        let plain = Period::between(
            week_context()
                .with_zone(Some(berlin))
                .with_config(PeriodConfig::default().with_use_timezone(false)),
            at(4, 0),
            at(5, 0),
        )
        .unwrap();
        assert_eq!(plain.reference_zone(), None);
        assert_eq!(crate::tz::format_rfc3339(&plain.start()), "2024-03-04T00:00:00+00:00");
    }
}
