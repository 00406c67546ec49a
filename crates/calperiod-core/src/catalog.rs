//! Serializable description of events and their persisted overrides.
//!
//! A catalog is the plain-data form of a [`PeriodContext`]: events with
//! their expanded occurrences, overrides for the store, and optionally the
//! configuration and reference zone to use.
//!
//! ```json
//! {
//!   "timezone": "Europe/Berlin",
//!   "config": { "first_day_of_week": "sunday" },
//!   "events": [
//!     { "id": "standup", "title": "Standup",
//!       "occurrences": [ { "start": "2024-03-04T09:00:00Z", "end": "2024-03-04T09:15:00Z" } ] }
//!   ],
//!   "overrides": [
//!     { "event": "standup",
//!       "original_start": "2024-03-04T09:00:00Z", "original_end": "2024-03-04T09:15:00Z",
//!       "start": "2024-03-04T10:00:00Z", "end": "2024-03-04T10:15:00Z" }
//!   ]
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::config::PeriodConfig;
use crate::error::{PeriodError, Result};
use crate::models::{EventMeta, Occurrence};
use crate::period::PeriodContext;
use crate::source::{FixedEvent, MemoryStore, OccurrenceSource};
use crate::tz::parse_tz;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventCatalog {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub config: Option<PeriodConfig>,
    #[serde(default)]
    pub events: Vec<EventRecord>,
    #[serde(default)]
    pub overrides: Vec<OverrideRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventRecord {
    #[serde(flatten)]
    pub meta: EventMeta,
    #[serde(default)]
    pub occurrences: Vec<OccurrenceRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OccurrenceRecord {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub cancelled: bool,
}

/// A persisted change to one generated occurrence.
#[derive(Debug, Clone, Deserialize)]
pub struct OverrideRecord {
    pub event: String,
    pub original_start: DateTime<Utc>,
    pub original_end: DateTime<Utc>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub cancelled: bool,
}

fn check_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if start > end {
        return Err(PeriodError::InvalidRange { start, end });
    }
    Ok(())
}

impl EventCatalog {
    /// Build a context over the catalog's events.
    ///
    /// `config` replaces the catalog's own configuration when given. The
    /// catalog timezone becomes the reference zone; without one it is UTC.
    pub fn into_context(self, config: Option<PeriodConfig>) -> Result<PeriodContext> {
        let zone = self.timezone.as_deref().map(parse_tz).transpose()?;
        let config = config.or(self.config).unwrap_or_default();

        let mut metas: HashMap<String, Arc<EventMeta>> = HashMap::new();
        let mut sources: Vec<Arc<dyn OccurrenceSource>> = Vec::with_capacity(self.events.len());

        for record in self.events {
            if metas.contains_key(&record.meta.id) {
                return Err(PeriodError::ParseError(format!(
                    "Duplicate event id '{}'",
                    record.meta.id
                )));
            }
            let mut event = FixedEvent::new(record.meta);
            for occ in record.occurrences {
                check_range(occ.start, occ.end)?;
                event = event.with_cancellable(occ.start, occ.end, occ.cancelled);
            }
            metas.insert(event.meta().id.clone(), Arc::clone(event.meta()));
            sources.push(Arc::new(event));
        }

        let mut overrides = Vec::with_capacity(self.overrides.len());
        for record in self.overrides {
            let meta = metas.get(&record.event).ok_or_else(|| {
                PeriodError::ParseError(format!("Override for unknown event '{}'", record.event))
            })?;
            check_range(record.start, record.end)?;
            overrides.push(
                Occurrence::new(Arc::clone(meta), record.start, record.end)
                    .cancelled(record.cancelled)
                    .replacing(record.original_start, record.original_end),
            );
        }

        let mut context = PeriodContext::new(sources)
            .with_config(config)
            .with_zone(zone.or(Some(chrono_tz::Tz::UTC)));
        if !overrides.is_empty() {
            context = context.with_store(Arc::new(MemoryStore::new(overrides)));
        }
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeekStart;
    use crate::period::Period;
    use chrono::TimeZone;

    const CATALOG: &str = r#"{
        "timezone": "Europe/Berlin",
        "config": { "first_day_of_week": "sunday" },
        "events": [
            { "id": "standup", "title": "Standup",
              "occurrences": [
                { "start": "2024-03-04T09:00:00Z", "end": "2024-03-04T09:15:00Z" },
                { "start": "2024-03-05T09:00:00Z", "end": "2024-03-05T09:15:00Z", "cancelled": true }
              ] },
            { "id": "holiday", "title": "Holiday", "all_day": true,
              "occurrences": [ { "start": "2024-03-07T23:00:00Z", "end": "2024-03-08T23:00:00Z" } ] }
        ],
        "overrides": [
            { "event": "standup",
              "original_start": "2024-03-04T09:00:00Z", "original_end": "2024-03-04T09:15:00Z",
              "start": "2024-03-04T10:00:00Z", "end": "2024-03-04T10:15:00Z" }
        ]
    }"#;

    fn utc(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, d, h, 0, 0).single().unwrap()
    }

    #[test]
    fn catalog_builds_context() {
        let catalog: EventCatalog = serde_json::from_str(CATALOG).unwrap();
        assert_eq!(catalog.events.len(), 2);
        assert!(catalog.events[1].meta.all_day);

        let context = catalog.into_context(None).unwrap();
        assert_eq!(context.events().len(), 2);
        assert_eq!(context.config().first_day_of_week, WeekStart::Sunday);
        assert_eq!(context.reference_zone().unwrap().to_string(), "Europe/Berlin");

        let period = Period::between(context, utc(4, 0), utc(6, 0)).unwrap();
        let occurrences = period.get_occurrences().unwrap();
        assert_eq!(occurrences.len(), 2);
        assert_eq!(occurrences[0].start, utc(4, 10));
        assert!(occurrences[1].cancelled);
    }

    #[test]
    fn explicit_config_wins() {
        let catalog: EventCatalog = serde_json::from_str(CATALOG).unwrap();
        let context = catalog
            .into_context(Some(PeriodConfig::default().with_show_cancelled(true)))
            .unwrap();
        assert_eq!(context.config().first_day_of_week, WeekStart::Monday);
        assert!(context.config().show_cancelled_occurrences);
    }

    #[test]
    fn empty_catalog_is_utc() {
        let catalog: EventCatalog = serde_json::from_str("{}").unwrap();
        let context = catalog.into_context(None).unwrap();
        assert!(context.events().is_empty());
        assert_eq!(context.reference_zone(), Some(chrono_tz::Tz::UTC));
    }

    #[test]
    fn unknown_override_target_is_rejected() {
        let catalog: EventCatalog = serde_json::from_str(
            r#"{ "overrides": [ { "event": "ghost",
                "original_start": "2024-03-04T09:00:00Z", "original_end": "2024-03-04T10:00:00Z",
                "start": "2024-03-04T09:00:00Z", "end": "2024-03-04T10:00:00Z" } ] }"#,
        )
        .unwrap();
        assert!(matches!(catalog.into_context(None), Err(PeriodError::ParseError(_))));
    }

    #[test]
    fn inverted_occurrence_is_rejected() {
        let catalog: EventCatalog = serde_json::from_str(
            r#"{ "events": [ { "id": "x", "occurrences": [
                { "start": "2024-03-04T10:00:00Z", "end": "2024-03-04T09:00:00Z" } ] } ] }"#,
        )
        .unwrap();
        assert!(matches!(
            catalog.into_context(None),
            Err(PeriodError::InvalidRange { .. })
        ));
    }

    #[test]
    fn invalid_timezone_is_rejected() {
        let catalog: EventCatalog = serde_json::from_str(r#"{ "timezone": "Mars/Olympus" }"#).unwrap();
        assert!(matches!(
            catalog.into_context(None),
            Err(PeriodError::InvalidTimezone(_))
        ));
    }
}
