//! Collaborators that supply occurrences to periods.
//!
//! Recurrence expansion and persistence live outside this crate. Periods
//! only see them through [`OccurrenceSource`] (one per event) and
//! [`OccurrenceStore`] (persisted overrides for a set of events). The
//! in-memory implementations here back the CLI and the tests.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{EventMeta, Occurrence};

/// An event able to produce its occurrences for a window.
pub trait OccurrenceSource: fmt::Debug {
    /// The event these occurrences belong to.
    fn event(&self) -> &Arc<EventMeta>;

    /// Occurrences whose interval intersects `[start, end)`.
    ///
    /// Occurrences that merely touch an edge may be included.
    fn get_occurrences(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Occurrence>>;
}

/// Storage of persisted occurrence overrides.
pub trait OccurrenceStore: fmt::Debug {
    /// All persisted occurrences for `events`, regardless of window.
    fn find_all(&self, events: &[Arc<dyn OccurrenceSource>]) -> Result<Vec<Occurrence>>;
}

/// The shared set of events a period and all its sub-periods look at.
pub type EventSet = Arc<[Arc<dyn OccurrenceSource>]>;

/// An event with a fixed, already expanded list of occurrences.
#[derive(Debug, Clone)]
pub struct FixedEvent {
    meta: Arc<EventMeta>,
    occurrences: Vec<Occurrence>,
}

impl FixedEvent {
    pub fn new(meta: EventMeta) -> Self {
        Self {
            meta: Arc::new(meta),
            occurrences: Vec::new(),
        }
    }

    /// Add an occurrence spanning `[start, end)`.
    pub fn with_occurrence(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.with_cancellable(start, end, false)
    }

    pub fn with_cancellable(mut self, start: DateTime<Utc>, end: DateTime<Utc>, cancelled: bool) -> Self {
        let occurrence = Occurrence::new(Arc::clone(&self.meta), start, end).cancelled(cancelled);
        self.occurrences.push(occurrence);
        self
    }

    pub fn meta(&self) -> &Arc<EventMeta> {
        &self.meta
    }
}

impl OccurrenceSource for FixedEvent {
    fn event(&self) -> &Arc<EventMeta> {
        &self.meta
    }

    fn get_occurrences(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Occurrence>> {
        Ok(self
            .occurrences
            .iter()
            .filter(|occ| occ.overlaps(start, end))
            .cloned()
            .collect())
    }
}

/// Persisted overrides kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    occurrences: Vec<Occurrence>,
}

impl MemoryStore {
    pub fn new(occurrences: Vec<Occurrence>) -> Self {
        Self { occurrences }
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

impl OccurrenceStore for MemoryStore {
    fn find_all(&self, events: &[Arc<dyn OccurrenceSource>]) -> Result<Vec<Occurrence>> {
        let ids: HashSet<&str> = events.iter().map(|e| e.event().id.as_str()).collect();
        Ok(self
            .occurrences
            .iter()
            .filter(|occ| ids.contains(occ.event.id.as_str()))
            .cloned()
            .collect())
    }
}
