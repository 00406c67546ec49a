//! Occurrence classification against a half-open window.
//!
//! The decision table:
//!
//! | started in window | ended in window | class |
//! |-------------------|-----------------|-------|
//! | yes               | yes             | [`OccurrenceClass::StartedAndEnded`] (1) |
//! | yes               | no              | [`OccurrenceClass::StartedOnly`] (0) |
//! | no                | yes             | [`OccurrenceClass::EndedOnly`] (3) |
//! | no                | no              | [`OccurrenceClass::SpansThrough`] (2) |
//!
//! "In window" means `start <= t < end`: an occurrence beginning exactly on
//! a boundary belongs to the later of the two adjacent windows.

use chrono::{DateTime, Utc};

use crate::models::{Classification, Occurrence, OccurrenceClass};

/// Classify `occurrence` against `[start, end)`.
///
/// Returns `None` when the occurrence is cancelled and cancelled occurrences
/// are hidden, or when it lies entirely outside the window. The outside test
/// is inclusive (`occ.start > end || occ.end < start`), so an occurrence that
/// only touches an edge still classifies.
pub fn classify(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    occurrence: &Occurrence,
    show_cancelled: bool,
) -> Option<Classification<'_>> {
    if occurrence.cancelled && !show_cancelled {
        return None;
    }
    if occurrence.start > end || occurrence.end < start {
        return None;
    }

    let started = start <= occurrence.start && occurrence.start < end;
    let ended = start <= occurrence.end && occurrence.end < end;

    let class = match (started, ended) {
        (true, true) => OccurrenceClass::StartedAndEnded,
        (true, false) => OccurrenceClass::StartedOnly,
        (false, true) => OccurrenceClass::EndedOnly,
        // it existed during this window without beginning or ending in it
        (false, false) => OccurrenceClass::SpansThrough,
    };

    Some(Classification {
        occurrence,
        class,
        all_day: occurrence.is_all_day(),
    })
}
