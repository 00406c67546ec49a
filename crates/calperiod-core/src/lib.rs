//! # calperiod-core
//!
//! Calendar periods over event occurrences.
//!
//! This library models time windows (years, months, weeks, days and
//! arbitrary ranges) over a set of events, fetches the occurrences that
//! intersect each window and classifies them as starting, ending, spanning
//! or contained in it.
//!
//! ## Features
//!
//! - **DST Safety**: Unit boundaries are computed in local time and converted
//!   independently to UTC, correctly handling 23-hour and 25-hour days.
//! - **Calendar Navigation**: Units know their neighbours, their containing
//!   year, month and week, and the finer units they contain.
//! - **Shared Fetching**: Sub-periods reuse their parent's occurrences, so
//!   sources are queried once per decomposition.
//! - **Persisted Overrides**: An optional store replaces generated
//!   occurrences that were moved or cancelled.
//!
//! ## Example
//!
//! ```rust
//! use calperiod_core::prelude::*;
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! let start = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2024, 3, 4, 10, 0, 0).unwrap();
//! let standup = FixedEvent::new(EventMeta::new("standup", "Standup")).with_occurrence(start, end);
//! let context = PeriodContext::from_sources([standup]);
//!
//! let week = CalendarUnit::week(context, NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()).unwrap();
//! for day in week.get_days().unwrap() {
//!     for partial in day.get_occurrence_partials().unwrap() {
//!         println!("{}: {} {}", day.name(), partial.occurrence.event.title, partial.class);
//!     }
//! }
//! ```

pub mod boundary;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod models;
pub mod parse;
pub mod period;
pub mod source;
pub mod tz;
pub mod unit;

// Re-export commonly used types at the crate root
pub use catalog::EventCatalog;
pub use classify::classify;
pub use config::{AmbiguousPolicy, PeriodConfig};
pub use error::{PeriodError, Result};
pub use models::{Classification, EventMeta, Occurrence, OccurrenceClass, UnitKind, WeekStart};
pub use parse::{parse_local, parse_point};
pub use period::{Period, PeriodContext, PeriodIter};
pub use source::{EventSet, FixedEvent, MemoryStore, OccurrenceSource, OccurrenceStore};
pub use tz::PointInTime;
pub use unit::CalendarUnit;

/// Prelude module for convenient imports.
///
/// ```
/// use calperiod_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{AmbiguousPolicy, PeriodConfig};
    pub use crate::error::{PeriodError, Result};
    pub use crate::models::*;
    pub use crate::parse::{parse_local, parse_point};
    pub use crate::period::{Period, PeriodContext};
    pub use crate::source::{FixedEvent, MemoryStore, OccurrenceSource, OccurrenceStore};
    pub use crate::tz::{PointInTime, parse_tz};
    pub use crate::unit::CalendarUnit;
}
