//! Process-wide calendar settings, passed explicitly into every period.

use serde::{Deserialize, Serialize};

use crate::models::WeekStart;

/// Policy for resolving ambiguous local times.
///
/// Ambiguous times occur during DST fall back when a range
/// of local times occurs twice (e.g., 02:00-02:59 in Europe/Berlin).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AmbiguousPolicy {
    /// Use the first occurrence (earlier instant, still in DST).
    #[default]
    First,
    /// Use the second occurrence (later instant, back to standard time).
    Second,
}

/// Settings read once at the boundary and immutable for a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeriodConfig {
    /// First day of week-granularity periods.
    pub first_day_of_week: WeekStart,
    /// Whether cancelled occurrences are classified or hidden.
    pub show_cancelled_occurrences: bool,
    /// Whether reference zones are honoured at all.
    pub use_timezone: bool,
    /// How ambiguous local boundaries resolve to UTC.
    pub ambiguous: AmbiguousPolicy,
}

impl Default for PeriodConfig {
    fn default() -> Self {
        Self {
            first_day_of_week: WeekStart::Monday,
            show_cancelled_occurrences: false,
            use_timezone: true,
            ambiguous: AmbiguousPolicy::First,
        }
    }
}

impl PeriodConfig {
    pub fn with_first_day_of_week(mut self, week_start: WeekStart) -> Self {
        self.first_day_of_week = week_start;
        self
    }

    pub fn with_show_cancelled(mut self, show: bool) -> Self {
        self.show_cancelled_occurrences = show;
        self
    }

    pub fn with_use_timezone(mut self, use_timezone: bool) -> Self {
        self.use_timezone = use_timezone;
        self
    }

    pub fn with_ambiguous(mut self, policy: AmbiguousPolicy) -> Self {
        self.ambiguous = policy;
        self
    }
}
