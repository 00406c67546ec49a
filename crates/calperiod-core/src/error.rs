//! Error types for calperiod-core.
//!
//! Period math itself is total; errors come from malformed text input,
//! inverted windows, calendar arithmetic leaving chrono's range, and the
//! external occurrence collaborators.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// The main error type for period operations.
#[derive(Debug, Error)]
pub enum PeriodError {
    /// A window was requested whose start lies after its end.
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// Invalid timezone name provided.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// Error parsing a point in time.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Calendar arithmetic produced a date chrono cannot represent.
    #[error("Date out of range: {0}")]
    OutOfRange(String),

    /// Failure reported by an occurrence source or store, passed through as is.
    #[error(transparent)]
    Collaborator(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for period operations.
pub type Result<T> = std::result::Result<T, PeriodError>;
