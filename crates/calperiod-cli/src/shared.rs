use std::fs;
use std::io::Read;

use anyhow::Context;
use calperiod_core::tz::{format_rfc3339, format_rfc3339_utc, parse_tz};
use calperiod_core::{
    AmbiguousPolicy, CalendarUnit, EventCatalog, PeriodConfig, PointInTime, UnitKind, WeekStart,
    parse_point,
};
use chrono::Utc;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::cli::CalendarArgs;
use crate::error::{CliError, CliResult};

pub fn parse_unit(s: &str) -> CliResult<UnitKind> {
    s.parse().map_err(|_| {
        CliError::input(format!(
            "Invalid unit '{}'. Expected: year, month, week, day",
            s
        ))
    })
}

pub fn parse_week_start(s: &str) -> CliResult<WeekStart> {
    s.parse().map_err(|_| {
        CliError::input(format!(
            "Invalid week_start '{}'. Expected: monday, sunday",
            s
        ))
    })
}

pub fn parse_ambiguous_policy(s: &str) -> CliResult<AmbiguousPolicy> {
    match s.to_lowercase().as_str() {
        "first" => Ok(AmbiguousPolicy::First),
        "second" => Ok(AmbiguousPolicy::Second),
        _ => Err(CliError::input(format!(
            "Invalid ambiguous policy '{}'. Expected: first, second",
            s
        ))),
    }
}

pub fn parse_tz_or_input_error(name: &str) -> CliResult<Tz> {
    parse_tz(name).map_err(|e| CliError::input(format!("Invalid timezone '{}': {}", name, e)))
}

/// The anchor for a unit lookup; the current instant when none is given.
pub fn parse_anchor(date: Option<&str>) -> CliResult<PointInTime> {
    match date {
        Some(text) => {
            parse_point(text).map_err(|e| CliError::input(format!("Invalid date: {}", e)))
        }
        None => Ok(PointInTime::Aware(Utc::now())),
    }
}

/// Apply command-line settings on top of `base`.
///
/// Switches only ever turn their setting on, so a catalog that enables
/// cancelled occurrences cannot be overridden back to hidden.
pub fn build_config(base: PeriodConfig, args: &CalendarArgs) -> CliResult<PeriodConfig> {
    let mut config = base;
    if let Some(week_start) = &args.week_start {
        config = config.with_first_day_of_week(parse_week_start(week_start)?);
    }
    if let Some(policy) = &args.ambiguous {
        config = config.with_ambiguous(parse_ambiguous_policy(policy)?);
    }
    if args.show_cancelled {
        config = config.with_show_cancelled(true);
    }
    if args.no_timezone {
        config = config.with_use_timezone(false);
    }
    Ok(config)
}

/// Read an event catalog from a file, or stdin for `-`.
pub fn load_catalog(path: &str) -> anyhow::Result<EventCatalog> {
    let content = if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read events from stdin")?;
        buffer
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read events file: {path}"))?
    };

    let catalog: EventCatalog = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse events file: {path}"))?;
    debug!(
        events = catalog.events.len(),
        overrides = catalog.overrides.len(),
        "Loaded event catalog from {}",
        path
    );
    Ok(catalog)
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::runtime(format!("Failed to serialize JSON: {}", e)))?;
    println!("{}", json);
    Ok(())
}

/// Bounds and labels of one calendar unit, as printed by every command.
#[derive(Debug, Serialize)]
pub struct UnitRow {
    pub kind: UnitKind,
    pub key: String,
    pub name: String,
    pub start_local: String,
    pub end_local: String,
    pub start_utc: String,
    pub end_utc: String,
}

impl UnitRow {
    pub fn from_unit(unit: &CalendarUnit) -> Self {
        Self {
            kind: unit.kind(),
            key: unit.key(),
            name: unit.name(),
            start_local: format_rfc3339(&unit.start()),
            end_local: format_rfc3339(&unit.end()),
            start_utc: format_rfc3339_utc(&unit.utc_start()),
            end_utc: format_rfc3339_utc(&unit.utc_end()),
        }
    }
}
