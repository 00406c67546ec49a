use std::process::ExitCode;

use calperiod_core::tz::format_rfc3339;
use calperiod_core::{CalendarUnit, Classification};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

use crate::cli::AgendaArgs;
use crate::error::{CliError, CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::{
    UnitRow, build_config, load_catalog, parse_anchor, parse_tz_or_input_error, parse_unit,
    print_json,
};

pub fn run_agenda(args: AgendaArgs, output_format: OutputFormat) -> CliResult<ExitCode> {
    let unit = parse_unit(&args.unit)?;
    let by = args.by.as_deref().map(parse_unit).transpose()?;
    let anchor = parse_anchor(args.date.as_deref())?;

    let mut catalog =
        load_catalog(&args.events).map_err(|e| CliError::input(format!("{:#}", e)))?;
    if let Some(tz) = &args.tz {
        parse_tz_or_input_error(tz)?;
        catalog.timezone = Some(tz.clone());
    }
    let config = build_config(catalog.config.unwrap_or_default(), &args.calendar)?;
    let context = catalog.into_context(Some(config))?;

    let root = CalendarUnit::new(unit, context, anchor)?;
    let periods = match by {
        Some(kind) => root
            .get_periods(kind)?
            .collect::<calperiod_core::Result<Vec<_>>>()?,
        None => vec![root],
    };

    let rows = periods
        .iter()
        .map(agenda_row)
        .collect::<CliResult<Vec<_>>>()?;
    debug!(
        periods = rows.len(),
        entries = rows.iter().map(|r| r.occurrences.len()).sum::<usize>(),
        "Built agenda"
    );

    match output_format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Text => {
            for row in rows {
                print_text_row(&row);
            }
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}

#[derive(Debug, Serialize)]
struct AgendaRow {
    #[serde(flatten)]
    unit: UnitRow,
    all_day: Vec<String>,
    occurrences: Vec<AgendaEntry>,
}

#[derive(Debug, Serialize)]
struct AgendaEntry {
    event: String,
    title: String,
    class: String,
    code: u8,
    all_day: bool,
    cancelled: bool,
    start: String,
    end: String,
}

fn agenda_row(unit: &CalendarUnit) -> CliResult<AgendaRow> {
    let zone = unit.reference_zone().unwrap_or(Tz::UTC);

    let all_day = unit
        .get_all_day_occurrences()?
        .into_iter()
        .map(|occ| occ.event.id.clone())
        .collect();

    let occurrences = unit
        .get_occurrence_partials()?
        .iter()
        .map(|partial| agenda_entry(partial, zone))
        .collect();

    Ok(AgendaRow {
        unit: UnitRow::from_unit(unit),
        all_day,
        occurrences,
    })
}

fn agenda_entry(partial: &Classification<'_>, zone: Tz) -> AgendaEntry {
    let occ = partial.occurrence;
    AgendaEntry {
        event: occ.event.id.clone(),
        title: occ.event.title.clone(),
        class: partial.class.to_string(),
        code: partial.class.code(),
        all_day: partial.all_day,
        cancelled: occ.cancelled,
        start: format_rfc3339(&occ.start.with_timezone(&zone)),
        end: format_rfc3339(&occ.end.with_timezone(&zone)),
    }
}

fn print_text_row(row: &AgendaRow) {
    println!("{} ({})", row.unit.key, row.unit.name);
    if row.occurrences.is_empty() {
        println!("  (no occurrences)");
    }
    for entry in &row.occurrences {
        let marker = if entry.cancelled { " [cancelled]" } else { "" };
        println!(
            "  {:<9} {} {} to {}{}",
            entry.class, entry.title, entry.start, entry.end, marker
        );
    }
    if !row.all_day.is_empty() {
        println!("  all day: {}", row.all_day.join(", "));
    }
}
