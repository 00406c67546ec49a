use std::process::ExitCode;
use std::sync::Arc;

use calperiod_core::{CalendarUnit, OccurrenceSource, PeriodConfig, PeriodContext};
use tracing::debug;

use crate::cli::PeriodsArgs;
use crate::error::{CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::{
    UnitRow, build_config, parse_anchor, parse_tz_or_input_error, parse_unit, print_json,
};

pub fn run_periods(args: PeriodsArgs, output_format: OutputFormat) -> CliResult<ExitCode> {
    let tz = parse_tz_or_input_error(&args.tz)?;
    let unit = parse_unit(&args.unit)?;
    let container = args.of.as_deref().map(parse_unit).transpose()?;
    let config = build_config(PeriodConfig::default(), &args.calendar)?;
    let anchor = parse_anchor(args.date.as_deref())?;

    let context = PeriodContext::new(std::iter::empty::<Arc<dyn OccurrenceSource>>())
        .with_config(config)
        .with_zone(Some(tz));

    let units = match container {
        Some(kind) => CalendarUnit::new(kind, context, anchor)?
            .get_periods(unit)?
            .collect::<calperiod_core::Result<Vec<_>>>()?,
        None => vec![CalendarUnit::new(unit, context, anchor)?],
    };
    debug!(unit = %unit, count = units.len(), "Listed calendar units");

    let rows: Vec<UnitRow> = units.iter().map(UnitRow::from_unit).collect();

    match output_format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Text => {
            for row in rows {
                println!(
                    "{} ({}): {} to {}",
                    row.key, row.name, row.start_local, row.end_local
                );
            }
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}
