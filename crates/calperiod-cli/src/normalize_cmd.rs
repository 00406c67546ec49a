use std::process::ExitCode;

use calperiod_core::tz::{LocalStatus, format_rfc3339, format_rfc3339_utc, inspect_local, normalize};
use calperiod_core::{PeriodConfig, PointInTime, parse_point};
use chrono_tz::Tz;
use serde::Serialize;

use crate::cli::NormalizeArgs;
use crate::error::{CliError, CliResult, EXIT_SUCCESS, OutputFormat};
use crate::shared::{build_config, parse_tz_or_input_error, print_json};

pub fn run_normalize(args: NormalizeArgs, output_format: OutputFormat) -> CliResult<ExitCode> {
    let tz = parse_tz_or_input_error(&args.tz)?;
    let config = build_config(PeriodConfig::default(), &args.calendar)?;
    let point = parse_point(&args.point)
        .map_err(|e| CliError::input(format!("Invalid point in time: {}", e)))?;

    let result = explain_point(&args.point, point, tz, &config);

    match output_format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Text => {
            println!("Input: {} ({})", result.input, result.kind);
            match &result.tz {
                Some(tz) => println!("Timezone: {}", tz),
                None => println!("Timezone: none"),
            }
            println!("Status: {}", result.status);
            println!("UTC: {}", result.utc);
            println!("Local: {}", result.local);
        }
    }

    Ok(ExitCode::from(EXIT_SUCCESS))
}

#[derive(Debug, Serialize)]
struct NormalizeResult {
    input: String,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tz: Option<String>,
    status: String,
    utc: String,
    local: String,
}

fn explain_point(input: &str, point: PointInTime, tz: Tz, config: &PeriodConfig) -> NormalizeResult {
    let zone = Some(tz).filter(|_| config.use_timezone);
    let utc = normalize(point, zone, config);

    let (kind, status) = match point {
        PointInTime::Naive(local) => (
            "naive",
            zone.map_or(LocalStatus::Normal, |tz| inspect_local(local, tz)),
        ),
        PointInTime::Aware(_) => ("aware", LocalStatus::Normal),
    };

    NormalizeResult {
        input: input.trim().to_string(),
        kind,
        tz: zone.map(|tz| tz.to_string()),
        status: status.to_string(),
        utc: format_rfc3339_utc(&utc),
        local: format_rfc3339(&utc.with_timezone(&zone.unwrap_or(Tz::UTC))),
    }
}
