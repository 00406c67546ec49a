use std::process::ExitCode;

use clap::Parser;
use tracing::debug;

mod agenda_cmd;
mod cli;
mod error;
mod normalize_cmd;
mod periods_cmd;
mod shared;

use agenda_cmd::run_agenda;
use cli::{Cli, Commands};
use error::{CliResult, OutputFormat, output_format_hint, parse_output_format, render_error};
use normalize_cmd::run_normalize;
use periods_cmd::run_periods;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!("Parsed CLI args: {:?}", cli);

    match cli.command {
        Commands::Periods(args) => {
            let format = args.calendar.output_format.clone();
            dispatch(&format, |output_format| run_periods(args, output_format))
        }
        Commands::Agenda(args) => {
            let format = args.calendar.output_format.clone();
            dispatch(&format, |output_format| run_agenda(args, output_format))
        }
        Commands::Normalize(args) => {
            let format = args.calendar.output_format.clone();
            dispatch(&format, |output_format| run_normalize(args, output_format))
        }
    }
}

/// Resolve the output format, run the command and render any error in
/// that format (text when the format itself is invalid and not `json`).
fn dispatch(format: &str, run: impl FnOnce(OutputFormat) -> CliResult<ExitCode>) -> ExitCode {
    let output_format = match parse_output_format(format) {
        Ok(format) => format,
        Err(err) => return render_error(&err, output_format_hint(format)),
    };

    match run(output_format) {
        Ok(code) => code,
        Err(err) => render_error(&err, output_format),
    }
}
