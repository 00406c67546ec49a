use clap::{Parser, Subcommand};

/// Calendar period and agenda tool
#[derive(Parser, Debug)]
#[command(name = "calperiod", version)]
#[command(about = "Calendar period and agenda tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose (debug) logging
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List a calendar unit or the units inside it
    Periods(PeriodsArgs),
    /// Classify event occurrences per period
    Agenda(AgendaArgs),
    /// Show how a point in time normalizes to UTC
    Normalize(NormalizeArgs),
}

/// Settings shared by every subcommand.
#[derive(clap::Args, Debug)]
pub struct CalendarArgs {
    /// Week start day: monday or sunday
    #[arg(long)]
    pub week_start: Option<String>,

    /// Classify cancelled occurrences instead of hiding them
    #[arg(long)]
    pub show_cancelled: bool,

    /// Ignore timezones and treat wall clocks as UTC
    #[arg(long)]
    pub no_timezone: bool,

    /// Policy for ambiguous local times: first, second
    #[arg(long)]
    pub ambiguous: Option<String>,

    /// Output format: json, text
    #[arg(long, default_value = "json")]
    pub output_format: String,
}

#[derive(clap::Args, Debug)]
pub struct PeriodsArgs {
    /// Unit to list: year, month, week, day
    #[arg(short, long, default_value = "day")]
    pub unit: String,

    /// Containing unit; lists every unit inside it
    #[arg(long)]
    pub of: Option<String>,

    /// Anchor date or time (RFC3339, YYYY-MM-DD[THH:MM[:SS]] or epoch); defaults to now
    #[arg(short, long)]
    pub date: Option<String>,

    /// IANA timezone (e.g., Europe/Berlin)
    #[arg(short, long, default_value = "UTC")]
    pub tz: String,

    #[command(flatten)]
    pub calendar: CalendarArgs,
}

#[derive(clap::Args, Debug)]
pub struct AgendaArgs {
    /// Event catalog JSON file (use - for stdin)
    #[arg(short, long)]
    pub events: String,

    /// Unit covered by the agenda: year, month, week, day
    #[arg(short, long, default_value = "week")]
    pub unit: String,

    /// Split the agenda into units of this kind
    #[arg(long)]
    pub by: Option<String>,

    /// Anchor date or time; defaults to now
    #[arg(short, long)]
    pub date: Option<String>,

    /// IANA timezone, overriding the catalog's
    #[arg(short, long)]
    pub tz: Option<String>,

    #[command(flatten)]
    pub calendar: CalendarArgs,
}

#[derive(clap::Args, Debug)]
pub struct NormalizeArgs {
    /// Point in time (RFC3339, local datetime, date or epoch)
    #[arg(short, long)]
    pub point: String,

    /// IANA timezone used for local input
    #[arg(short, long, default_value = "UTC")]
    pub tz: String,

    #[command(flatten)]
    pub calendar: CalendarArgs,
}
