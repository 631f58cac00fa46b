//! Command-line parsing for the eco2mix monitor.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fetching/aggregation code.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::data::DEFAULT_BASE_URL;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "eco2mix", version, about = "Regional electricity consumption & production monitor (eco2mix open data)")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct GlobalArgs {
    /// Records endpoint of the eco2mix regional dataset.
    #[arg(long, global = true, env = "ECO2MIX_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Per-request timeout in seconds (default: wait indefinitely).
    #[arg(long, global = true, env = "ECO2MIX_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Write logs to this file (the TUI logs nowhere otherwise).
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Launch the interactive TUI.
    Tui(TuiArgs),
    /// List the region labels known to the API.
    Regions,
    /// Print the `where` clause for a date range and region (no network).
    Query(RangeArgs),
    /// Fetch, aggregate and print a consumption/production report.
    Report(ReportArgs),
}

/// Date range and region.
#[derive(Debug, Args, Clone)]
pub struct RangeArgs {
    /// First day of the period (YYYY-MM-DD or DD/MM/YYYY).
    #[arg(short = 's', long, value_parser = parse_date)]
    pub start: NaiveDate,

    /// Last day of the period (YYYY-MM-DD or DD/MM/YYYY).
    #[arg(short = 'e', long, value_parser = parse_date)]
    pub end: NaiveDate,

    /// Region label, exactly as listed by `eco2mix regions`.
    #[arg(short = 'r', long)]
    pub region: String,
}

#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub range: RangeArgs,

    /// Render an ASCII consumption plot.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Print the aggregate as JSON instead of text.
    #[arg(long, conflicts_with = "plot")]
    pub json: bool,

    /// Exit successfully even when pagination stopped on a failed request.
    #[arg(long)]
    pub allow_partial: bool,

    /// Skip checking the region against the API's region list.
    #[arg(long)]
    pub no_region_check: bool,
}

/// Initial TUI selections (all optional).
#[derive(Debug, Args, Clone, Default)]
pub struct TuiArgs {
    #[arg(short = 's', long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    #[arg(short = 'e', long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    #[arg(short = 'r', long)]
    pub region: Option<String>,
}

/// Parse `YYYY-MM-DD` or `DD/MM/YYYY`.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%d/%m/%Y"))
        .map_err(|_| format!("invalid date '{trimmed}' (expected YYYY-MM-DD or DD/MM/YYYY)"))
}
