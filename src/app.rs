//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - builds the eco2mix client
//! - dispatches to the TUI or a one-shot command

use std::time::Duration;

use clap::Parser;
use tracing::warn;

use crate::cli::{Command, GlobalArgs, RangeArgs, ReportArgs, TuiArgs};
use crate::data::{Eco2mixClient, fetch_regions};
use crate::error::{AppError, EXIT_INPUT, EXIT_PARTIAL};
use crate::logging::LogTarget;
use crate::query::Query;

pub mod pipeline;

use pipeline::DataStatus;

/// Entry point for the `eco2mix` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `eco2mix` and `eco2mix -r Bretagne` behave like `eco2mix tui ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let target = match (&cli.command, &cli.global.log_file) {
        (_, Some(path)) => LogTarget::File(path.clone()),
        (Command::Tui(_), None) => LogTarget::Off,
        _ => LogTarget::Stderr,
    };
    crate::logging::init(target)?;

    match cli.command {
        Command::Tui(args) => handle_tui(&cli.global, args),
        Command::Regions => handle_regions(&cli.global),
        Command::Query(args) => handle_query(&args),
        Command::Report(args) => handle_report(&cli.global, &args),
    }
}

pub fn client_from_args(global: &GlobalArgs) -> Result<Eco2mixClient, AppError> {
    Eco2mixClient::new(global.api_url.clone(), global.timeout_secs.map(Duration::from_secs))
}

fn handle_tui(global: &GlobalArgs, args: TuiArgs) -> Result<(), AppError> {
    let client = client_from_args(global)?;
    crate::tui::run(client, args)
}

fn handle_regions(global: &GlobalArgs) -> Result<(), AppError> {
    let client = client_from_args(global)?;
    let regions = fetch_regions(&client)?;
    print!("{}", crate::report::format_regions(&regions));
    Ok(())
}

fn handle_query(args: &RangeArgs) -> Result<(), AppError> {
    let query = Query::new(args.start, args.end, args.region.clone())?;
    println!("{}", query.filter()?.to_expression());
    Ok(())
}

fn handle_report(global: &GlobalArgs, args: &ReportArgs) -> Result<(), AppError> {
    let query = Query::new(args.range.start, args.range.end, args.range.region.clone())?;
    let client = client_from_args(global)?;

    if !args.no_region_check {
        let regions = fetch_regions(&client)?;
        ensure_known_region(&query.region, &regions)?;
    }

    let run = pipeline::run_query(&client, &query)?;

    if args.json {
        println!("{}", crate::report::format_json(&run)?);
    } else {
        print!("{}", crate::report::format_report(&run));
        if args.plot {
            println!();
            print!(
                "{}",
                crate::plot::render_consumption_plot(&run.aggregate.series, args.width, args.height)
            );
        }
    }

    match &run.status {
        DataStatus::Complete => Ok(()),
        DataStatus::Partial(failure) if args.allow_partial => {
            warn!(error = %failure, "report built from partial data");
            Ok(())
        }
        DataStatus::Partial(failure) => Err(AppError::new(
            EXIT_PARTIAL,
            format!("Data is incomplete ({failure}). Pass --allow-partial to accept it."),
        )),
    }
}

/// Reject labels the API does not know, suggesting close matches.
pub fn ensure_known_region(region: &str, regions: &[String]) -> Result<(), AppError> {
    if regions.iter().any(|r| r == region) {
        return Ok(());
    }

    let needle = region.to_lowercase();
    let close: Vec<&str> = regions
        .iter()
        .filter(|r| {
            let hay = r.to_lowercase();
            hay.contains(&needle) || needle.contains(&hay)
        })
        .map(String::as_str)
        .collect();

    let hint = if close.is_empty() {
        "Run `eco2mix regions` for the list.".to_string()
    } else {
        format!("Did you mean: {}?", close.join(", "))
    };
    Err(AppError::new(EXIT_INPUT, format!("Unknown region '{region}'. {hint}")))
}

/// Options that consume the next token as their value.
const VALUE_OPTIONS: &[&str] = &[
    "--api-url",
    "--timeout-secs",
    "--log-file",
    "-s",
    "--start",
    "-e",
    "--end",
    "-r",
    "--region",
];

/// Rewrite argv so `eco2mix` defaults to `eco2mix tui`.
///
/// Rules:
/// - `eco2mix`                          -> `eco2mix tui`
/// - `eco2mix -r Bretagne ...`          -> `eco2mix tui -r Bretagne ...`
/// - `eco2mix --help/--version/-h`      -> unchanged (show top-level help/version)
/// - any positional token (subcommand or typo) -> unchanged, clap handles it
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1) else {
        argv.push("tui".to_string());
        return argv;
    };

    if matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version") {
        return argv;
    }

    if first_positional(&argv[1..]).is_none() {
        argv.insert(1, "tui".to_string());
    }
    argv
}

/// First token that is neither an option nor an option's value.
fn first_positional(args: &[String]) -> Option<&str> {
    let mut tokens = args.iter();
    while let Some(token) = tokens.next() {
        if VALUE_OPTIONS.contains(&token.as_str()) {
            tokens.next();
        } else if !token.starts_with('-') {
            return Some(token.as_str());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_launches_tui() {
        assert_eq!(rewrite_args(argv(&["eco2mix"])), argv(&["eco2mix", "tui"]));
        assert_eq!(
            rewrite_args(argv(&["eco2mix", "-r", "Bretagne"])),
            argv(&["eco2mix", "tui", "-r", "Bretagne"])
        );
    }

    #[test]
    fn explicit_subcommands_are_untouched() {
        let a = argv(&["eco2mix", "--api-url", "http://localhost", "regions"]);
        assert_eq!(rewrite_args(a.clone()), a);
        let b = argv(&["eco2mix", "--help"]);
        assert_eq!(rewrite_args(b.clone()), b);
    }

    #[test]
    fn option_values_are_not_mistaken_for_subcommands() {
        assert_eq!(
            rewrite_args(argv(&["eco2mix", "--log-file", "report"])),
            argv(&["eco2mix", "tui", "--log-file", "report"])
        );
        assert_eq!(
            rewrite_args(argv(&["eco2mix", "-r", "query", "--api-url", "http://localhost"])),
            argv(&["eco2mix", "tui", "-r", "query", "--api-url", "http://localhost"])
        );

        let explicit = argv(&["eco2mix", "--log-file", "out.log", "report", "-s", "2024-01-01"]);
        assert_eq!(rewrite_args(explicit.clone()), explicit);

        // Unknown positionals reach clap untouched.
        let typo = argv(&["eco2mix", "reprot"]);
        assert_eq!(rewrite_args(typo.clone()), typo);
    }

    #[test]
    fn rewritten_args_parse() {
        let cli = crate::cli::Cli::parse_from(rewrite_args(argv(&["eco2mix", "--log-file", "report"])));
        assert!(matches!(cli.command, Command::Tui(_)));
        assert_eq!(cli.global.log_file, Some(std::path::PathBuf::from("report")));
    }

    #[test]
    fn unknown_region_suggests_matches() {
        let regions = vec!["Bretagne".to_string(), "Grand Est".to_string(), "Normandie".to_string()];
        assert!(ensure_known_region("Bretagne", &regions).is_ok());

        let err = ensure_known_region("bretagne", &regions).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_INPUT);
        assert_eq!(err.message(), "Unknown region 'bretagne'. Did you mean: Bretagne?");

        let err = ensure_known_region("Corse", &regions).unwrap_err();
        assert!(err.message().ends_with("Run `eco2mix regions` for the list."));
    }
}
