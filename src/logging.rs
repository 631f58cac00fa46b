//! Tracing subscriber setup.
//!
//! CLI commands log to stderr. The TUI owns the terminal, so it only logs when
//! a file is given. `RUST_LOG` overrides the default filter.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::error::{AppError, EXIT_INPUT, EXIT_RUNTIME};

const DEFAULT_FILTER: &str = "eco2mix_monitor=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
    Off,
}

pub fn init(target: LogTarget) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = match target {
        LogTarget::Off => return Ok(()),
        LogTarget::Stderr => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
        LogTarget::File(path) => {
            let file = File::create(&path).map_err(|e| {
                AppError::new(EXIT_INPUT, format!("Failed to create log file '{}': {e}", path.display()))
            })?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
    };

    result.map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to initialize logging: {e}")))
}
