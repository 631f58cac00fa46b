//! `eco2mix-monitor` library crate.
//!
//! The binary (`eco2mix`) is a thin wrapper around this library so that:
//!
//! - core logic (query building, paginated fetching, aggregation) is testable
//!   without a network or a terminal
//! - the TUI and the one-shot CLI commands share one pipeline

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod logging;
pub mod plot;
pub mod query;
pub mod report;
pub mod tui;
