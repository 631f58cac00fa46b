//! Reporting utilities: summary text, tables and JSON output.

pub mod format;

pub use format::*;
