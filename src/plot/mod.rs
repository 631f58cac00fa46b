//! Terminal plots for CLI output.

pub mod ascii;

pub use ascii::render_consumption_plot;
