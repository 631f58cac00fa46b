//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw API rows (`Record`, `RecordSet`) with typed accessors
//! - the fixed list of production sources (`ProductionSource`)
//! - the API field names read downstream

pub mod types;

pub use types::*;
