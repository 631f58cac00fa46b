//! Application-level error type.
//!
//! Library modules return their own typed errors (`FetchFailure`,
//! `AggregateError`, `QueryError`); anything that reaches the binary is folded
//! into an `AppError` carrying the process exit code.
//!
//! Exit codes:
//! - `2` invalid input / usage
//! - `3` partial data (a page request failed mid-pagination)
//! - `4` remote or runtime failure

use crate::data::FetchFailure;
use crate::query::QueryError;

pub const EXIT_INPUT: u8 = 2;
pub const EXIT_PARTIAL: u8 = 3;
pub const EXIT_RUNTIME: u8 = 4;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<QueryError> for AppError {
    fn from(err: QueryError) -> Self {
        AppError::new(EXIT_INPUT, err.to_string())
    }
}

impl From<FetchFailure> for AppError {
    fn from(err: FetchFailure) -> Self {
        AppError::new(EXIT_RUNTIME, err.to_string())
    }
}
