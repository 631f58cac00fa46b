//! Shared "load data" pipeline used by both CLI and TUI front-ends.
//!
//! Query -> paginated fetch -> aggregate.
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use tracing::{info, warn};

use crate::aggregate::{Aggregate, AggregateError, aggregate};
use crate::data::{FetchFailure, FetchOutcome, PageSource, fetch_all};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::query::Query;

/// Whether the aggregate covers everything the API holds for the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataStatus {
    Complete,
    /// Pagination stopped on a failed request; the aggregate is built from
    /// the rows received before it.
    Partial(FetchFailure),
}

/// All computed outputs of a single load.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub query: Query,
    pub status: DataStatus,
    pub records_fetched: usize,
    pub aggregate: Aggregate,
}

impl RunOutput {
    pub fn is_partial(&self) -> bool {
        matches!(self.status, DataStatus::Partial(_))
    }
}

/// Fetch and aggregate the records for `query`.
pub fn run_query<S: PageSource + ?Sized>(source: &S, query: &Query) -> Result<RunOutput, AppError> {
    let params = query.params()?;
    info!(
        region = %query.region,
        start = %query.start,
        end = %query.end,
        "loading eco2mix records"
    );

    let outcome = fetch_all(source, &params);
    let (records, status) = match outcome {
        FetchOutcome::Empty => return Err(no_data(query)),
        FetchOutcome::Complete(records) => (records, DataStatus::Complete),
        FetchOutcome::Partial { records, failure } if records.is_empty() => {
            return Err(AppError::new(EXIT_RUNTIME, failure.to_string()));
        }
        FetchOutcome::Partial { records, failure } => {
            warn!(kept = records.len(), error = %failure, "using partial data");
            (records, DataStatus::Partial(failure))
        }
    };

    let records_fetched = records.len();
    let aggregate = match (aggregate(records), &status) {
        (Ok(aggregate), _) => aggregate,
        // Rows arrived but none were usable, and the rest never came: report
        // the failed request, not an empty period.
        (Err(AggregateError::NoData), DataStatus::Partial(failure)) => {
            return Err(AppError::new(
                EXIT_RUNTIME,
                format!("{failure} None of the {records_fetched} record(s) received before it had a usable timestamp."),
            ));
        }
        (Err(AggregateError::NoData), DataStatus::Complete) => return Err(no_data(query)),
    };

    if aggregate.skipped_records > 0 {
        warn!(skipped = aggregate.skipped_records, "records without a usable timestamp were ignored");
    }

    Ok(RunOutput {
        query: query.clone(),
        status,
        records_fetched,
        aggregate,
    })
}

fn no_data(query: &Query) -> AppError {
    AppError::new(
        EXIT_RUNTIME,
        format!(
            "No data for {} between {} and {}.",
            query.region, query.start, query.end
        ),
    )
}
