//! Remote data access.
//!
//! - `eco2mix`: paginated records fetcher, region list, HTTP client

pub mod eco2mix;

pub use eco2mix::{
    DEFAULT_BASE_URL, Eco2mixClient, FetchFailure, FetchOutcome, PAGE_SIZE, PageSource, fetch_all, fetch_regions,
    for_each_page,
};
