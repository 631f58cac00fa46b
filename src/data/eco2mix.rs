//! eco2mix open-data API integration.
//!
//! Records are fetched page by page (`limit`/`offset`) until a short page
//! signals the end of the data or a request fails. A failure never discards
//! what was already received: it is reported as `FetchOutcome::Partial`.

use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::{Record, RecordSet};
use crate::error::{AppError, EXIT_RUNTIME};
use crate::query::QueryParams;

pub const DEFAULT_BASE_URL: &str =
    "https://odre.opendatasoft.com/api/explore/v2.1/catalog/datasets/eco2mix-regional-tr/records";

/// Rows requested per page.
pub const PAGE_SIZE: usize = 100;

/// Why a page request did not produce rows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("eco2mix request at offset {offset} failed with status {status}.")]
    Status { offset: usize, status: u16 },
    #[error("eco2mix request at offset {offset} failed: {message}")]
    Transport { offset: usize, message: String },
    #[error("Failed to parse eco2mix response at offset {offset}: {message}")]
    Decode { offset: usize, message: String },
}

impl FetchFailure {
    pub fn offset(&self) -> usize {
        match self {
            FetchFailure::Status { offset, .. }
            | FetchFailure::Transport { offset, .. }
            | FetchFailure::Decode { offset, .. } => *offset,
        }
    }
}

/// One page of rows from some backing store.
pub trait PageSource {
    fn fetch_page(&self, params: &QueryParams, offset: usize, limit: usize) -> Result<Vec<Record>, FetchFailure>;
}

/// Result of a full paginated fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Pagination ended on a short page; at least one record.
    Complete(RecordSet),
    /// A request failed; `records` holds every row received before it.
    Partial {
        records: RecordSet,
        failure: FetchFailure,
    },
    /// The first page was empty.
    Empty,
}

impl FetchOutcome {
    pub fn records(&self) -> &[Record] {
        match self {
            FetchOutcome::Complete(records) | FetchOutcome::Partial { records, .. } => records,
            FetchOutcome::Empty => &[],
        }
    }

    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            FetchOutcome::Partial { failure, .. } => Some(failure),
            _ => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, FetchOutcome::Complete(_))
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }
}

/// How a pagination loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagingEnd {
    Exhausted,
    Failed(FetchFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingSummary {
    pub requests: usize,
    pub rows: usize,
    pub end: PagingEnd,
}

/// Walk every page, handing each one to `on_page` as it arrives.
///
/// Stops after a page shorter than `PAGE_SIZE` or after the first failed
/// request. Nothing is accumulated here; callers decide what to keep.
pub fn for_each_page<S, F>(source: &S, params: &QueryParams, mut on_page: F) -> PagingSummary
where
    S: PageSource + ?Sized,
    F: FnMut(usize, Vec<Record>),
{
    let mut offset = 0;
    let mut requests = 0;
    let mut rows = 0;

    loop {
        requests += 1;
        let page = match source.fetch_page(params, offset, PAGE_SIZE) {
            Ok(page) => page,
            Err(failure) => {
                warn!(offset, rows, error = %failure, "pagination stopped early");
                return PagingSummary {
                    requests,
                    rows,
                    end: PagingEnd::Failed(failure),
                };
            }
        };

        let n = page.len();
        rows += n;
        debug!(offset, page_rows = n, total_rows = rows, "fetched page");
        on_page(offset, page);

        if n < PAGE_SIZE {
            return PagingSummary {
                requests,
                rows,
                end: PagingEnd::Exhausted,
            };
        }
        offset += PAGE_SIZE;
    }
}

/// Fetch every matching record into one `RecordSet`.
pub fn fetch_all<S: PageSource + ?Sized>(source: &S, params: &QueryParams) -> FetchOutcome {
    let mut records = Vec::new();
    let summary = for_each_page(source, params, |_, page| records.extend(page));
    info!(requests = summary.requests, rows = summary.rows, "fetch finished");

    match summary.end {
        PagingEnd::Failed(failure) => FetchOutcome::Partial { records, failure },
        PagingEnd::Exhausted if records.is_empty() => FetchOutcome::Empty,
        PagingEnd::Exhausted => FetchOutcome::Complete(records),
    }
}

/// Distinct region labels, sorted.
///
/// A truncated region list would silently hide regions from the picker, so
/// any failed page is an error here.
pub fn fetch_regions<S: PageSource + ?Sized>(source: &S) -> Result<Vec<String>, FetchFailure> {
    let outcome = fetch_all(source, &QueryParams::regions());
    if let FetchOutcome::Partial { failure, .. } = outcome {
        return Err(failure);
    }

    let labels: BTreeSet<String> = outcome
        .records()
        .iter()
        .filter_map(|r| r.region())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    Ok(labels.into_iter().collect())
}

/// HTTP client for the records endpoint.
pub struct Eco2mixClient {
    client: Client,
    base_url: String,
}

impl Eco2mixClient {
    /// `timeout = None` waits indefinitely on a slow endpoint.
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl PageSource for Eco2mixClient {
    fn fetch_page(&self, params: &QueryParams, offset: usize, limit: usize) -> Result<Vec<Record>, FetchFailure> {
        let limit = limit.to_string();
        let offset_param = offset.to_string();

        let mut req = self
            .client
            .get(&self.base_url)
            .query(&[("limit", limit.as_str()), ("offset", offset_param.as_str())]);

        let extra = params.pairs();
        if !extra.is_empty() {
            req = req.query(&extra);
        }

        let resp = req.send().map_err(|e| FetchFailure::Transport {
            offset,
            message: e.to_string(),
        })?;

        if !resp.status().is_success() {
            return Err(FetchFailure::Status {
                offset,
                status: resp.status().as_u16(),
            });
        }

        let body: RecordsResponse = resp.json().map_err(|e| FetchFailure::Decode {
            offset,
            message: e.to_string(),
        })?;

        Ok(body.results)
    }
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    results: Vec<Record>,
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;

    /// Serves pre-sized pages and fails at a chosen request index.
    struct StubSource {
        page_sizes: Vec<usize>,
        fail_at: Option<usize>,
        offsets: RefCell<Vec<usize>>,
    }

    impl StubSource {
        fn new(page_sizes: Vec<usize>) -> Self {
            Self {
                page_sizes,
                fail_at: None,
                offsets: RefCell::new(Vec::new()),
            }
        }

        fn failing_at(mut self, request: usize) -> Self {
            self.fail_at = Some(request);
            self
        }
    }

    impl PageSource for StubSource {
        fn fetch_page(&self, _params: &QueryParams, offset: usize, limit: usize) -> Result<Vec<Record>, FetchFailure> {
            assert_eq!(limit, PAGE_SIZE);
            let idx = {
                let mut offsets = self.offsets.borrow_mut();
                offsets.push(offset);
                offsets.len() - 1
            };
            if self.fail_at == Some(idx) {
                return Err(FetchFailure::Status { offset, status: 503 });
            }
            let n = self.page_sizes.get(idx).copied().unwrap_or(0);
            Ok((0..n)
                .map(|i| {
                    serde_json::from_value(json!({"row": offset + i, "libelle_region": "Bretagne"}))
                        .unwrap()
                })
                .collect())
        }
    }

    #[test]
    fn collects_all_pages_until_short_page() {
        let source = StubSource::new(vec![100, 100, 37]);
        let outcome = fetch_all(&source, &QueryParams::default());

        assert!(outcome.is_complete());
        assert_eq!(outcome.len(), 237);
        assert_eq!(*source.offsets.borrow(), vec![0, 100, 200]);
        let last = outcome.records().last().unwrap();
        assert_eq!(last.get("row"), Some(&json!(236)));
    }

    #[test]
    fn failure_on_second_page_keeps_first_page() {
        let source = StubSource::new(vec![100, 100, 37]).failing_at(1);
        let outcome = fetch_all(&source, &QueryParams::default());

        assert_eq!(outcome.len(), 100);
        assert_eq!(
            outcome.failure(),
            Some(&FetchFailure::Status {
                offset: 100,
                status: 503
            })
        );
        // No request after the failing one.
        assert_eq!(*source.offsets.borrow(), vec![0, 100]);
    }

    #[test]
    fn failure_on_first_page_is_partial_with_no_rows() {
        let source = StubSource::new(vec![100]).failing_at(0);
        let outcome = fetch_all(&source, &QueryParams::default());
        assert!(matches!(outcome, FetchOutcome::Partial { ref records, .. } if records.is_empty()));
        assert_eq!(outcome.failure().map(FetchFailure::offset), Some(0));
    }

    #[test]
    fn empty_first_page_is_empty() {
        let source = StubSource::new(vec![0]);
        assert_eq!(fetch_all(&source, &QueryParams::default()), FetchOutcome::Empty);
        assert_eq!(*source.offsets.borrow(), vec![0]);
    }

    #[test]
    fn exact_multiple_of_page_size_needs_trailing_empty_page() {
        let source = StubSource::new(vec![100, 100, 0]);
        let outcome = fetch_all(&source, &QueryParams::default());
        assert!(outcome.is_complete());
        assert_eq!(outcome.len(), 200);
        assert_eq!(*source.offsets.borrow(), vec![0, 100, 200]);
    }

    #[test]
    fn page_callback_sees_each_page_in_order() {
        let source = StubSource::new(vec![100, 42]);
        let mut seen = Vec::new();
        let summary = for_each_page(&source, &QueryParams::default(), |offset, page| {
            seen.push((offset, page.len()))
        });
        assert_eq!(seen, vec![(0, 100), (100, 42)]);
        assert_eq!(
            summary,
            PagingSummary {
                requests: 2,
                rows: 142,
                end: PagingEnd::Exhausted
            }
        );
    }

    struct RegionSource;

    impl PageSource for RegionSource {
        fn fetch_page(&self, params: &QueryParams, _offset: usize, _limit: usize) -> Result<Vec<Record>, FetchFailure> {
            assert_eq!(params, &QueryParams::regions());
            Ok(["Occitanie", "Bretagne", "Occitanie", " ", "Grand Est"]
                .iter()
                .map(|r| serde_json::from_value(json!({"libelle_region": r})).unwrap())
                .collect())
        }
    }

    #[test]
    fn regions_are_deduplicated_and_sorted() {
        let regions = fetch_regions(&RegionSource).unwrap();
        assert_eq!(regions, ["Bretagne", "Grand Est", "Occitanie"]);
    }

    #[test]
    fn truncated_region_list_is_an_error() {
        let source = StubSource::new(vec![100, 100]).failing_at(1);
        assert!(matches!(
            fetch_regions(&source),
            Err(FetchFailure::Status { offset: 100, .. })
        ));
    }
}
