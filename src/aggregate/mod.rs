//! Aggregation over a fetched `RecordSet`.
//!
//! Everything the charts need is computed once here: the chronological
//! series, per-day consumption, the peak day, the grand total and the
//! production mix.
//!
//! Malformed input is handled explicitly:
//! - a missing, `null` or non-numeric numeric field counts as `0.0` and is
//!   tallied in `missing_values`
//! - a record whose timestamp cannot be parsed is left out and tallied in
//!   `skipped_records`
//! - no usable record at all is `AggregateError::NoData`

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use thiserror::Error;

use crate::domain::{ProductionSource, Record, RecordSet};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AggregateError {
    #[error("No data: the query returned no usable records.")]
    NoData,
}

/// One point of the chronological series (consumption + stacked production).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub timestamp: DateTime<FixedOffset>,
    pub consumption: f64,
    /// Production per source, in `ProductionSource::ALL` order.
    pub production: [f64; 6],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeakDay {
    pub date: NaiveDate,
    pub consumption: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SourceShare {
    pub source: ProductionSource,
    pub total: f64,
    /// `round(total / production_total * 100, 2)`; `0.0` when nothing was produced.
    pub share_pct: f64,
}

/// Derived, read-only values for one fetch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Aggregate {
    #[serde(skip)]
    pub sorted: RecordSet,
    pub series: Vec<SeriesPoint>,
    pub daily_consumption: BTreeMap<NaiveDate, f64>,
    pub peak_day: PeakDay,
    /// Highest single reading (earliest wins ties).
    pub peak_instant: Option<SeriesPoint>,
    pub total_consumption: f64,
    pub production: Vec<SourceShare>,
    pub production_total: f64,
    pub skipped_records: usize,
    pub missing_values: usize,
}

/// Compute every aggregate for one record set.
pub fn aggregate(records: RecordSet) -> Result<Aggregate, AggregateError> {
    let (sorted, skipped_records) = sort_by_timestamp(records);
    if sorted.is_empty() {
        return Err(AggregateError::NoData);
    }

    let daily = daily_consumption(&sorted);
    let peak = peak_day(&daily).ok_or(AggregateError::NoData)?;
    let series = series(&sorted);
    let peak_instant = series
        .iter()
        .fold(None::<&SeriesPoint>, |best, p| match best {
            Some(b) if b.consumption >= p.consumption => Some(b),
            _ => Some(p),
        })
        .cloned();
    let (production, production_total) = production_shares(&sorted);

    Ok(Aggregate {
        total_consumption: total_consumption(&sorted),
        missing_values: count_missing(&sorted),
        sorted,
        series,
        daily_consumption: daily,
        peak_day: peak,
        peak_instant,
        production,
        production_total,
        skipped_records,
    })
}

/// Stable ascending sort by timestamp.
///
/// Returns the sorted usable records and the number of records dropped for
/// lacking a parsable timestamp.
pub fn sort_by_timestamp(records: RecordSet) -> (RecordSet, usize) {
    let total = records.len();
    let mut keyed: Vec<(DateTime<FixedOffset>, Record)> = records
        .into_iter()
        .filter_map(|r| r.timestamp().map(|ts| (ts, r)))
        .collect();
    let skipped = total - keyed.len();
    keyed.sort_by_key(|(ts, _)| *ts);
    (keyed.into_iter().map(|(_, r)| r).collect(), skipped)
}

/// Consumption summed per calendar date.
pub fn daily_consumption(records: &[Record]) -> BTreeMap<NaiveDate, f64> {
    let mut out = BTreeMap::new();
    for r in records {
        let Some(date) = r.calendar_date() else {
            continue;
        };
        *out.entry(date).or_insert(0.0) += r.consumption().unwrap_or(0.0);
    }
    out
}

/// Date with the highest summed consumption; the earliest date wins ties.
pub fn peak_day(daily: &BTreeMap<NaiveDate, f64>) -> Option<PeakDay> {
    let mut best: Option<PeakDay> = None;
    for (&date, &consumption) in daily {
        match best {
            Some(b) if consumption <= b.consumption => {}
            _ => best = Some(PeakDay { date, consumption }),
        }
    }
    best
}

pub fn total_consumption(records: &[Record]) -> f64 {
    records.iter().map(|r| r.consumption().unwrap_or(0.0)).sum()
}

/// Per-source totals and their percentage shares of the six-source total.
pub fn production_shares(records: &[Record]) -> (Vec<SourceShare>, f64) {
    let totals: Vec<(ProductionSource, f64)> = ProductionSource::ALL
        .iter()
        .map(|&source| {
            let total: f64 = records.iter().map(|r| r.production(source).unwrap_or(0.0)).sum();
            (source, total)
        })
        .collect();

    let grand: f64 = totals.iter().map(|(_, t)| t).sum();
    let shares = totals
        .into_iter()
        .map(|(source, total)| SourceShare {
            source,
            total,
            share_pct: if grand > 0.0 { round2(total / grand * 100.0) } else { 0.0 },
        })
        .collect();

    (shares, grand)
}

/// Round to two decimals (half away from zero).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn series(sorted: &[Record]) -> Vec<SeriesPoint> {
    sorted
        .iter()
        .filter_map(|r| {
            let timestamp = r.timestamp()?;
            let mut production = [0.0; 6];
            for (slot, source) in production.iter_mut().zip(ProductionSource::ALL) {
                *slot = r.production(source).unwrap_or(0.0);
            }
            Some(SeriesPoint {
                timestamp,
                consumption: r.consumption().unwrap_or(0.0),
                production,
            })
        })
        .collect()
}

fn count_missing(records: &[Record]) -> usize {
    records
        .iter()
        .map(|r| {
            let consumption = usize::from(r.consumption().is_none());
            let sources = ProductionSource::ALL
                .iter()
                .filter(|&&s| r.production(s).is_none())
                .count();
            consumption + sources
        })
        .sum()
}
