//! Chart data preparation (kept out of the render path so it can be tested).

use chrono::{DateTime, FixedOffset, TimeDelta};

use crate::aggregate::{Aggregate, SeriesPoint};
use crate::domain::ProductionSource;

/// X values are hours since `origin`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAxis {
    pub origin: DateTime<FixedOffset>,
    pub bounds: [f64; 2],
}

impl TimeAxis {
    pub fn from_series(series: &[SeriesPoint]) -> Option<Self> {
        let first = series.first()?;
        let last = series.last()?;
        let span = hours_between(&first.timestamp, &last.timestamp);
        // A single reading still needs a non-empty range.
        let upper = if span > 0.0 { span } else { 1.0 };
        Some(Self {
            origin: first.timestamp,
            bounds: [0.0, upper],
        })
    }

    pub fn x(&self, ts: &DateTime<FixedOffset>) -> f64 {
        hours_between(&self.origin, ts)
    }

    /// Tick label, `dd/mm HHh`.
    pub fn label(&self, x: f64) -> String {
        let ts = self.origin + TimeDelta::seconds((x * 3600.0).round() as i64);
        ts.format("%d/%m %Hh").to_string()
    }
}

fn hours_between(a: &DateTime<FixedOffset>, b: &DateTime<FixedOffset>) -> f64 {
    (*b - *a).num_seconds() as f64 / 3600.0
}

pub fn consumption_points(agg: &Aggregate, axis: &TimeAxis) -> Vec<(f64, f64)> {
    agg.series
        .iter()
        .map(|p| (axis.x(&p.timestamp), p.consumption))
        .collect()
}

/// Cumulative production layers, one per source in `ProductionSource::ALL`
/// order. Layer `i` holds the sum of sources `0..=i`.
pub fn stacked_layers(agg: &Aggregate, axis: &TimeAxis) -> Vec<Vec<(f64, f64)>> {
    let mut layers = vec![Vec::with_capacity(agg.series.len()); ProductionSource::ALL.len()];
    for p in &agg.series {
        let x = axis.x(&p.timestamp);
        let mut acc = 0.0;
        for (layer, value) in layers.iter_mut().zip(p.production) {
            acc += value.max(0.0);
            layer.push((x, acc));
        }
    }
    layers
}

/// Padded y-bounds over every point; falls back to `[0, 1]`.
pub fn y_bounds<'a>(sets: impl IntoIterator<Item = &'a [(f64, f64)]>, include_zero: bool) -> [f64; 2] {
    let (mut y_min, mut y_max) = if include_zero { (0.0, 0.0) } else { (f64::INFINITY, f64::NEG_INFINITY) };
    for set in sets {
        for &(_, y) in set {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    if !y_min.is_finite() || !y_max.is_finite() || y_max <= y_min {
        return [0.0, 1.0];
    }

    let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
    let lower = if include_zero { y_min } else { y_min - pad };
    [lower, y_max + pad]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::domain::Record;
    use serde_json::json;

    fn agg() -> Aggregate {
        let records: Vec<Record> = (0..3)
            .map(|h| {
                serde_json::from_value(json!({
                    "date_heure": format!("2024-01-01T{:02}:00:00+01:00", h),
                    "consommation": 100 + h * 10,
                    "thermique": 1, "nucleaire": 2, "eolien": 3, "solaire": 0, "hydraulique": 4, "bioenergies": 5,
                }))
                .unwrap()
            })
            .collect();
        aggregate(records).unwrap()
    }

    #[test]
    fn axis_maps_hours_and_labels() {
        let a = agg();
        let axis = TimeAxis::from_series(&a.series).unwrap();
        assert_eq!(axis.bounds, [0.0, 2.0]);
        assert_eq!(axis.label(1.0), "01/01 01h");

        let pts = consumption_points(&a, &axis);
        assert_eq!(pts, vec![(0.0, 100.0), (1.0, 110.0), (2.0, 120.0)]);
    }

    #[test]
    fn layers_are_cumulative() {
        let a = agg();
        let axis = TimeAxis::from_series(&a.series).unwrap();
        let layers = stacked_layers(&a, &axis);
        assert_eq!(layers.len(), 6);
        let tops: Vec<f64> = layers.iter().map(|l| l[0].1).collect();
        assert_eq!(tops, [1.0, 3.0, 6.0, 6.0, 10.0, 15.0]);
    }

    #[test]
    fn bounds_fall_back_when_flat() {
        let flat = [(0.0, 5.0), (1.0, 5.0)];
        assert_eq!(y_bounds([&flat[..]], false), [0.0, 1.0]);

        let pts = [(0.0, 0.0), (1.0, 100.0)];
        let b = y_bounds([&pts[..]], true);
        assert_eq!(b[0], 0.0);
        assert!((b[1] - 105.0).abs() < 1e-9);
    }
}
