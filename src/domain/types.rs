//! Shared domain types.
//!
//! Records are kept as the raw JSON objects returned by the API. Only the
//! fields read downstream are given typed accessors; everything else passes
//! through untouched.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timestamp of the observation (RFC 3339 with offset).
pub const FIELD_TIMESTAMP: &str = "date_heure";
/// Local calendar date of the observation (`YYYY-MM-DD`).
pub const FIELD_DATE: &str = "date";
/// Region label, e.g. `Bretagne`.
pub const FIELD_REGION: &str = "libelle_region";
/// Total consumption in MW.
pub const FIELD_CONSUMPTION: &str = "consommation";

/// One of the six tracked energy-generation categories.
///
/// The declaration order is the order used for totals, shares, chart layers
/// and legends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductionSource {
    Thermal,
    Nuclear,
    Wind,
    Solar,
    Hydro,
    Bioenergy,
}

impl ProductionSource {
    pub const ALL: [ProductionSource; 6] = [
        ProductionSource::Thermal,
        ProductionSource::Nuclear,
        ProductionSource::Wind,
        ProductionSource::Solar,
        ProductionSource::Hydro,
        ProductionSource::Bioenergy,
    ];

    /// API field holding this source's production (MW).
    pub fn field(self) -> &'static str {
        match self {
            ProductionSource::Thermal => "thermique",
            ProductionSource::Nuclear => "nucleaire",
            ProductionSource::Wind => "eolien",
            ProductionSource::Solar => "solaire",
            ProductionSource::Hydro => "hydraulique",
            ProductionSource::Bioenergy => "bioenergies",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProductionSource::Thermal => "Thermal",
            ProductionSource::Nuclear => "Nuclear",
            ProductionSource::Wind => "Wind",
            ProductionSource::Solar => "Solar",
            ProductionSource::Hydro => "Hydro",
            ProductionSource::Bioenergy => "Bioenergy",
        }
    }
}

/// One observation row for a region/time bucket, as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub Map<String, Value>);

impl Record {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Read a string field. Non-string values are not coerced.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    /// Read a numeric field.
    ///
    /// Accepts JSON numbers and numeric strings. `null`, missing fields and
    /// non-finite or unparsable values all yield `None`.
    pub fn number(&self, field: &str) -> Option<f64> {
        let v = match self.0.get(field)? {
            Value::Number(n) => n.as_f64()?,
            Value::String(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        if v.is_finite() { Some(v) } else { None }
    }

    pub fn timestamp(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.text(FIELD_TIMESTAMP)?;
        DateTime::parse_from_rfc3339(raw.trim()).ok()
    }

    /// Calendar date used for daily grouping.
    ///
    /// Prefers the API's own `date` column; falls back to the local date of
    /// the timestamp.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        self.text(FIELD_DATE)
            .and_then(|raw| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
            .or_else(|| self.timestamp().map(|ts| ts.date_naive()))
    }

    pub fn region(&self) -> Option<&str> {
        self.text(FIELD_REGION)
    }

    pub fn consumption(&self) -> Option<f64> {
        self.number(FIELD_CONSUMPTION)
    }

    pub fn production(&self, source: ProductionSource) -> Option<f64> {
        self.number(source.field())
    }
}

/// Ordered records for one query, in the order the API delivered them.
pub type RecordSet = Vec<Record>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn number_accepts_numbers_and_numeric_strings() {
        let r = record(json!({"consommation": 3120, "eolien": "412.5", "solaire": null, "thermique": "n/a"}));
        assert_eq!(r.consumption(), Some(3120.0));
        assert_eq!(r.production(ProductionSource::Wind), Some(412.5));
        assert_eq!(r.production(ProductionSource::Solar), None);
        assert_eq!(r.production(ProductionSource::Thermal), None);
        assert_eq!(r.production(ProductionSource::Hydro), None);
    }

    #[test]
    fn calendar_date_prefers_date_column() {
        let r = record(json!({"date_heure": "2023-12-31T23:00:00+00:00", "date": "2024-01-01"}));
        assert_eq!(r.calendar_date(), NaiveDate::from_ymd_opt(2024, 1, 1));

        let r = record(json!({"date_heure": "2024-01-01T00:30:00+01:00"}));
        assert_eq!(r.calendar_date(), NaiveDate::from_ymd_opt(2024, 1, 1));
    }

    #[test]
    fn source_fields_follow_declaration_order() {
        let fields: Vec<&str> = ProductionSource::ALL.iter().map(|s| s.field()).collect();
        assert_eq!(
            fields,
            ["thermique", "nucleaire", "eolien", "solaire", "hydraulique", "bioenergies"]
        );
    }
}
