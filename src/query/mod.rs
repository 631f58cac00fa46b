//! Query construction for the eco2mix records endpoint.
//!
//! A `Query` (date range + region) produces exactly one `where` expression.
//! `QueryParams` carries the three optional directives (`where`, `select`,
//! `group_by`) that the fetcher sends alongside `limit`/`offset`.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{FIELD_REGION, FIELD_TIMESTAMP};

pub mod filter;

pub use filter::{Filter, Literal, Op};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("Invalid field name '{0}'.")]
    InvalidField(String),
    #[error("Region label must not be empty.")]
    EmptyRegion,
    #[error("Region label contains control characters: {0:?}")]
    InvalidRegion(String),
    #[error("Start date {start} is after end date {end}.")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Date range and region for one user action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub region: String,
}

impl Query {
    pub fn new(start: NaiveDate, end: NaiveDate, region: impl Into<String>) -> Result<Self, QueryError> {
        let query = Self {
            start,
            end,
            region: region.into(),
        };
        query.validate()?;
        Ok(query)
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.region.trim().is_empty() {
            return Err(QueryError::EmptyRegion);
        }
        if self.region.chars().any(char::is_control) {
            return Err(QueryError::InvalidRegion(self.region.clone()));
        }
        if self.start > self.end {
            return Err(QueryError::InvertedRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// `date_heure >= start AND date_heure <= end AND libelle_region = region`.
    pub fn filter(&self) -> Result<Filter, QueryError> {
        Filter::new()
            .clause(FIELD_TIMESTAMP, Op::Ge, Literal::Date(self.start))?
            .clause(FIELD_TIMESTAMP, Op::Le, Literal::Date(self.end))?
            .clause(FIELD_REGION, Op::Eq, Literal::Text(self.region.clone()))
    }

    pub fn params(&self) -> Result<QueryParams, QueryError> {
        Ok(QueryParams::default().with_filter(&self.filter()?))
    }
}

/// Optional directives sent with every page request.
///
/// Each one is independently omittable; `None` means the parameter is not
/// sent at all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub where_clause: Option<String>,
    pub select: Option<String>,
    pub group_by: Option<String>,
}

impl QueryParams {
    /// Distinct region labels (`select` + `group_by` on the region field).
    pub fn regions() -> Self {
        Self {
            where_clause: None,
            select: Some(FIELD_REGION.to_string()),
            group_by: Some(FIELD_REGION.to_string()),
        }
    }

    pub fn with_filter(mut self, filter: &Filter) -> Self {
        self.where_clause = if filter.is_empty() {
            None
        } else {
            Some(filter.to_expression())
        };
        self
    }

    pub fn with_select(mut self, fields: &[&str]) -> Result<Self, QueryError> {
        self.select = join_fields(fields)?;
        Ok(self)
    }

    pub fn with_group_by(mut self, fields: &[&str]) -> Result<Self, QueryError> {
        self.group_by = join_fields(fields)?;
        Ok(self)
    }

    /// `(name, value)` pairs for the directives that are set.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::with_capacity(3);
        if let Some(v) = &self.select {
            out.push(("select", v.as_str()));
        }
        if let Some(v) = &self.where_clause {
            out.push(("where", v.as_str()));
        }
        if let Some(v) = &self.group_by {
            out.push(("group_by", v.as_str()));
        }
        out
    }
}

fn join_fields(fields: &[&str]) -> Result<Option<String>, QueryError> {
    if fields.is_empty() {
        return Ok(None);
    }
    for f in fields {
        filter::validate_identifier(f)?;
    }
    Ok(Some(fields.join(", ")))
}
