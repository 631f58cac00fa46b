//! Structured filter expressions.
//!
//! A `Filter` is a list of `(field, operator, value)` clauses joined by `AND`.
//! Values stay typed until `to_expression()` serializes them, which is the
//! only place quoting and escaping happen.

use chrono::NaiveDate;

use super::QueryError;

/// Comparison operator for one clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ge,
    Le,
}

impl Op {
    fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ge => ">=",
            Op::Le => "<=",
        }
    }
}

/// Right-hand side of a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Date(NaiveDate),
    Text(String),
}

impl Literal {
    fn serialize(&self) -> String {
        match self {
            Literal::Date(d) => format!("date'{}'", d.format("%Y-%m-%d")),
            Literal::Text(s) => format!("'{}'", escape_text(s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub field: String,
    pub op: Op,
    pub value: Literal,
}

/// Conjunction of clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    clauses: Vec<Clause>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clause. The field must be a plain identifier.
    pub fn clause(mut self, field: &str, op: Op, value: Literal) -> Result<Self, QueryError> {
        validate_identifier(field)?;
        self.clauses.push(Clause {
            field: field.to_string(),
            op,
            value,
        });
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Serialize to the API's `where` syntax.
    pub fn to_expression(&self) -> String {
        self.clauses
            .iter()
            .map(|c| format!("{} {} {}", c.field, c.op.as_str(), c.value.serialize()))
            .collect::<Vec<_>>()
            .join(" AND ")
    }
}

/// Escape a text literal for single-quoted embedding.
fn escape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch == '\\' || ch == '\'' {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Field names are interpolated verbatim, so only identifiers are allowed.
pub fn validate_identifier(field: &str) -> Result<(), QueryError> {
    let mut chars = field.chars();
    let valid_head = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if valid_head && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(QueryError::InvalidField(field.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_dates_and_text() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let f = Filter::new()
            .clause("date_heure", Op::Ge, Literal::Date(d))
            .unwrap()
            .clause("libelle_region", Op::Eq, Literal::Text("Normandie".into()))
            .unwrap();
        assert_eq!(
            f.to_expression(),
            "date_heure >= date'2024-03-05' AND libelle_region = 'Normandie'"
        );
    }

    #[test]
    fn escapes_quotes_and_backslashes() {
        let f = Filter::new()
            .clause("libelle_region", Op::Eq, Literal::Text(r"Côte d'Azur \ x".into()))
            .unwrap();
        assert_eq!(f.to_expression(), r"libelle_region = 'Côte d\'Azur \\ x'");
    }

    #[test]
    fn injected_quote_stays_inside_literal() {
        let f = Filter::new()
            .clause("libelle_region", Op::Eq, Literal::Text("x' OR '1'='1".into()))
            .unwrap();
        let expr = f.to_expression();
        assert_eq!(expr, r"libelle_region = 'x\' OR \'1\'=\'1'");
        // Only the delimiting quotes are unescaped.
        let bare = expr.replace(r"\'", "");
        assert_eq!(bare.matches('\'').count(), 2);
    }

    #[test]
    fn rejects_non_identifier_fields() {
        assert!(validate_identifier("libelle_region").is_ok());
        assert!(validate_identifier("_x1").is_ok());
        for bad in ["", "1abc", "a b", "a;drop", "région"] {
            assert!(
                matches!(validate_identifier(bad), Err(QueryError::InvalidField(_))),
                "expected rejection for {bad:?}"
            );
        }
    }

    #[test]
    fn empty_filter_serializes_to_empty_string() {
        let f = Filter::new();
        assert!(f.is_empty());
        assert_eq!(f.to_expression(), "");
    }
}
