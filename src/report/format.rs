//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fetch/aggregate code stays clean and testable
//! - output changes are localized
//!
//! The peak-day lines are shared with the TUI summary panel.

use serde::Serialize;

use crate::aggregate::{Aggregate, SourceShare};
use crate::app::pipeline::{DataStatus, RunOutput};
use crate::error::{AppError, EXIT_RUNTIME};

/// Text of the peak-day summary panel.
pub fn summary_lines(agg: &Aggregate) -> Vec<String> {
    let mut lines = vec![
        format!("Total consumption over the period: {} MW", fmt_mw(agg.total_consumption)),
        format!("Day with the highest consumption: {}", agg.peak_day.date.format("%d/%m/%Y")),
        format!("with a consumption of {} MW", fmt_mw(agg.peak_day.consumption)),
    ];
    if let Some(p) = &agg.peak_instant {
        lines.push(format!(
            "Peak reading: {} ({} MW)",
            p.timestamp.format("%d/%m/%Y %H:%M"),
            fmt_mw(p.consumption)
        ));
    }
    lines
}

/// One-line data-quality note, if anything was off.
pub fn quality_note(agg: &Aggregate) -> Option<String> {
    if agg.missing_values == 0 && agg.skipped_records == 0 {
        return None;
    }
    Some(format!(
        "{} missing value(s) counted as 0, {} record(s) without timestamp ignored",
        agg.missing_values, agg.skipped_records
    ))
}

/// Warning text for partial data.
pub fn partial_warning(status: &DataStatus) -> Option<String> {
    match status {
        DataStatus::Complete => None,
        DataStatus::Partial(failure) => Some(format!(
            "PARTIAL DATA: pagination stopped at offset {} ({failure})",
            failure.offset()
        )),
    }
}

/// Format the full text report.
pub fn format_report(run: &RunOutput) -> String {
    let agg = &run.aggregate;
    let mut out = String::new();

    out.push_str(&format!(
        "=== eco2mix - {} | {} → {} ===\n",
        run.query.region, run.query.start, run.query.end
    ));
    let status = if run.is_partial() { "partial" } else { "complete" };
    out.push_str(&format!("Records: {} ({status})\n", run.records_fetched));
    if let Some(warning) = partial_warning(&run.status) {
        out.push_str(&format!("WARNING {warning}\n"));
    }
    out.push('\n');

    for line in summary_lines(agg) {
        out.push_str(&line);
        out.push('\n');
    }

    out.push_str("\nDaily consumption:\n");
    for (date, total) in &agg.daily_consumption {
        let marker = if *date == agg.peak_day.date { "*" } else { " " };
        out.push_str(&format!("{marker} {date}  {:>14} MW\n", fmt_mw(*total)));
    }

    out.push_str("\nProduction by source:\n");
    out.push_str(&format_shares(&agg.production));

    if let Some(note) = quality_note(agg) {
        out.push_str(&format!("\nData quality: {note}\n"));
    }

    out
}

fn format_shares(shares: &[SourceShare]) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<12} {:>14} {:>8}", "source", "total (MW)", "share").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<12} {:-<14} {:-<8}", "", "", "").trim_end());
    out.push('\n');
    for s in shares {
        out.push_str(&format!(
            "{:<12} {:>14} {:>7.2}%\n",
            s.source.display_name(),
            fmt_mw(s.total),
            s.share_pct
        ));
    }
    out
}

/// Format the region list, one per line.
pub fn format_regions(regions: &[String]) -> String {
    let mut out = String::new();
    for r in regions {
        out.push_str(r);
        out.push('\n');
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    region: &'a str,
    start: chrono::NaiveDate,
    end: chrono::NaiveDate,
    complete: bool,
    failure: Option<String>,
    records_fetched: usize,
    #[serde(flatten)]
    aggregate: &'a Aggregate,
}

/// JSON rendition of the report.
pub fn format_json(run: &RunOutput) -> Result<String, AppError> {
    let report = JsonReport {
        region: &run.query.region,
        start: run.query.start,
        end: run.query.end,
        complete: !run.is_partial(),
        failure: match &run.status {
            DataStatus::Complete => None,
            DataStatus::Partial(f) => Some(f.to_string()),
        },
        records_fetched: run.records_fetched,
        aggregate: &run.aggregate,
    };
    serde_json::to_string_pretty(&report)
        .map_err(|e| AppError::new(EXIT_RUNTIME, format!("Failed to serialize report: {e}")))
}

/// MW with no decimals when integral, two otherwise.
pub fn fmt_mw(v: f64) -> String {
    if v.fract() == 0.0 { format!("{v:.0}") } else { format!("{v:.2}") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::data::FetchFailure;
    use crate::domain::Record;
    use crate::query::Query;
    use chrono::NaiveDate;
    use serde_json::json;

    fn run(status: DataStatus) -> RunOutput {
        let records: Vec<Record> = [
            ("2024-01-01T10:00:00+01:00", "2024-01-01", 100.5),
            ("2024-01-02T10:00:00+01:00", "2024-01-02", 300.0),
        ]
        .iter()
        .map(|(ts, d, c)| {
            serde_json::from_value(json!({
                "date_heure": ts, "date": d, "consommation": c,
                "thermique": 1, "nucleaire": 1, "eolien": 1, "solaire": 1, "hydraulique": 0, "bioenergies": 0,
            }))
            .unwrap()
        })
        .collect();
        RunOutput {
            query: Query::new(
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                "Bretagne",
            )
            .unwrap(),
            status,
            records_fetched: records.len(),
            aggregate: aggregate(records).unwrap(),
        }
    }

    #[test]
    fn summary_names_total_and_peak_day() {
        let lines = summary_lines(&run(DataStatus::Complete).aggregate);
        assert_eq!(lines[0], "Total consumption over the period: 400.50 MW");
        assert_eq!(lines[1], "Day with the highest consumption: 02/01/2024");
        assert_eq!(lines[2], "with a consumption of 300 MW");
        assert_eq!(lines[3], "Peak reading: 02/01/2024 10:00 (300 MW)");
    }

    #[test]
    fn report_marks_partial_data() {
        let r = run(DataStatus::Partial(FetchFailure::Status { offset: 200, status: 500 }));
        let txt = format_report(&r);
        assert!(txt.contains("Records: 2 (partial)"));
        assert!(txt.contains("WARNING PARTIAL DATA: pagination stopped at offset 200"));
        assert!(txt.contains("* 2024-01-02"));
        assert!(txt.contains("Nuclear"));

        let complete = format_report(&run(DataStatus::Complete));
        assert!(!complete.contains("WARNING"));
        assert!(complete.contains("(complete)"));
    }

    #[test]
    fn json_report_carries_status() {
        let r = run(DataStatus::Partial(FetchFailure::Status { offset: 100, status: 502 }));
        let v: serde_json::Value = serde_json::from_str(&format_json(&r).unwrap()).unwrap();
        assert_eq!(v["complete"], json!(false));
        assert_eq!(v["peak_day"]["date"], json!("2024-01-02"));
        assert_eq!(v["total_consumption"], json!(400.5));
        assert_eq!(v["production"][0]["source"], json!("thermal"));
    }
}
