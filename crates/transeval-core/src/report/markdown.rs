//! Rendering of aggregated summary rows.

use crate::report::aggregate::{scorer_columns, SummaryRow};
use serde_json::json;
use std::fmt::Write;

pub const REPORT_TITLE: &str = "# Translation Model Performance Comparison";

/// Escape characters that would end a table cell.
fn table_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Markdown comparison table, one row per store.
pub fn render_markdown(rows: &[SummaryRow]) -> String {
    let columns = scorer_columns(rows);
    let mut out = String::new();

    let _ = writeln!(out, "{}", REPORT_TITLE);
    let _ = writeln!(out);

    let mut header = String::from("| Model | Samples | Avg Time (s) |");
    let mut rule = String::from("|:------|--------:|-------------:|");
    for col in &columns {
        let _ = write!(header, " Avg {} Score |", col);
        rule.push_str("------:|");
    }
    let _ = writeln!(out, "{}", header);
    let _ = writeln!(out, "{}", rule);

    for row in rows {
        let _ = write!(
            out,
            "| {} | {} | {} |",
            table_cell(&row.name),
            row.samples,
            round4(row.avg_elapsed_seconds)
        );
        for col in &columns {
            let v = row.avg_scores.get(col).copied().unwrap_or(0.0);
            let _ = write!(out, " {} |", round4(v));
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Generated: {}", chrono::Utc::now().to_rfc3339());
    out
}

/// JSON array of rows with values rounded like the table.
pub fn render_json(rows: &[SummaryRow]) -> serde_json::Result<String> {
    let rounded: Vec<serde_json::Value> = rows
        .iter()
        .map(|r| {
            let scores: serde_json::Map<String, serde_json::Value> = r
                .avg_scores
                .iter()
                .map(|(k, v)| (k.clone(), json!(round4(*v))))
                .collect();
            json!({
                "model": r.name,
                "samples": r.samples,
                "avg_time_seconds": round4(r.avg_elapsed_seconds),
                "avg_scores": scores,
            })
        })
        .collect();
    serde_json::to_string_pretty(&rounded)
}
