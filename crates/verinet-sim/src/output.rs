// crates/verinet-sim/src/output.rs
//
// Terminal output for the simulator: a per-kind summary table and JSON.

use serde::Serialize;
use tabled::{Table, Tabled};
use verinet_core::VoterKind;

use crate::report::{SimulationReport, VoterRow};

/// One voter kind in the summary table.
#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct KindSummaryRow {
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "Voters")]
    pub voters: usize,
    #[tabled(rename = "Mean Votes")]
    pub mean_votes: String,
    #[tabled(rename = "Mean Trust")]
    pub mean_trust: String,
    #[tabled(rename = "Mean Actual Trust")]
    pub mean_actual_trust: String,
}

/// Summarize the final per-voter rows of `report` by kind.
pub fn kind_summary(report: &SimulationReport) -> Vec<KindSummaryRow> {
    VoterKind::ALL
        .iter()
        .map(|&kind| {
            let rows: Vec<&VoterRow> = report.voter_rows.iter().filter(|r| r.kind == kind).collect();
            KindSummaryRow {
                kind: kind.label().to_string(),
                voters: rows.len(),
                mean_votes: mean_of(&rows, |r| r.votes as f64),
                mean_trust: mean_of(&rows, |r| r.trust_weight),
                mean_actual_trust: mean_of(&rows, |r| r.actual_trust_weight),
            }
        })
        .collect()
}

fn mean_of(rows: &[&VoterRow], field: impl Fn(&VoterRow) -> f64) -> String {
    if rows.is_empty() {
        return "NA".to_string();
    }
    let sum: f64 = rows.iter().map(|&r| field(r)).sum();
    format!("{:.4}", sum / rows.len() as f64)
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}
