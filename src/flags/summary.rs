use serde::Serialize;
use std::collections::BTreeMap;

use super::catalogue::{FlagCatalogue, FlagCode, Severity};
use super::detector::FlaggedProject;
use crate::scoring::factors::round_to;

/// How often one flag fires across a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagSummaryRow {
    pub flag_code: FlagCode,
    pub label: String,
    pub severity: Severity,
    pub project_count: usize,
    pub pct_of_portfolio: f64,
}

/// Frequency of each flag that fired at least once, most frequent first.
///
/// Ties keep catalogue order. Flags that never fired are omitted.
pub fn flag_summary(projects: &[FlaggedProject], catalogue: &FlagCatalogue) -> Vec<FlagSummaryRow> {
    let total = projects.len();
    if total == 0 {
        return Vec::new();
    }

    let mut counts: BTreeMap<FlagCode, usize> = BTreeMap::new();
    for project in projects {
        for code in &project.flags {
            *counts.entry(*code).or_insert(0) += 1;
        }
    }

    let mut rows: Vec<FlagSummaryRow> = counts
        .into_iter()
        .map(|(code, count)| FlagSummaryRow {
            flag_code: code,
            label: catalogue.label(code).to_string(),
            severity: catalogue.severity(code),
            project_count: count,
            pct_of_portfolio: round_to(count as f64 / total as f64 * 100.0, 1),
        })
        .collect();

    // Stable sort keeps the BTreeMap's catalogue order for ties
    rows.sort_by(|a, b| b.project_count.cmp(&a.project_count));
    rows
}
