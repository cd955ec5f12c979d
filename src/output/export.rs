use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::flags::{FlagSummaryRow, FlaggedProject};

/// File name for the per-project export.
pub const SCORED_PROJECTS_FILE: &str = "scored_projects.csv";
/// File name for the flag frequency export.
pub const FLAG_SUMMARY_FILE: &str = "flag_summary.csv";

/// Flat, export-ready view of a flagged project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectRow<'a> {
    pub project_id: String,
    pub name: Option<&'a str>,
    pub country: Option<&'a str>,
    pub project_type: Option<&'a str>,
    pub registration_date: Option<NaiveDate>,
    pub crediting_period_start: Option<NaiveDate>,
    pub crediting_period_end: Option<NaiveDate>,
    pub total_issued: Option<f64>,
    pub total_retired: Option<f64>,
    pub total_buffer_pool: Option<f64>,
    pub vintage_score: f64,
    pub retirement_ratio_score: f64,
    pub project_type_score: f64,
    pub transparency_score: f64,
    pub additionality_score: f64,
    pub governance_score: f64,
    pub cqi: f64,
    pub quality_tier: &'static str,
    pub flags: String, // ';'-separated codes
    pub flag_count: usize,
    pub max_severity: &'static str,
}

impl<'a> ProjectRow<'a> {
    pub fn new(flagged: &'a FlaggedProject, position: usize) -> Self {
        let project = flagged.project();
        let scores = &flagged.scored.scores;
        Self {
            project_id: project.display_id(position),
            name: project.name(),
            country: project.country(),
            project_type: project.project_type(),
            registration_date: project.registration_date,
            crediting_period_start: project.crediting_period_start,
            crediting_period_end: project.crediting_period_end,
            total_issued: project.total_issued,
            total_retired: project.total_retired,
            total_buffer_pool: project.total_buffer_pool,
            vintage_score: scores.vintage_score,
            retirement_ratio_score: scores.retirement_ratio_score,
            project_type_score: scores.project_type_score,
            transparency_score: scores.transparency_score,
            additionality_score: scores.additionality_score,
            governance_score: scores.governance_score,
            cqi: flagged.cqi(),
            quality_tier: flagged.scored.quality_tier.label(),
            flags: flagged
                .flags
                .iter()
                .map(|f| f.as_str())
                .collect::<Vec<_>>()
                .join(";"),
            flag_count: flagged.flag_count,
            max_severity: flagged.max_severity_label(),
        }
    }
}

/// Rows for a ranked slice whose first element sits at 0-based `first_rank`.
pub fn project_rows(projects: &[FlaggedProject], first_rank: usize) -> Vec<ProjectRow<'_>> {
    projects
        .iter()
        .enumerate()
        .map(|(i, p)| ProjectRow::new(p, first_rank + i))
        .collect()
}

/// Serialize flagged projects as pretty JSON
pub fn projects_to_json(projects: &[FlaggedProject], first_rank: usize) -> Result<String> {
    serde_json::to_string_pretty(&project_rows(projects, first_rank))
        .context("Failed to serialize projects")
}

/// Write rows as CSV to `path` atomically
fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write CSV row to {}", path.display()))?;
    }
    let file = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush {}: {}", path.display(), e.error()))?;

    // Commit the write atomically
    file.commit()
        .with_context(|| format!("Failed to save {}", path.display()))?;
    Ok(())
}

/// Write `scored_projects.csv` and `flag_summary.csv` into `dir`.
///
/// Creates the directory if needed and returns the written paths.
pub fn export_reports(
    dir: &Path,
    projects: &[FlaggedProject],
    summary: &[FlagSummaryRow],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory at {}", dir.display()))?;

    let projects_path = dir.join(SCORED_PROJECTS_FILE);
    write_csv(&projects_path, &project_rows(projects, 0))?;
    tracing::info!("scored data saved to {}", projects_path.display());

    let summary_path = dir.join(FLAG_SUMMARY_FILE);
    write_csv(&summary_path, summary)?;
    tracing::info!("flag summary saved to {}", summary_path.display());

    Ok(vec![projects_path, summary_path])
}
