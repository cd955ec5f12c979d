//! Portfolio-level rollups over a screened batch.

use serde::Serialize;
use std::collections::HashMap;

use crate::flags::FlaggedProject;
use crate::scoring::factors::round_to;
use crate::scoring::QualityTier;

/// CQI at or above which a project counts as high quality.
pub const HIGH_QUALITY_CQI: f64 = 70.0;

/// Headline metrics for a screened batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub total_projects: usize,
    pub avg_cqi: Option<f64>,
    pub pct_high_quality: f64,
    pub pct_flagged: f64,
    pub top_country: Option<String>,
    pub top_project_type: Option<String>,
    pub total_issued_mtco2: f64,
    pub total_retired_mtco2: f64,
    pub tier_counts: Vec<(QualityTier, usize)>,
}

fn pct(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round_to(count as f64 / total as f64 * 100.0, 1)
    }
}

/// Most frequent value. Ties go to the alphabetically first.
fn most_common<'a>(values: impl Iterator<Item = &'a str>) -> Option<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(value, _)| value.to_string())
}

impl PortfolioSummary {
    pub fn from_projects(projects: &[FlaggedProject]) -> Self {
        let total = projects.len();

        let avg_cqi = if total == 0 {
            None
        } else {
            let sum: f64 = projects.iter().map(|p| p.cqi()).sum();
            Some(round_to(sum / total as f64, 1))
        };

        let high_quality = projects
            .iter()
            .filter(|p| p.cqi() >= HIGH_QUALITY_CQI)
            .count();
        let flagged = projects.iter().filter(|p| p.flag_count > 0).count();

        let issued: f64 = projects
            .iter()
            .filter_map(|p| p.project().total_issued)
            .sum();
        let retired: f64 = projects
            .iter()
            .filter_map(|p| p.project().total_retired)
            .sum();

        let tier_counts = QualityTier::ALL
            .iter()
            .map(|tier| {
                let count = projects
                    .iter()
                    .filter(|p| p.scored.quality_tier == *tier)
                    .count();
                (*tier, count)
            })
            .collect();

        Self {
            total_projects: total,
            avg_cqi,
            pct_high_quality: pct(high_quality, total),
            pct_flagged: pct(flagged, total),
            top_country: most_common(projects.iter().filter_map(|p| p.project().country())),
            top_project_type: most_common(
                projects.iter().filter_map(|p| p.project().project_type()),
            ),
            total_issued_mtco2: round_to(issued / 1e6, 2),
            total_retired_mtco2: round_to(retired / 1e6, 2),
            tier_counts,
        }
    }
}

/// Mean, min and max of one score column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionStats {
    pub dimension: &'static str,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

fn stats(dimension: &'static str, values: &[f64]) -> DimensionStats {
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    DimensionStats {
        dimension,
        mean: round_to(mean, 1),
        min: round_to(min, 1),
        max: round_to(max, 1),
    }
}

/// Per-dimension statistics plus the composite. Empty for an empty batch.
pub fn dimension_stats(projects: &[FlaggedProject]) -> Vec<DimensionStats> {
    if projects.is_empty() {
        return Vec::new();
    }

    let column = |f: fn(&FlaggedProject) -> f64| -> Vec<f64> { projects.iter().map(f).collect() };

    vec![
        stats("vintage_score", &column(|p| p.scored.scores.vintage_score)),
        stats("retirement_ratio_score", &column(|p| p.scored.scores.retirement_ratio_score)),
        stats("project_type_score", &column(|p| p.scored.scores.project_type_score)),
        stats("transparency_score", &column(|p| p.scored.scores.transparency_score)),
        stats("additionality_score", &column(|p| p.scored.scores.additionality_score)),
        stats("governance_score", &column(|p| p.scored.scores.governance_score)),
        stats("cqi", &column(|p| p.cqi())),
    ]
}
