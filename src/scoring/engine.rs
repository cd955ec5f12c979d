use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::{ScoringConfig, Weights};
use super::factors::{
    additionality_score, governance_score, project_type_score, retirement_ratio_score, round_to,
    transparency_score, vintage_score,
};
use super::tables::ReferenceTables;
use super::tier::QualityTier;
use super::validation::validate_scoring;
use crate::error::ScreenerError;
use crate::project::ProjectRecord;

/// The six dimension scores, each in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub vintage_score: f64,
    pub retirement_ratio_score: f64,
    pub project_type_score: f64,
    pub transparency_score: f64,
    pub additionality_score: f64,
    pub governance_score: f64,
}

impl SubScores {
    /// Scores paired with display labels and their weight, in dimension order.
    pub fn weighted(&self, weights: &Weights) -> [(&'static str, f64, f64); 6] {
        [
            ("Vintage", self.vintage_score, weights.vintage),
            ("Retirement ratio", self.retirement_ratio_score, weights.retirement_ratio),
            ("Project type", self.project_type_score, weights.project_type),
            ("Transparency", self.transparency_score, weights.transparency),
            ("Additionality", self.additionality_score, weights.additionality),
            ("Governance", self.governance_score, weights.governance),
        ]
    }

    pub fn composite(&self, weights: &Weights) -> f64 {
        let total: f64 = self
            .weighted(weights)
            .iter()
            .map(|(_, score, weight)| score * weight)
            .sum();
        round_to(total, 2).clamp(0.0, 100.0)
    }
}

#[derive(Debug, Clone)]
pub struct DimensionContribution {
    pub label: &'static str, // e.g. "Vintage", "Governance"
    pub score: f64,          // Dimension score, 0..100
    pub weight: f64,         // Share of the composite
    pub points: f64,         // score * weight
}

/// A project with its dimension scores, composite index and tier.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredProject {
    pub project: ProjectRecord,
    pub scores: SubScores,
    pub cqi: f64,
    pub quality_tier: QualityTier,
}

impl ScoredProject {
    /// Per-dimension contribution to the composite, for verbose reporting.
    pub fn breakdown(&self, weights: &Weights) -> Vec<DimensionContribution> {
        self.scores
            .weighted(weights)
            .into_iter()
            .map(|(label, score, weight)| DimensionContribution {
                label,
                score,
                weight,
                points: score * weight,
            })
            .collect()
    }
}

/// Computes the Composite Quality Index.
///
/// Holds validated weights and the lookup tables; scoring itself is a pure
/// function of (record, reference date).
#[derive(Debug, Clone)]
pub struct QualityScorer {
    weights: Weights,
    tables: ReferenceTables,
}

impl QualityScorer {
    /// Build a scorer, refusing configs that fail validation (weights that
    /// don't sum to 1.0, out-of-range proxies, ...).
    pub fn new(config: &ScoringConfig) -> Result<Self, ScreenerError> {
        validate_scoring(config).map_err(ScreenerError::InvalidScoring)?;
        Ok(Self {
            weights: config.weights.unwrap_or_default(),
            tables: ReferenceTables::from_config(config),
        })
    }

    /// Build a scorer from explicit weights and tables.
    pub fn with_tables(weights: Weights, tables: ReferenceTables) -> Result<Self, ScreenerError> {
        let config = ScoringConfig {
            weights: Some(weights),
            governance: None,
            project_types: None,
        };
        validate_scoring(&config).map_err(ScreenerError::InvalidScoring)?;
        Ok(Self { weights, tables })
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn sub_scores(&self, project: &ProjectRecord, as_of: NaiveDate) -> SubScores {
        SubScores {
            vintage_score: vintage_score(project.registration_date, as_of),
            retirement_ratio_score: retirement_ratio_score(project.retirement_ratio()),
            project_type_score: project_type_score(project.project_type(), &self.tables),
            transparency_score: transparency_score(project),
            additionality_score: additionality_score(
                project.registration_date,
                project.crediting_period_start,
            ),
            governance_score: governance_score(project.country(), &self.tables),
        }
    }

    pub fn score(&self, project: ProjectRecord, as_of: NaiveDate) -> ScoredProject {
        let scores = self.sub_scores(&project, as_of);
        let cqi = scores.composite(&self.weights);
        debug!(project_id = %project.project_id, cqi, "scored project");
        ScoredProject {
            project,
            scores,
            cqi,
            quality_tier: QualityTier::from_cqi(cqi),
        }
    }

    /// Score a whole batch. Records are scored independently; output order
    /// matches input order.
    pub fn score_all(&self, projects: Vec<ProjectRecord>, as_of: NaiveDate) -> Vec<ScoredProject> {
        let scored: Vec<_> = projects
            .into_iter()
            .map(|project| self.score(project, as_of))
            .collect();

        if let Some((min, max)) = cqi_range(&scored) {
            info!(
                projects = scored.len(),
                %as_of,
                "scored {} projects, CQI range {:.1} - {:.1}",
                scored.len(),
                min,
                max
            );
        }
        scored
    }
}

fn cqi_range(scored: &[ScoredProject]) -> Option<(f64, f64)> {
    scored.iter().map(|s| s.cqi).fold(None, |acc, cqi| match acc {
        None => Some((cqi, cqi)),
        Some((min, max)) => Some((min.min(cqi), max.max(cqi))),
    })
}
