use chrono::NaiveDate;
use std::cmp::Ordering;
use tracing::info;

use crate::config::Config;
use crate::error::ScreenerError;
use crate::flags::{
    flag_summary, validate_flags, FlagCatalogue, FlagSummaryRow, FlagThresholds, FlaggedProject,
    RedFlagDetector,
};
use crate::portfolio::{dimension_stats, DimensionStats, PortfolioSummary};
use crate::project::ProjectRecord;
use crate::scoring::QualityScorer;

/// Everything one screening run produces.
#[derive(Debug, Clone)]
pub struct ScreeningReport {
    pub as_of: NaiveDate,
    /// Ranked by CQI descending.
    pub projects: Vec<FlaggedProject>,
    pub flag_summary: Vec<FlagSummaryRow>,
    pub portfolio: PortfolioSummary,
    pub dimensions: Vec<DimensionStats>,
}

impl ScreeningReport {
    /// Find a project by id. Blank ids match their `#N` rank label.
    pub fn find(&self, project_id: &str) -> Option<(usize, &FlaggedProject)> {
        let wanted = project_id.trim();
        self.projects
            .iter()
            .enumerate()
            .find(|(i, p)| p.project().display_id(*i) == wanted)
    }

    /// The `n` highest-CQI projects.
    pub fn top(&self, n: usize) -> &[FlaggedProject] {
        &self.projects[..n.min(self.projects.len())]
    }

    /// The `n` lowest-CQI (highest risk) projects, still in rank order, with
    /// the 0-based rank of the first one.
    pub fn bottom(&self, n: usize) -> (usize, &[FlaggedProject]) {
        let start = self.projects.len().saturating_sub(n);
        (start, &self.projects[start..])
    }
}

/// Scorer and detector wired together from a validated config.
#[derive(Debug, Clone)]
pub struct Screener {
    scorer: QualityScorer,
    detector: RedFlagDetector,
}

impl Screener {
    pub fn new(scorer: QualityScorer, detector: RedFlagDetector) -> Self {
        Self { scorer, detector }
    }

    /// Build from the `scoring` and `flags` config sections, using built-in
    /// defaults for absent sections.
    pub fn from_config(config: &Config) -> Result<Self, ScreenerError> {
        let scoring = config.scoring.clone().unwrap_or_default();
        let scorer = QualityScorer::new(&scoring)?;

        let flags = config.flags.clone().unwrap_or_default();
        validate_flags(&flags).map_err(ScreenerError::InvalidFlags)?;
        let detector =
            RedFlagDetector::new(FlagCatalogue::default(), FlagThresholds::from_config(&flags));

        Ok(Self::new(scorer, detector))
    }

    pub fn scorer(&self) -> &QualityScorer {
        &self.scorer
    }

    pub fn detector(&self) -> &RedFlagDetector {
        &self.detector
    }

    /// Score, flag and rank a batch, then build the batch-level summaries.
    pub fn screen(&self, records: Vec<ProjectRecord>, as_of: NaiveDate) -> ScreeningReport {
        let scored = self.scorer.score_all(records, as_of);
        let mut projects = self.detector.detect_all(scored, as_of);
        rank_by_cqi(&mut projects);

        let flag_summary = flag_summary(&projects, self.detector.catalogue());
        let portfolio = PortfolioSummary::from_projects(&projects);
        let dimensions = dimension_stats(&projects);

        info!(
            "screened {} projects as of {}, {} flagged",
            projects.len(),
            as_of,
            projects.iter().filter(|p| p.flag_count > 0).count()
        );

        ScreeningReport {
            as_of,
            projects,
            flag_summary,
            portfolio,
            dimensions,
        }
    }
}

/// Sort by CQI descending, then project id ascending.
pub fn rank_by_cqi(projects: &mut [FlaggedProject]) {
    projects.sort_by(|a, b| {
        b.cqi()
            .partial_cmp(&a.cqi())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.project().project_id.cmp(&b.project().project_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::{FlagCode, FlagConfig};
    use crate::scoring::{ScoringConfig, Weights};

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn batch() -> Vec<ProjectRecord> {
        let mut redd = ProjectRecord::new("VCS-1001");
        redd.project_type = Some("REDD+".to_string());
        redd.registration_date = NaiveDate::from_ymd_opt(2008, 1, 1);
        redd.crediting_period_start = NaiveDate::from_ymd_opt(2006, 1, 1);
        redd.total_issued = Some(100_000_000.0);
        redd.total_retired = Some(0.0);

        let mut wind = ProjectRecord::new("VCS-2002");
        wind.project_type = Some("Renewable Energy".to_string());
        wind.country = Some("United States".to_string());
        wind.registration_date = NaiveDate::from_ymd_opt(2022, 1, 1);
        wind.total_issued = Some(2_000_000.0);
        wind.total_retired = Some(1_900_000.0);

        vec![redd, wind, ProjectRecord::new("VCS-0003")]
    }

    #[test]
    fn test_screen_ranks_by_cqi() {
        let screener = Screener::from_config(&Config::default()).unwrap();
        let report = screener.screen(batch(), as_of());

        let ids: Vec<&str> = report
            .projects
            .iter()
            .map(|p| p.project().project_id.as_str())
            .collect();
        assert_eq!(ids, vec!["VCS-2002", "VCS-0003", "VCS-1001"]);
        assert_eq!(report.portfolio.total_projects, 3);
        assert_eq!(report.dimensions.len(), 7);
        assert_eq!(report.as_of, as_of());
    }

    #[test]
    fn test_screen_flag_summary_counts_batch() {
        let screener = Screener::from_config(&Config::default()).unwrap();
        let report = screener.screen(batch(), as_of());

        let incomplete = report
            .flag_summary
            .iter()
            .find(|r| r.flag_code == FlagCode::IncompleteData)
            .unwrap();
        assert_eq!(incomplete.project_count, 3);
        assert_eq!(incomplete.pct_of_portfolio, 100.0);
        assert_eq!(report.flag_summary[0].flag_code, FlagCode::IncompleteData);
    }

    #[test]
    fn test_rank_ties_break_on_id() {
        let screener = Screener::from_config(&Config::default()).unwrap();
        let report = screener.screen(
            vec![ProjectRecord::new("B"), ProjectRecord::new("A")],
            as_of(),
        );
        assert_eq!(report.projects[0].project().project_id, "A");
        assert_eq!(report.projects[1].project().project_id, "B");
    }

    #[test]
    fn test_find_project() {
        let screener = Screener::from_config(&Config::default()).unwrap();
        let mut records = batch();
        records.push(ProjectRecord::new(""));
        let report = screener.screen(records, as_of());

        let (rank, found) = report.find(" VCS-1001 ").unwrap();
        assert_eq!(found.project().project_id, "VCS-1001");
        assert_eq!(report.projects[rank].project().project_id, "VCS-1001");
        assert!(report.find("VCS-9999").is_none());

        // The blank id ties VCS-0003 on CQI and sorts ahead of it
        let (rank, blank) = report.find("#2").unwrap();
        assert_eq!(rank, 1);
        assert!(blank.project().project_id.is_empty());
        assert!(report.find("#3").is_none());
    }

    #[test]
    fn test_top_and_bottom_slices() {
        let screener = Screener::from_config(&Config::default()).unwrap();
        let report = screener.screen(batch(), as_of());

        let top = report.top(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].project().project_id, "VCS-2002");

        let (start, bottom) = report.bottom(2);
        assert_eq!(start, 1);
        let ids: Vec<&str> = bottom.iter().map(|p| p.project().project_id.as_str()).collect();
        assert_eq!(ids, vec!["VCS-0003", "VCS-1001"]);
        assert!(bottom[1].cqi() <= bottom[0].cqi());
    }

    #[test]
    fn test_top_and_bottom_clamp_to_batch() {
        let screener = Screener::from_config(&Config::default()).unwrap();
        let report = screener.screen(batch(), as_of());

        assert_eq!(report.top(10).len(), 3);
        let (start, bottom) = report.bottom(10);
        assert_eq!(start, 0);
        assert_eq!(bottom.len(), 3);

        assert!(report.top(0).is_empty());
        let (start, bottom) = report.bottom(0);
        assert_eq!(start, 3);
        assert!(bottom.is_empty());
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let config = Config {
            scoring: Some(ScoringConfig {
                weights: Some(Weights {
                    vintage: 0.5,
                    ..Weights::default()
                }),
                ..ScoringConfig::default()
            }),
            flags: None,
        };
        let err = Screener::from_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::InvalidScoring(_)));
    }

    #[test]
    fn test_invalid_flags_rejected() {
        let config = Config {
            scoring: None,
            flags: Some(FlagConfig {
                low_retirement_ratio_below: Some(1.5),
                ..FlagConfig::default()
            }),
        };
        let err = Screener::from_config(&config).unwrap_err();
        assert!(matches!(err, ScreenerError::InvalidFlags(_)));
    }

    #[test]
    fn test_custom_thresholds_flow_through() {
        let config = Config {
            scoring: None,
            flags: Some(FlagConfig {
                massive_issuance_above: Some(1_000_000.0),
                ..FlagConfig::default()
            }),
        };
        let screener = Screener::from_config(&config).unwrap();
        let report = screener.screen(batch(), as_of());

        let (_, wind) = report.find("VCS-2002").unwrap();
        assert!(wind.has_flag(FlagCode::MassiveIssuance));
    }
}
