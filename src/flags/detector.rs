use chrono::{Months, NaiveDate};
use std::collections::BTreeSet;
use tracing::{debug, info};

use super::catalogue::{FlagCatalogue, FlagCode, Severity};
use super::config::FlagThresholds;
use crate::project::ProjectRecord;
use crate::scoring::ScoredProject;

/// A scored project with the red flags it triggered.
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedProject {
    pub scored: ScoredProject,
    pub flags: BTreeSet<FlagCode>,
    pub flag_count: usize,
    pub max_severity: Option<Severity>,
}

impl FlaggedProject {
    pub fn project(&self) -> &ProjectRecord {
        &self.scored.project
    }

    pub fn cqi(&self) -> f64 {
        self.scored.cqi
    }

    pub fn has_flag(&self, code: FlagCode) -> bool {
        self.flags.contains(&code)
    }

    /// "none" when nothing fired, otherwise the worst severity.
    pub fn max_severity_label(&self) -> &'static str {
        self.max_severity.map(|s| s.as_str()).unwrap_or("none")
    }

    /// Drop scores and flags, keeping the raw record for re-scoring.
    pub fn into_record(self) -> ProjectRecord {
        self.scored.project
    }
}

/// Evaluates the red-flag rules against scored projects.
///
/// Every rule is a total function over optional inputs: an absent value
/// never triggers its rule and never errors.
#[derive(Debug, Clone, Default)]
pub struct RedFlagDetector {
    catalogue: FlagCatalogue,
    thresholds: FlagThresholds,
}

impl RedFlagDetector {
    pub fn new(catalogue: FlagCatalogue, thresholds: FlagThresholds) -> Self {
        Self {
            catalogue,
            thresholds,
        }
    }

    pub fn catalogue(&self) -> &FlagCatalogue {
        &self.catalogue
    }

    /// Codes triggered by one project. `as_of` anchors the crediting-period check.
    pub fn evaluate(&self, scored: &ScoredProject, as_of: NaiveDate) -> BTreeSet<FlagCode> {
        let t = &self.thresholds;
        let project = &scored.project;
        let scores = &scored.scores;
        let mut flags = BTreeSet::new();

        if scores.vintage_score < t.high_vintage_below {
            flags.insert(FlagCode::HighVintage);
        }

        if let (Some(issued), Some(retired)) = (project.total_issued, project.total_retired) {
            if issued > 0.0 && retired == 0.0 {
                flags.insert(FlagCode::ZeroRetirements);
            }
            // Zero retirements are covered above; this rule needs some retirement.
            let ratio = project.retirement_ratio();
            if retired > 0.0 && ratio.is_some_and(|r| r < t.low_retirement_ratio_below) {
                flags.insert(FlagCode::LowRetirementRatio);
            }
        }

        if project
            .project_type()
            .is_some_and(|pt| pt.to_lowercase().contains("redd"))
        {
            flags.insert(FlagCode::ReddControversy);
        }

        if project
            .total_issued
            .is_some_and(|issued| issued > t.massive_issuance_above)
        {
            flags.insert(FlagCode::MassiveIssuance);
        }

        if scores.additionality_score < t.registration_lag_below {
            flags.insert(FlagCode::RegistrationLag);
        }

        if scores.governance_score < t.weak_governance_below {
            flags.insert(FlagCode::WeakGovernance);
        }

        if let Some(end) = project.crediting_period_end {
            let horizon = as_of
                .checked_add_months(Months::new(t.expiring_within_months))
                .unwrap_or(NaiveDate::MAX);
            if end <= horizon {
                flags.insert(FlagCode::ExpiredCrediting);
            }
        }

        if scores.transparency_score < t.incomplete_data_below {
            flags.insert(FlagCode::IncompleteData);
        }

        flags
    }

    /// Highest severity among `flags`, or `None` when the set is empty.
    pub fn max_severity(&self, flags: &BTreeSet<FlagCode>) -> Option<Severity> {
        flags.iter().map(|code| self.catalogue.severity(*code)).max()
    }

    pub fn detect(&self, scored: ScoredProject, as_of: NaiveDate) -> FlaggedProject {
        let flags = self.evaluate(&scored, as_of);
        let max_severity = self.max_severity(&flags);
        debug!(
            project_id = %scored.project.project_id,
            flags = flags.len(),
            "flagged project"
        );
        FlaggedProject {
            scored,
            flag_count: flags.len(),
            flags,
            max_severity,
        }
    }

    pub fn detect_all(&self, scored: Vec<ScoredProject>, as_of: NaiveDate) -> Vec<FlaggedProject> {
        let flagged: Vec<_> = scored
            .into_iter()
            .map(|project| self.detect(project, as_of))
            .collect();

        let with_flags = flagged.iter().filter(|f| f.flag_count > 0).count();
        info!(
            "flag detection complete, projects with at least one flag: {} / {}",
            with_flags,
            flagged.len()
        );
        flagged
    }
}
