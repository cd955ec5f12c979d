use std::collections::{BTreeMap, HashMap};

use super::config::ScoringConfig;

/// Permanence/additionality controversies (REDD+ and avoided deforestation).
pub const HIGH_RISK_TYPES: &[&str] = &[
    "REDD",
    "Avoided Deforestation",
    "Avoided Unplanned Deforestation and Degradation",
];

/// Land-use types with moderate reversal risk.
pub const MEDIUM_RISK_TYPES: &[&str] = &[
    "Improved Forest Management",
    "Agriculture Forestry and Other Land Use",
    "AFOLU",
    "Afforestation/Reforestation",
];

pub const HIGH_RISK_SCORE: f64 = 30.0;
pub const MEDIUM_RISK_SCORE: f64 = 60.0;
pub const OTHER_TYPE_SCORE: f64 = 85.0;
pub const UNKNOWN_TYPE_SCORE: f64 = 50.0;

/// Proxy for countries missing from the governance table.
pub const DEFAULT_GOVERNANCE_PROXY: f64 = 0.50;

/// Simplified World Governance Indicator tiers, 0 = poor, 1 = strong.
const GOVERNANCE_PROXIES: &[(&str, f64)] = &[
    ("Brazil", 0.55),
    ("Indonesia", 0.50),
    ("Peru", 0.60),
    ("Colombia", 0.55),
    ("Mexico", 0.60),
    ("Kenya", 0.50),
    ("Tanzania", 0.45),
    ("Cambodia", 0.40),
    ("India", 0.55),
    ("China", 0.50),
    ("Vietnam", 0.45),
    ("Madagascar", 0.35),
    ("Democratic Republic of the Congo", 0.25),
    ("Uganda", 0.40),
    ("Chile", 0.75),
    ("Costa Rica", 0.75),
    ("Uruguay", 0.75),
    ("Ghana", 0.55),
    ("Senegal", 0.55),
    ("Rwanda", 0.60),
    ("United States", 0.85),
    ("Canada", 0.85),
    ("Australia", 0.85),
    ("Germany", 0.90),
    ("Sweden", 0.90),
];

pub fn builtin_governance() -> BTreeMap<String, f64> {
    GOVERNANCE_PROXIES
        .iter()
        .map(|(country, proxy)| (country.to_string(), *proxy))
        .collect()
}

/// How a project type ranks against the risk lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRisk {
    High,
    Medium,
    Other,
    Unknown,
}

/// Immutable lookup data used by the scorer.
///
/// Built once from the effective config and handed to the scorer; nothing
/// mutates it afterwards.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    high_risk: Vec<String>,   // lowercased patterns
    medium_risk: Vec<String>, // lowercased patterns
    pub high_risk_score: f64,
    pub medium_risk_score: f64,
    pub other_score: f64,
    pub unknown_score: f64,
    governance: HashMap<String, f64>,
    pub default_governance: f64,
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::from_config(&ScoringConfig::default())
    }
}

impl ReferenceTables {
    /// Resolve a (possibly partial) config against the built-in tables.
    pub fn from_config(config: &ScoringConfig) -> Self {
        let types = config.project_types.clone().unwrap_or_default();
        let lower = |patterns: Option<Vec<String>>, builtin: &[&str]| -> Vec<String> {
            match patterns {
                Some(list) => list.iter().map(|p| p.trim().to_lowercase()).collect(),
                None => builtin.iter().map(|p| p.to_lowercase()).collect(),
            }
        };

        let governance_config = config.governance.clone().unwrap_or_default();
        let mut governance: HashMap<String, f64> = builtin_governance().into_iter().collect();
        if let Some(overrides) = governance_config.countries {
            for (country, proxy) in overrides {
                governance.insert(country.trim().to_string(), proxy);
            }
        }

        Self {
            high_risk: lower(types.high_risk, HIGH_RISK_TYPES),
            medium_risk: lower(types.medium_risk, MEDIUM_RISK_TYPES),
            high_risk_score: types.high_risk_score.unwrap_or(HIGH_RISK_SCORE),
            medium_risk_score: types.medium_risk_score.unwrap_or(MEDIUM_RISK_SCORE),
            other_score: types.other_score.unwrap_or(OTHER_TYPE_SCORE),
            unknown_score: types.unknown_score.unwrap_or(UNKNOWN_TYPE_SCORE),
            governance,
            default_governance: governance_config.default.unwrap_or(DEFAULT_GOVERNANCE_PROXY),
        }
    }

    /// Classify a project type. High-risk patterns are checked first.
    pub fn classify_type(&self, project_type: Option<&str>) -> TypeRisk {
        let Some(project_type) = project_type else {
            return TypeRisk::Unknown;
        };
        let lowered = project_type.to_lowercase();
        if self.high_risk.iter().any(|p| lowered.contains(p.as_str())) {
            TypeRisk::High
        } else if self.medium_risk.iter().any(|p| lowered.contains(p.as_str())) {
            TypeRisk::Medium
        } else {
            TypeRisk::Other
        }
    }

    /// Governance proxy in [0, 1]. Missing or unlisted countries get the default.
    pub fn governance_proxy(&self, country: Option<&str>) -> f64 {
        country
            .and_then(|c| self.governance.get(c.trim()))
            .copied()
            .unwrap_or(self.default_governance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::config::{GovernanceConfig, ProjectTypeConfig};

    #[test]
    fn test_classify_is_case_insensitive_substring() {
        let tables = ReferenceTables::default();
        assert_eq!(tables.classify_type(Some("redd+ jurisdictional")), TypeRisk::High);
        assert_eq!(tables.classify_type(Some("Avoided Deforestation (AUDD)")), TypeRisk::High);
        assert_eq!(tables.classify_type(Some("IMPROVED FOREST MANAGEMENT")), TypeRisk::Medium);
        assert_eq!(tables.classify_type(Some("Landfill Methane Capture")), TypeRisk::Other);
        assert_eq!(tables.classify_type(None), TypeRisk::Unknown);
    }

    #[test]
    fn test_high_risk_checked_before_medium() {
        let tables = ReferenceTables::default();
        assert_eq!(tables.classify_type(Some("AFOLU - REDD+")), TypeRisk::High);
    }

    #[test]
    fn test_governance_lookup_and_default() {
        let tables = ReferenceTables::default();
        assert_eq!(tables.governance_proxy(Some("Germany")), 0.90);
        assert_eq!(tables.governance_proxy(Some(" Cambodia ")), 0.40);
        assert_eq!(tables.governance_proxy(Some("Atlantis")), 0.50);
        assert_eq!(tables.governance_proxy(None), 0.50);
    }

    #[test]
    fn test_config_overrides_are_layered() {
        let config = ScoringConfig {
            weights: None,
            governance: Some(GovernanceConfig {
                default: Some(0.3),
                countries: Some(BTreeMap::from([("Atlantis".to_string(), 0.8)])),
            }),
            project_types: Some(ProjectTypeConfig {
                high_risk: Some(vec!["Peatland".to_string()]),
                medium_risk: None,
                high_risk_score: Some(20.0),
                medium_risk_score: None,
                other_score: None,
                unknown_score: None,
            }),
        };
        let tables = ReferenceTables::from_config(&config);

        assert_eq!(tables.governance_proxy(Some("Atlantis")), 0.8);
        assert_eq!(tables.governance_proxy(Some("Sweden")), 0.90);
        assert_eq!(tables.governance_proxy(Some("Nowhere")), 0.3);

        assert_eq!(tables.classify_type(Some("peatland rewetting")), TypeRisk::High);
        assert_eq!(tables.classify_type(Some("REDD+")), TypeRisk::Other);
        assert_eq!(tables.classify_type(Some("AFOLU")), TypeRisk::Medium);
        assert_eq!(tables.high_risk_score, 20.0);
        assert_eq!(tables.medium_risk_score, MEDIUM_RISK_SCORE);
    }
}
