use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::tables::{
    builtin_governance, DEFAULT_GOVERNANCE_PROXY, HIGH_RISK_SCORE, HIGH_RISK_TYPES,
    MEDIUM_RISK_SCORE, MEDIUM_RISK_TYPES, OTHER_TYPE_SCORE, UNKNOWN_TYPE_SCORE,
};

/// Main scoring configuration.
///
/// Every section is optional; an omitted section falls back to the built-in
/// tables. `ScoringConfig::default()` spells those built-ins out in full.
///
/// Example YAML:
/// ```yaml
/// scoring:
///   weights:
///     vintage: 0.20
///     retirement_ratio: 0.20
///     project_type: 0.20
///     transparency: 0.15
///     additionality: 0.15
///     governance: 0.10
///   governance:
///     default: 0.5
///     countries:
///       Brazil: 0.55
///   project_types:
///     high_risk: ["REDD", "Avoided Deforestation"]
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Weight of each dimension in the composite index. Must sum to 1.0.
    #[serde(default)]
    pub weights: Option<Weights>,

    /// Country governance proxies in [0, 1]
    #[serde(default)]
    pub governance: Option<GovernanceConfig>,

    /// Project-type risk categories
    #[serde(default)]
    pub project_types: Option<ProjectTypeConfig>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: Some(Weights::default()),
            governance: Some(GovernanceConfig::default()),
            project_types: Some(ProjectTypeConfig::default()),
        }
    }
}

/// Dimension weights for the composite quality index.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Weights {
    pub vintage: f64,
    pub retirement_ratio: f64,
    pub project_type: f64,
    pub transparency: f64,
    pub additionality: f64,
    pub governance: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            vintage: 0.20,
            retirement_ratio: 0.20,
            project_type: 0.20,
            transparency: 0.15,
            additionality: 0.15,
            governance: 0.10,
        }
    }
}

impl Weights {
    /// Weights paired with their config key, in dimension order.
    pub fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("vintage", self.vintage),
            ("retirement_ratio", self.retirement_ratio),
            ("project_type", self.project_type),
            ("transparency", self.transparency),
            ("additionality", self.additionality),
            ("governance", self.governance),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.named().iter().map(|(_, w)| w).sum()
    }
}

/// Country governance lookup.
///
/// `countries` is laid over the built-in table, so a config only needs the
/// entries it changes.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GovernanceConfig {
    /// Proxy used for countries missing from the table (default: 0.5)
    #[serde(default)]
    pub default: Option<f64>,

    /// Country name -> governance proxy in [0, 1]
    #[serde(default)]
    pub countries: Option<BTreeMap<String, f64>>,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            default: Some(DEFAULT_GOVERNANCE_PROXY),
            countries: Some(builtin_governance()),
        }
    }
}

/// Project-type risk categories.
///
/// Patterns are matched case-insensitively as substrings of the project
/// type, high-risk first. A list given here replaces the built-in list.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ProjectTypeConfig {
    #[serde(default)]
    pub high_risk: Option<Vec<String>>,

    #[serde(default)]
    pub medium_risk: Option<Vec<String>>,

    #[serde(default)]
    pub high_risk_score: Option<f64>,

    #[serde(default)]
    pub medium_risk_score: Option<f64>,

    /// Score for a known type matching neither list
    #[serde(default)]
    pub other_score: Option<f64>,

    /// Score when the project type is absent
    #[serde(default)]
    pub unknown_score: Option<f64>,
}

impl Default for ProjectTypeConfig {
    fn default() -> Self {
        Self {
            high_risk: Some(HIGH_RISK_TYPES.iter().map(|s| s.to_string()).collect()),
            medium_risk: Some(MEDIUM_RISK_TYPES.iter().map(|s| s.to_string()).collect()),
            high_risk_score: Some(HIGH_RISK_SCORE),
            medium_risk_score: Some(MEDIUM_RISK_SCORE),
            other_score: Some(OTHER_TYPE_SCORE),
            unknown_score: Some(UNKNOWN_TYPE_SCORE),
        }
    }
}
