use super::config::ScoringConfig;

/// Tolerance for the weights-sum-to-one invariant.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Validate scoring configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_scoring(config: &ScoringConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    // Weights: each in [0, 1], together exactly 1.0
    if let Some(ref weights) = config.weights {
        for (name, weight) in weights.named() {
            if !(0.0..=1.0).contains(&weight) {
                errors.push(format!(
                    "scoring.weights.{}: must be within [0, 1], got {}",
                    name, weight
                ));
            }
        }
        let sum = weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            errors.push(format!(
                "scoring.weights: must sum to 1.0, got {}",
                sum
            ));
        }
    }

    // Governance proxies live in [0, 1]
    if let Some(ref governance) = config.governance {
        if let Some(default) = governance.default {
            if !(0.0..=1.0).contains(&default) {
                errors.push(format!(
                    "scoring.governance.default: must be within [0, 1], got {}",
                    default
                ));
            }
        }
        if let Some(ref countries) = governance.countries {
            for (country, proxy) in countries {
                if country.trim().is_empty() {
                    errors.push("scoring.governance.countries: empty country name".to_string());
                }
                if !(0.0..=1.0).contains(proxy) {
                    errors.push(format!(
                        "scoring.governance.countries.{}: must be within [0, 1], got {}",
                        country, proxy
                    ));
                }
            }
        }
    }

    // Project-type patterns and category scores
    if let Some(ref types) = config.project_types {
        for (field, patterns) in [("high_risk", &types.high_risk), ("medium_risk", &types.medium_risk)] {
            if let Some(patterns) = patterns {
                for (i, pattern) in patterns.iter().enumerate() {
                    if pattern.trim().is_empty() {
                        // An empty substring would match every project type
                        errors.push(format!(
                            "scoring.project_types.{}[{}]: pattern must not be empty",
                            field, i
                        ));
                    }
                }
            }
        }
        for (field, score) in [
            ("high_risk_score", types.high_risk_score),
            ("medium_risk_score", types.medium_risk_score),
            ("other_score", types.other_score),
            ("unknown_score", types.unknown_score),
        ] {
            if let Some(score) = score {
                if !(0.0..=100.0).contains(&score) {
                    errors.push(format!(
                        "scoring.project_types.{}: must be within [0, 100], got {}",
                        field, score
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{GovernanceConfig, ProjectTypeConfig, Weights};
    use std::collections::BTreeMap;

    fn empty_config() -> ScoringConfig {
        ScoringConfig {
            weights: None,
            governance: None,
            project_types: None,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_scoring(&ScoringConfig::default()).is_ok());
    }

    #[test]
    fn test_empty_config() {
        assert!(validate_scoring(&empty_config()).is_ok());
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = empty_config();
        config.weights = Some(Weights {
            vintage: 0.25,
            ..Weights::default()
        });
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("must sum to 1.0"));
    }

    #[test]
    fn test_rebalanced_weights_accepted() {
        let mut config = empty_config();
        config.weights = Some(Weights {
            vintage: 0.10,
            retirement_ratio: 0.30,
            project_type: 0.20,
            transparency: 0.10,
            additionality: 0.20,
            governance: 0.10,
        });
        assert!(validate_scoring(&config).is_ok());
    }

    #[test]
    fn test_negative_weight() {
        let mut config = empty_config();
        config.weights = Some(Weights {
            vintage: -0.10,
            retirement_ratio: 0.50,
            ..Weights::default()
        });
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.weights.vintage"));
    }

    #[test]
    fn test_governance_out_of_range() {
        let mut config = empty_config();
        config.governance = Some(GovernanceConfig {
            default: Some(1.5),
            countries: Some(BTreeMap::from([("Atlantis".to_string(), -0.1)])),
        });
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("scoring.governance.default"));
        assert!(errors[1].contains("scoring.governance.countries.Atlantis"));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let mut config = empty_config();
        config.project_types = Some(ProjectTypeConfig {
            high_risk: Some(vec!["REDD".to_string(), " ".to_string()]),
            medium_risk: None,
            high_risk_score: None,
            medium_risk_score: None,
            other_score: None,
            unknown_score: None,
        });
        let errors = validate_scoring(&config).unwrap_err();
        assert!(errors[0].contains("scoring.project_types.high_risk[1]"));
    }

    #[test]
    fn test_collects_all_errors() {
        let config = ScoringConfig {
            weights: Some(Weights {
                governance: 0.5, // Error 1: sum
                ..Weights::default()
            }),
            governance: Some(GovernanceConfig {
                default: Some(2.0), // Error 2
                countries: None,
            }),
            project_types: Some(ProjectTypeConfig {
                high_risk: None,
                medium_risk: None,
                high_risk_score: Some(150.0), // Error 3
                medium_risk_score: None,
                other_score: None,
                unknown_score: None,
            }),
        };
        let errors = validate_scoring(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }
}
