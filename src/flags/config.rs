use serde::{Deserialize, Serialize};

/// Thresholds for the red-flag rules.
///
/// All fields are optional; omitted ones use the built-in value.
///
/// Example YAML:
/// ```yaml
/// flags:
///   massive_issuance_above: 25000000
///   expiring_within_months: 6
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct FlagConfig {
    /// HIGH_VINTAGE when vintage_score is below this (default: 30)
    #[serde(default)]
    pub high_vintage_below: Option<f64>,

    /// LOW_RETIREMENT_RATIO when retired/issued is below this (default: 0.10)
    #[serde(default)]
    pub low_retirement_ratio_below: Option<f64>,

    /// MASSIVE_ISSUANCE when total_issued exceeds this, tCO2e (default: 50,000,000)
    #[serde(default)]
    pub massive_issuance_above: Option<f64>,

    /// REGISTRATION_LAG when additionality_score is below this (default: 40)
    #[serde(default)]
    pub registration_lag_below: Option<f64>,

    /// WEAK_GOVERNANCE when governance_score is below this (default: 45)
    #[serde(default)]
    pub weak_governance_below: Option<f64>,

    /// EXPIRED_CREDITING when the period ends within this many months (default: 12)
    #[serde(default)]
    pub expiring_within_months: Option<u32>,

    /// INCOMPLETE_DATA when transparency_score is below this (default: 40)
    #[serde(default)]
    pub incomplete_data_below: Option<f64>,
}

/// Resolved thresholds used by the detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlagThresholds {
    pub high_vintage_below: f64,
    pub low_retirement_ratio_below: f64,
    pub massive_issuance_above: f64,
    pub registration_lag_below: f64,
    pub weak_governance_below: f64,
    pub expiring_within_months: u32,
    pub incomplete_data_below: f64,
}

impl Default for FlagThresholds {
    fn default() -> Self {
        Self {
            high_vintage_below: 30.0,
            low_retirement_ratio_below: 0.10,
            massive_issuance_above: 50_000_000.0,
            registration_lag_below: 40.0,
            weak_governance_below: 45.0,
            expiring_within_months: 12,
            incomplete_data_below: 40.0,
        }
    }
}

impl FlagThresholds {
    pub fn from_config(config: &FlagConfig) -> Self {
        let d = Self::default();
        Self {
            high_vintage_below: config.high_vintage_below.unwrap_or(d.high_vintage_below),
            low_retirement_ratio_below: config
                .low_retirement_ratio_below
                .unwrap_or(d.low_retirement_ratio_below),
            massive_issuance_above: config
                .massive_issuance_above
                .unwrap_or(d.massive_issuance_above),
            registration_lag_below: config
                .registration_lag_below
                .unwrap_or(d.registration_lag_below),
            weak_governance_below: config.weak_governance_below.unwrap_or(d.weak_governance_below),
            expiring_within_months: config
                .expiring_within_months
                .unwrap_or(d.expiring_within_months),
            incomplete_data_below: config.incomplete_data_below.unwrap_or(d.incomplete_data_below),
        }
    }
}

impl From<FlagThresholds> for FlagConfig {
    fn from(t: FlagThresholds) -> Self {
        Self {
            high_vintage_below: Some(t.high_vintage_below),
            low_retirement_ratio_below: Some(t.low_retirement_ratio_below),
            massive_issuance_above: Some(t.massive_issuance_above),
            registration_lag_below: Some(t.registration_lag_below),
            weak_governance_below: Some(t.weak_governance_below),
            expiring_within_months: Some(t.expiring_within_months),
            incomplete_data_below: Some(t.incomplete_data_below),
        }
    }
}

/// Validate flag thresholds at startup, reporting every problem.
pub fn validate_flags(config: &FlagConfig) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (field, value) in [
        ("high_vintage_below", config.high_vintage_below),
        ("registration_lag_below", config.registration_lag_below),
        ("weak_governance_below", config.weak_governance_below),
        ("incomplete_data_below", config.incomplete_data_below),
    ] {
        if let Some(v) = value {
            if !(0.0..=100.0).contains(&v) {
                errors.push(format!("flags.{}: must be within [0, 100], got {}", field, v));
            }
        }
    }

    if let Some(ratio) = config.low_retirement_ratio_below {
        if !(0.0..=1.0).contains(&ratio) {
            errors.push(format!(
                "flags.low_retirement_ratio_below: must be within [0, 1], got {}",
                ratio
            ));
        }
    }

    if let Some(volume) = config.massive_issuance_above {
        if volume < 0.0 || volume.is_nan() {
            errors.push("flags.massive_issuance_above: must be non-negative".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
