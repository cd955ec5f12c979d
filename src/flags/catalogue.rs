use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal risk level of a triggered flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Integrity risk signals. Ordering follows catalogue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlagCode {
    HighVintage,
    ZeroRetirements,
    LowRetirementRatio,
    ReddControversy,
    MassiveIssuance,
    RegistrationLag,
    WeakGovernance,
    ExpiredCrediting,
    IncompleteData,
}

impl FlagCode {
    pub const ALL: [FlagCode; 9] = [
        FlagCode::HighVintage,
        FlagCode::ZeroRetirements,
        FlagCode::LowRetirementRatio,
        FlagCode::ReddControversy,
        FlagCode::MassiveIssuance,
        FlagCode::RegistrationLag,
        FlagCode::WeakGovernance,
        FlagCode::ExpiredCrediting,
        FlagCode::IncompleteData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlagCode::HighVintage => "HIGH_VINTAGE",
            FlagCode::ZeroRetirements => "ZERO_RETIREMENTS",
            FlagCode::LowRetirementRatio => "LOW_RETIREMENT_RATIO",
            FlagCode::ReddControversy => "REDD_CONTROVERSY",
            FlagCode::MassiveIssuance => "MASSIVE_ISSUANCE",
            FlagCode::RegistrationLag => "REGISTRATION_LAG",
            FlagCode::WeakGovernance => "WEAK_GOVERNANCE",
            FlagCode::ExpiredCrediting => "EXPIRED_CREDITING",
            FlagCode::IncompleteData => "INCOMPLETE_DATA",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(code.trim()))
    }
}

impl fmt::Display for FlagCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlagDefinition {
    pub code: FlagCode,
    pub label: String,
    pub description: String,
    pub severity: Severity,
}

/// Reference data describing every flag.
#[derive(Debug, Clone)]
pub struct FlagCatalogue {
    entries: Vec<FlagDefinition>,
}

fn entry(code: FlagCode, label: &str, description: &str, severity: Severity) -> FlagDefinition {
    FlagDefinition {
        code,
        label: label.to_string(),
        description: description.to_string(),
        severity,
    }
}

impl Default for FlagCatalogue {
    fn default() -> Self {
        Self::new(vec![
            entry(
                FlagCode::HighVintage,
                "High Vintage Age",
                "Project registered more than 12 years ago. Credits may face market discount.",
                Severity::Medium,
            ),
            entry(
                FlagCode::ZeroRetirements,
                "No Retirements Recorded",
                "Project has issued credits but shows zero retirements, a weak demand signal.",
                Severity::High,
            ),
            entry(
                FlagCode::LowRetirementRatio,
                "Low Retirement Rate (<10%)",
                "Less than 10% of issued credits have been retired.",
                Severity::Medium,
            ),
            entry(
                FlagCode::ReddControversy,
                "REDD+ Controversy Risk",
                "REDD+ projects face scrutiny over permanence and additionality.",
                Severity::High,
            ),
            entry(
                FlagCode::MassiveIssuance,
                "Unusually High Issuance Volume",
                "Total issuance exceeds 50M tCO2e and may indicate inflated baselines.",
                Severity::Medium,
            ),
            entry(
                FlagCode::RegistrationLag,
                "Long Registration Lag (>6 years)",
                "Significant delay between crediting period start and registration date.",
                Severity::Medium,
            ),
            entry(
                FlagCode::WeakGovernance,
                "Weak Host Country Governance",
                "Project located in a jurisdiction with a low governance quality score (<0.45).",
                Severity::Medium,
            ),
            entry(
                FlagCode::ExpiredCrediting,
                "Expired or Expiring Crediting Period",
                "Crediting period has ended or ends within 12 months.",
                Severity::Low,
            ),
            entry(
                FlagCode::IncompleteData,
                "Incomplete Public Documentation",
                "Transparency score below 40; key project fields are missing from the registry.",
                Severity::Low,
            ),
        ])
    }
}

impl FlagCatalogue {
    /// Build a catalogue from explicit entries. Later duplicates of a code are ignored.
    pub fn new(entries: Vec<FlagDefinition>) -> Self {
        let mut unique: Vec<FlagDefinition> = Vec::with_capacity(entries.len());
        for definition in entries {
            if !unique.iter().any(|d| d.code == definition.code) {
                unique.push(definition);
            }
        }
        Self { entries: unique }
    }

    pub fn get(&self, code: FlagCode) -> Option<&FlagDefinition> {
        self.entries.iter().find(|d| d.code == code)
    }

    /// Severity of a code. Codes missing from the catalogue rank lowest.
    pub fn severity(&self, code: FlagCode) -> Severity {
        self.get(code).map(|d| d.severity).unwrap_or(Severity::Low)
    }

    pub fn label(&self, code: FlagCode) -> &str {
        self.get(code).map(|d| d.label.as_str()).unwrap_or(code.as_str())
    }

    pub fn entries(&self) -> &[FlagDefinition] {
        &self.entries
    }
}
