use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete quality band derived from the composite index.
///
/// Bands are right-closed: (0, 40], (40, 55], (55, 70], (70, 85], (85, 100],
/// with 0 itself falling into `VeryLow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum QualityTier {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Medium,
    High,
    #[serde(rename = "Very High")]
    VeryHigh,
}

impl QualityTier {
    pub const ALL: [QualityTier; 5] = [
        QualityTier::VeryLow,
        QualityTier::Low,
        QualityTier::Medium,
        QualityTier::High,
        QualityTier::VeryHigh,
    ];

    pub fn from_cqi(cqi: f64) -> Self {
        if cqi <= 40.0 {
            QualityTier::VeryLow
        } else if cqi <= 55.0 {
            QualityTier::Low
        } else if cqi <= 70.0 {
            QualityTier::Medium
        } else if cqi <= 85.0 {
            QualityTier::High
        } else {
            QualityTier::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityTier::VeryLow => "Very Low",
            QualityTier::Low => "Low",
            QualityTier::Medium => "Medium",
            QualityTier::High => "High",
            QualityTier::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
