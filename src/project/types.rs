use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::lenient;

/// One offset project as delivered by the registry cleaning step.
///
/// Every attribute except the identity is optional. Scoring and flag rules
/// fall back to neutral defaults on absent values instead of failing, and
/// dates or numbers that don't parse are read as absent.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProjectRecord {
    pub project_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub proponent: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "lenient::registration_date")]
    pub registration_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::crediting_period_start")]
    pub crediting_period_start: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::crediting_period_end")]
    pub crediting_period_end: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::total_issued")]
    pub total_issued: Option<f64>,          // tCO2e
    #[serde(default, deserialize_with = "lenient::total_retired")]
    pub total_retired: Option<f64>,         // tCO2e
    #[serde(default, deserialize_with = "lenient::total_buffer_pool")]
    pub total_buffer_pool: Option<f64>,     // tCO2e held against reversals
    #[serde(default, deserialize_with = "lenient::estimated_annual_reductions")]
    pub estimated_annual_reductions: Option<f64>,
}

/// Treat blank strings the same as a missing value.
fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl ProjectRecord {
    /// Create a record carrying only its identity.
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            name: None,
            country: None,
            project_type: None,
            proponent: None,
            region: None,
            registration_date: None,
            crediting_period_start: None,
            crediting_period_end: None,
            total_issued: None,
            total_retired: None,
            total_buffer_pool: None,
            estimated_annual_reductions: None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        non_blank(&self.name)
    }

    pub fn country(&self) -> Option<&str> {
        non_blank(&self.country)
    }

    pub fn project_type(&self) -> Option<&str> {
        non_blank(&self.project_type)
    }

    pub fn proponent(&self) -> Option<&str> {
        non_blank(&self.proponent)
    }

    pub fn region(&self) -> Option<&str> {
        non_blank(&self.region)
    }

    /// Retired share of issued credits. `None` when nothing was issued.
    pub fn retirement_ratio(&self) -> Option<f64> {
        let issued = self.total_issued.filter(|v| *v > 0.0)?;
        Some(self.total_retired.unwrap_or(0.0) / issued).filter(|r| r.is_finite())
    }

    /// Identity used in reports. Falls back to the 1-based batch position
    /// when the registry id is blank.
    pub fn display_id(&self, position: usize) -> String {
        let id = self.project_id.trim();
        if id.is_empty() {
            format!("#{}", position + 1)
        } else {
            id.to_string()
        }
    }

    /// Whether `retired + buffer <= issued` holds within a small relative tolerance.
    pub fn ledger_is_consistent(&self) -> bool {
        let issued = self.total_issued.unwrap_or(0.0);
        let used = self.total_retired.unwrap_or(0.0) + self.total_buffer_pool.unwrap_or(0.0);
        used <= issued + issued.abs() * 1e-6 + 1e-9
    }
}
