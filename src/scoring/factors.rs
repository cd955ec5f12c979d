//! The six quality dimensions.
//!
//! Each dimension is a pure function returning a score in [0, 100] and has
//! a neutral fallback for missing inputs instead of an error path.

use chrono::NaiveDate;

use super::tables::{ReferenceTables, TypeRisk};
use crate::project::ProjectRecord;

/// Score for a dimension whose inputs are missing.
pub const NEUTRAL_SCORE: f64 = 50.0;

const DAYS_PER_YEAR: f64 = 365.25;

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Signed years from `from` to `to`.
pub fn years_between(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / DAYS_PER_YEAR
}

/// Penalize older registrations.
///
/// Flat 100 up to 3 years, then 6 points/year to 70 at 8 years, 10 points/year
/// to 30 at 12 years, then 5 points/year with a floor of 10.
pub fn vintage_score(registration: Option<NaiveDate>, as_of: NaiveDate) -> f64 {
    let Some(registered) = registration else {
        return NEUTRAL_SCORE;
    };
    let age = years_between(registered, as_of);

    let score = if age <= 3.0 {
        100.0
    } else if age <= 8.0 {
        100.0 - (age - 3.0) * 6.0
    } else if age <= 12.0 {
        70.0 - (age - 8.0) * 10.0
    } else {
        (30.0 - (age - 12.0) * 5.0).max(10.0)
    };
    score.clamp(0.0, 100.0)
}

/// Reward credits that were actually retired. `ratio` is retired / issued,
/// `None` when nothing was issued.
///
/// The 0.5..0.8 segment reaches 100 at a ratio of 0.7; the result is capped
/// there so the curve stays within range and monotone.
pub fn retirement_ratio_score(ratio: Option<f64>) -> f64 {
    let Some(ratio) = ratio else {
        return NEUTRAL_SCORE;
    };

    let score = if ratio >= 0.80 {
        100.0
    } else if ratio >= 0.50 {
        60.0 + (ratio - 0.50) * 200.0
    } else if ratio >= 0.20 {
        30.0 + (ratio - 0.20) * 100.0
    } else if ratio >= 0.05 {
        10.0 + (ratio - 0.05) * 133.0
    } else {
        (ratio * 200.0).max(0.0)
    };
    score.clamp(0.0, 100.0)
}

/// Categorical risk discount for the project type.
pub fn project_type_score(project_type: Option<&str>, tables: &ReferenceTables) -> f64 {
    let score = match tables.classify_type(project_type) {
        TypeRisk::High => tables.high_risk_score,
        TypeRisk::Medium => tables.medium_risk_score,
        TypeRisk::Other => tables.other_score,
        TypeRisk::Unknown => tables.unknown_score,
    };
    score.clamp(0.0, 100.0)
}

/// Number of documentation fields counted by [`transparency_score`].
pub const TRANSPARENCY_FIELDS: usize = 6;

fn populated_number(value: Option<f64>) -> bool {
    matches!(value, Some(v) if v != 0.0 && !v.is_nan())
}

/// Share of documentation fields that are populated, as a percentage.
pub fn transparency_score(project: &ProjectRecord) -> f64 {
    let populated = [
        project.proponent().is_some(),
        project.region().is_some(),
        project.crediting_period_start.is_some(),
        project.crediting_period_end.is_some(),
        populated_number(project.estimated_annual_reductions),
        populated_number(project.total_buffer_pool),
    ]
    .iter()
    .filter(|present| **present)
    .count();

    round_to(populated as f64 / TRANSPARENCY_FIELDS as f64 * 100.0, 1)
}

/// Registration lag behind the crediting-period start as an additionality proxy.
///
/// A project registered long after its activity began was likely running anyway.
pub fn additionality_score(
    registration: Option<NaiveDate>,
    crediting_start: Option<NaiveDate>,
) -> f64 {
    let (Some(registered), Some(start)) = (registration, crediting_start) else {
        return NEUTRAL_SCORE;
    };
    let lag = years_between(start, registered);

    if lag <= 1.0 {
        90.0
    } else if lag <= 3.0 {
        75.0
    } else if lag <= 6.0 {
        55.0
    } else if lag <= 10.0 {
        35.0
    } else {
        15.0
    }
}

/// Host-country governance proxy scaled to 0..100.
pub fn governance_score(country: Option<&str>, tables: &ReferenceTables) -> f64 {
    round_to(tables.governance_proxy(country) * 100.0, 1).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn years_ago(years: f64, as_of: NaiveDate) -> NaiveDate {
        as_of - chrono::Duration::days((years * DAYS_PER_YEAR).round() as i64)
    }

    #[test]
    fn test_vintage_unknown_is_neutral() {
        assert_eq!(vintage_score(None, date(2024, 1, 1)), 50.0);
    }

    #[test]
    fn test_vintage_curve_segments() {
        let as_of = date(2024, 1, 1);
        assert_eq!(vintage_score(Some(years_ago(1.0, as_of)), as_of), 100.0);
        assert_eq!(vintage_score(Some(years_ago(2.99, as_of)), as_of), 100.0);
        assert!((vintage_score(Some(years_ago(3.0, as_of)), as_of) - 100.0).abs() < 0.05);
        assert!((vintage_score(Some(years_ago(5.0, as_of)), as_of) - 88.0).abs() < 0.05);
        assert!((vintage_score(Some(years_ago(8.0, as_of)), as_of) - 70.0).abs() < 0.05);
        assert!((vintage_score(Some(years_ago(10.0, as_of)), as_of) - 50.0).abs() < 0.05);
        assert!((vintage_score(Some(years_ago(12.0, as_of)), as_of) - 30.0).abs() < 0.05);
        assert!((vintage_score(Some(years_ago(14.0, as_of)), as_of) - 20.0).abs() < 0.05);
        assert_eq!(vintage_score(Some(years_ago(30.0, as_of)), as_of), 10.0);
    }

    #[test]
    fn test_vintage_future_registration() {
        let as_of = date(2024, 1, 1);
        assert_eq!(vintage_score(Some(date(2025, 6, 1)), as_of), 100.0);
    }

    #[test]
    fn test_vintage_never_increases_with_age() {
        let as_of = date(2024, 1, 1);
        let mut previous = f64::INFINITY;
        for days in (0..12_000).step_by(30) {
            let registered = as_of - chrono::Duration::days(days);
            let score = vintage_score(Some(registered), as_of);
            assert!(score <= previous, "score rose at {} days", days);
            assert!((0.0..=100.0).contains(&score));
            previous = score;
        }
    }

    #[test]
    fn test_retirement_no_issuance_is_neutral() {
        assert_eq!(retirement_ratio_score(None), 50.0);

        let mut record = ProjectRecord::new("VCS-1");
        record.total_issued = Some(0.0);
        record.total_retired = Some(10.0);
        assert_eq!(retirement_ratio_score(record.retirement_ratio()), 50.0);
    }

    #[test]
    fn test_retirement_curve_segments() {
        let at = |ratio: f64| retirement_ratio_score(Some(ratio));
        assert_eq!(at(0.0), 0.0);
        assert!((at(0.02) - 4.0).abs() < 1e-9);
        assert!((at(0.05) - 10.0).abs() < 1e-9);
        assert!((at(0.10) - 16.65).abs() < 1e-9);
        assert!((at(0.20) - 30.0).abs() < 1e-9);
        assert!((at(0.35) - 45.0).abs() < 1e-9);
        assert!((at(0.50) - 60.0).abs() < 1e-9);
        assert!((at(0.60) - 80.0).abs() < 1e-9);
        assert_eq!(at(0.75), 100.0);
        assert_eq!(at(0.95), 100.0);
        assert_eq!(at(1.2), 100.0);
    }

    #[test]
    fn test_retirement_monotone_in_retired() {
        let mut previous = f64::NEG_INFINITY;
        for retired in (0..=10_000).step_by(25) {
            let score = retirement_ratio_score(Some(retired as f64 / 10_000.0));
            assert!(score >= previous, "score fell at {} retired", retired);
            assert!((0.0..=100.0).contains(&score));
            previous = score;
        }
    }

    #[test]
    fn test_project_type_scores() {
        let tables = ReferenceTables::default();
        assert_eq!(project_type_score(Some("REDD+"), &tables), 30.0);
        assert_eq!(project_type_score(Some("Jurisdictional redd program"), &tables), 30.0);
        assert_eq!(project_type_score(Some("Afforestation/Reforestation"), &tables), 60.0);
        assert_eq!(project_type_score(Some("Renewable Energy"), &tables), 85.0);
        assert_eq!(project_type_score(None, &tables), 50.0);
    }

    #[test]
    fn test_transparency_counts_populated_fields() {
        let mut project = ProjectRecord::new("VCS-1");
        assert_eq!(transparency_score(&project), 0.0);

        project.proponent = Some("Acme Carbon".to_string());
        assert_eq!(transparency_score(&project), 16.7);

        project.region = Some("Latin America".to_string());
        project.crediting_period_start = Some(date(2015, 1, 1));
        project.crediting_period_end = Some(date(2035, 1, 1));
        project.estimated_annual_reductions = Some(120_000.0);
        project.total_buffer_pool = Some(5_000.0);
        assert_eq!(transparency_score(&project), 100.0);
    }

    #[test]
    fn test_transparency_ignores_zero_and_blank() {
        let mut project = ProjectRecord::new("VCS-1");
        project.proponent = Some("  ".to_string());
        project.total_buffer_pool = Some(0.0);
        project.estimated_annual_reductions = Some(f64::NAN);
        project.region = Some("Asia".to_string());
        assert_eq!(transparency_score(&project), 16.7);
    }

    #[test]
    fn test_additionality_lag_buckets() {
        let start = date(2010, 1, 1);
        assert_eq!(additionality_score(None, Some(start)), 50.0);
        assert_eq!(additionality_score(Some(start), None), 50.0);
        assert_eq!(additionality_score(Some(date(2010, 6, 1)), Some(start)), 90.0);
        assert_eq!(additionality_score(Some(date(2009, 1, 1)), Some(start)), 90.0);
        assert_eq!(additionality_score(Some(date(2012, 1, 1)), Some(start)), 75.0);
        assert_eq!(additionality_score(Some(date(2015, 1, 1)), Some(start)), 55.0);
        assert_eq!(additionality_score(Some(date(2019, 1, 1)), Some(start)), 35.0);
        assert_eq!(additionality_score(Some(date(2022, 1, 1)), Some(start)), 15.0);
    }

    #[test]
    fn test_governance_score_scaling() {
        let tables = ReferenceTables::default();
        assert_eq!(governance_score(Some("United States"), &tables), 85.0);
        assert_eq!(governance_score(Some("Madagascar"), &tables), 35.0);
        assert_eq!(governance_score(Some("Atlantis"), &tables), 50.0);
        assert_eq!(governance_score(None, &tables), 50.0);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(16.666_666, 1), 16.7);
        assert_eq!(round_to(72.345_01, 2), 72.35);
        assert_eq!(round_to(40.0, 2), 40.0);
    }
}
