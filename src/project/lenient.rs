//! Forgiving field parsers for registry exports.
//!
//! A value that cannot be read as a date or a number becomes `None` with a
//! warning, so one bad cell never rejects the batch. The loader wraps each
//! row in a span carrying the project id.

use chrono::NaiveDate;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use tracing::warn;

/// Date layouts accepted besides ISO `YYYY-MM-DD`.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d.%m.%Y"];

#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Parse a number, accepting thousands separators ("1,234,567").
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '_')
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a calendar date. A trailing time part ("2015-01-01T00:00:00") is ignored.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let day = text.split(['T', ' ']).next().unwrap_or(text);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day, fmt).ok())
}

fn lenient_number<'de, D>(deserializer: D, field: &'static str) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<RawField>::deserialize(deserializer)? {
        None => None,
        Some(RawField::Number(v)) if v.is_finite() => Some(v),
        Some(RawField::Text(text)) if text.trim().is_empty() => None,
        Some(RawField::Text(text)) => {
            let value = parse_number(&text);
            if value.is_none() {
                warn!(field, value = %text, "unparseable number, treating as missing");
            }
            value
        }
        Some(_) => {
            warn!(field, "non-numeric value, treating as missing");
            None
        }
    };
    Ok(parsed)
}

fn lenient_date<'de, D>(deserializer: D, field: &'static str) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Option::<RawField>::deserialize(deserializer)? {
        None => None,
        Some(RawField::Text(text)) if text.trim().is_empty() => None,
        Some(RawField::Text(text)) => {
            let value = parse_date(&text);
            if value.is_none() {
                warn!(field, value = %text, "unparseable date, treating as missing");
            }
            value
        }
        Some(_) => {
            warn!(field, "non-text date value, treating as missing");
            None
        }
    };
    Ok(parsed)
}

pub fn registration_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    lenient_date(d, "registration_date")
}

pub fn crediting_period_start<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<NaiveDate>, D::Error> {
    lenient_date(d, "crediting_period_start")
}

pub fn crediting_period_end<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    lenient_date(d, "crediting_period_end")
}

pub fn total_issued<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    lenient_number(d, "total_issued")
}

pub fn total_retired<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    lenient_number(d, "total_retired")
}

pub fn total_buffer_pool<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    lenient_number(d, "total_buffer_pool")
}

pub fn estimated_annual_reductions<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<f64>, D::Error> {
    lenient_number(d, "estimated_annual_reductions")
}
