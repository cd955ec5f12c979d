use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn, warn_span};

use crate::error::ScreenerError;
use crate::project::ProjectRecord;

/// Column every batch must carry.
pub const IDENTITY_COLUMN: &str = "project_id";

/// Load cleaned project records from a `.json` or `.csv` file.
///
/// Duplicate project ids are dropped (first occurrence wins) and ledger
/// rows with `retired + buffer > issued` are reported but kept.
pub fn load_projects(path: &Path) -> Result<Vec<ProjectRecord>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let file = File::open(path)
        .with_context(|| format!("Failed to open project batch at {}", path.display()))?;

    let records = match extension.as_deref() {
        Some("csv") => parse_csv(file)?,
        Some("json") => parse_json(file)?,
        _ => anyhow::bail!(
            "Unsupported batch format for {} (expected .json or .csv)",
            path.display()
        ),
    };

    let records = dedupe(records);
    report_ledger_inconsistencies(&records);
    info!("loaded {} projects from {}", records.len(), path.display());
    Ok(records)
}

/// Parse a JSON array of project objects.
///
/// Only structural problems fail the batch. Unreadable dates and numbers
/// inside a record are logged and read as absent.
pub fn parse_json<R: Read>(reader: R) -> Result<Vec<ProjectRecord>, ScreenerError> {
    let value: serde_json::Value =
        serde_json::from_reader(reader).map_err(|e| ScreenerError::MalformedBatch(e.to_string()))?;

    let rows = value.as_array().ok_or_else(|| {
        ScreenerError::MalformedBatch("expected a JSON array of project records".to_string())
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let object = row.as_object().ok_or_else(|| {
            ScreenerError::MalformedBatch(format!("row {} is not an object", i + 1))
        })?;
        let Some(id) = object.get(IDENTITY_COLUMN) else {
            return Err(ScreenerError::MissingIdentityColumn(IDENTITY_COLUMN.to_string()));
        };
        let project_id = id.as_str().unwrap_or("");
        let _row = warn_span!("row", row = i + 1, project_id).entered();
        let record: ProjectRecord = serde_json::from_value(row.clone())
            .map_err(|e| ScreenerError::MalformedBatch(format!("row {}: {}", i + 1, e)))?;
        records.push(record);
    }
    Ok(records)
}

/// Parse a CSV batch with a header row.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<ProjectRecord>, ScreenerError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| ScreenerError::MalformedBatch(e.to_string()))?
        .clone();
    let Some(id_column) = headers.iter().position(|h| h == IDENTITY_COLUMN) else {
        return Err(ScreenerError::MissingIdentityColumn(IDENTITY_COLUMN.to_string()));
    };

    let mut records = Vec::new();
    for (i, row) in rdr.records().enumerate() {
        // Row 1 is the header
        let line = i + 2;
        let row = row.map_err(|e| ScreenerError::MalformedBatch(format!("row {}: {}", line, e)))?;
        let project_id = row.get(id_column).unwrap_or("");
        let _row = warn_span!("row", row = line, project_id).entered();
        let record: ProjectRecord = row
            .deserialize(Some(&headers))
            .map_err(|e| ScreenerError::MalformedBatch(format!("row {}: {}", line, e)))?;
        records.push(record);
    }
    Ok(records)
}

fn dedupe(records: Vec<ProjectRecord>) -> Vec<ProjectRecord> {
    let mut seen = HashSet::new();
    let total = records.len();
    let unique: Vec<_> = records
        .into_iter()
        .filter(|r| {
            let id = r.project_id.trim();
            // Blank ids can't collide meaningfully; keep them for positional reporting
            id.is_empty() || seen.insert(id.to_string())
        })
        .collect();

    if unique.len() < total {
        warn!("dropped {} duplicate project ids", total - unique.len());
    }
    unique
}

fn report_ledger_inconsistencies(records: &[ProjectRecord]) {
    for record in records.iter().filter(|r| !r.ledger_is_consistent()) {
        warn!(
            project_id = %record.project_id,
            "retired + buffer pool exceeds issued credits"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::env;
    use std::fs;

    #[test]
    fn test_parse_json_batch() {
        let json = r#"[
            {"project_id": "VCS-1", "project_type": "REDD+", "total_issued": 1000, "total_retired": 0},
            {"project_id": "VCS-2", "registration_date": "2019-03-01", "country": null}
        ]"#;
        let records = parse_json(json.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].total_issued, Some(1000.0));
        assert_eq!(records[1].registration_date, NaiveDate::from_ymd_opt(2019, 3, 1));
        assert!(records[1].country.is_none());
    }

    #[test]
    fn test_json_must_be_array() {
        let err = parse_json(r#"{"project_id": "VCS-1"}"#.as_bytes()).unwrap_err();
        assert!(matches!(err, ScreenerError::MalformedBatch(_)));
    }

    #[test]
    fn test_json_missing_identity() {
        let err = parse_json(r#"[{"name": "Orphan"}]"#.as_bytes()).unwrap_err();
        assert!(matches!(err, ScreenerError::MissingIdentityColumn(_)));
    }

    #[test]
    fn test_parse_csv_with_blank_cells() {
        let csv = "\
project_id,name,country,project_type,registration_date,crediting_period_end,total_issued,total_retired
VCS-1,Rimba Raya,Indonesia,REDD+,2013-01-01,,100000,
VCS-2,Windpark,Germany,Renewable Energy,,2030-12-31,5000,4000
";
        let records = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].country.as_deref(), Some("Indonesia"));
        assert!(records[0].crediting_period_end.is_none());
        assert!(records[0].total_retired.is_none());
        assert!(records[1].registration_date.is_none());
        assert_eq!(records[1].total_retired, Some(4000.0));
        // Columns absent from the file are simply None
        assert!(records[1].proponent.is_none());
    }

    #[test]
    fn test_csv_missing_identity_column() {
        let csv = "name,country\nWindpark,Germany\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ScreenerError::MissingIdentityColumn(_)));
    }

    #[test]
    fn test_csv_bad_cells_degrade_to_absent() {
        let csv = "\
project_id,registration_date,total_issued,total_retired
VCS-1,2015-01-01,1000,10
VCS-2,not-a-date,5000,lots
VCS-3,2015/01/01,\"1,234,567\",0
";
        let records = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert!(records[1].registration_date.is_none());
        assert_eq!(records[1].total_issued, Some(5000.0));
        assert!(records[1].total_retired.is_none());
        assert_eq!(records[2].registration_date, NaiveDate::from_ymd_opt(2015, 1, 1));
        assert_eq!(records[2].total_issued, Some(1_234_567.0));
    }

    #[test]
    fn test_json_bad_cells_degrade_to_absent() {
        let json = r#"[
            {"project_id": "VCS-1", "registration_date": "2015-01-01"},
            {"project_id": "VCS-2", "registration_date": "2015/13/01", "total_issued": "1,000"}
        ]"#;
        let records = parse_json(json.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert!(records[1].registration_date.is_none());
        assert_eq!(records[1].total_issued, Some(1_000.0));
    }

    #[test]
    fn test_csv_ragged_row_is_malformed() {
        let csv = "project_id,total_issued\nVCS-1,10,extra\n";
        let err = parse_csv(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ScreenerError::MalformedBatch(_)));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_load_projects_dedupes() {
        let path = env::temp_dir().join("offset_screener_test_batch.json");
        fs::write(
            &path,
            r#"[{"project_id": "VCS-1", "name": "first"},
                {"project_id": "VCS-1", "name": "second"},
                {"project_id": "VCS-2"}]"#,
        )
        .unwrap();

        let records = load_projects(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("first"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_unknown_extension() {
        let path = env::temp_dir().join("offset_screener_test_batch.xlsx");
        fs::write(&path, "irrelevant").unwrap();

        let err = load_projects(&path).unwrap_err();
        assert!(err.to_string().contains("Unsupported batch format"));

        let _ = fs::remove_file(&path);
    }
}
