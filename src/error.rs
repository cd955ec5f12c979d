use thiserror::Error;

/// Conditions the screening core reports instead of degrading to a default.
#[derive(Debug, Error)]
pub enum ScreenerError {
    /// Scoring configuration failed validation. Carries every problem found.
    #[error("invalid scoring configuration: {}", .0.join("; "))]
    InvalidScoring(Vec<String>),

    /// Flag thresholds failed validation.
    #[error("invalid flag thresholds: {}", .0.join("; "))]
    InvalidFlags(Vec<String>),

    /// The batch has no per-record identity column.
    #[error("project batch has no `{0}` column")]
    MissingIdentityColumn(String),

    /// The input is not a list of project records.
    #[error("project batch is malformed: {0}")]
    MalformedBatch(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_scoring_lists_all_errors() {
        let err = ScreenerError::InvalidScoring(vec![
            "scoring.weights: sum to 0.9, expected 1.0".to_string(),
            "scoring.governance.default: must be within [0, 1]".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.contains("sum to 0.9"));
        assert!(msg.contains("governance.default"));
    }

    #[test]
    fn test_missing_identity_message() {
        let err = ScreenerError::MissingIdentityColumn("project_id".to_string());
        assert_eq!(err.to_string(), "project batch has no `project_id` column");
    }
}
