//! Structured Feedback
//!
//! Machine-readable analysis results for editors and scripts.

use serde::{Deserialize, Serialize};

use crate::utils::SemanticError;

/// Outcome of analyzing one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// No diagnostics were produced
    pub success: bool,

    /// Source file
    pub source_file: String,

    /// All diagnostics, in detection order
    pub diagnostics: Vec<DiagnosticEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    /// Error code (e.g., "E0003")
    pub code: String,

    /// Human-readable message
    pub message: String,
}

impl From<&SemanticError> for DiagnosticEntry {
    fn from(error: &SemanticError) -> Self {
        Self {
            code: error.code().to_string(),
            message: error.to_string(),
        }
    }
}

impl AnalysisReport {
    pub fn new(source_file: &str, errors: &[SemanticError]) -> Self {
        Self {
            success: errors.is_empty(),
            source_file: source_file.to_string(),
            diagnostics: errors.iter().map(DiagnosticEntry::from).collect(),
        }
    }

    /// Output as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_clean_report() {
        let report = AnalysisReport::new("prog.caju", &[]);
        assert!(report.success);
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_report_json_shape() {
        let errors = vec![
            SemanticError::UndeclaredVariable {
                name: "x".to_string(),
            },
            SemanticError::ReturnOutsideFunction,
        ];
        let report = AnalysisReport::new("prog.caju", &errors);
        let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "success": false,
                "source_file": "prog.caju",
                "diagnostics": [
                    { "code": "E0003", "message": "variable 'x' is not declared" },
                    { "code": "E0015", "message": "'retorne' outside of a function" }
                ]
            })
        );
    }
}
