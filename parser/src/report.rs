//! Structured conversion reporting for batch runs.

use std::path::PathBuf;

use cardprofile_core::ReportKind;
use chrono::Utc;
use serde::Serialize;

/// Result of converting one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub input: PathBuf,
    /// Written output path; absent when conversion or writing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub kind: ReportKind,
    pub success: bool,
    /// Human-readable failure detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of sections in the converted document.
    pub sections: usize,
    /// Number of attributes removed by the exclusion list.
    pub excluded: usize,
}

impl FileOutcome {
    pub fn succeeded(
        input: PathBuf,
        output: PathBuf,
        kind: ReportKind,
        sections: usize,
        excluded: usize,
    ) -> Self {
        Self {
            input,
            output: Some(output),
            kind,
            success: true,
            error: None,
            sections,
            excluded,
        }
    }

    pub fn failed(input: PathBuf, kind: ReportKind, error: impl ToString) -> Self {
        Self {
            input,
            output: None,
            kind,
            success: false,
            error: Some(error.to_string()),
            sections: 0,
            excluded: 0,
        }
    }
}

/// Batch report for a full conversion run.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionReportBundle {
    pub generated_at: String,
    pub version: String,
    pub outcomes: Vec<FileOutcome>,
    /// Inputs that failed, in input order.
    pub failures: Vec<PathBuf>,
}

impl ConversionReportBundle {
    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.success).count()
    }
}

/// Builds a serializable bundle report for a conversion run.
pub fn build_report_bundle(version: &str, outcomes: Vec<FileOutcome>) -> ConversionReportBundle {
    let failures = outcomes
        .iter()
        .filter(|outcome| !outcome.success)
        .map(|outcome| outcome.input.clone())
        .collect();
    ConversionReportBundle {
        generated_at: Utc::now().to_rfc3339(),
        version: version.to_string(),
        outcomes,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_collects_failures_in_order() {
        let outcomes = vec![
            FileOutcome::failed("b.csv".into(), ReportKind::Tpm, "failed to read 'b.csv'"),
            FileOutcome::succeeded("a.csv".into(), "a.json".into(), ReportKind::AlgSupport, 3, 1),
            FileOutcome::failed("c.csv".into(), ReportKind::Aid, "boom"),
        ];

        let bundle = build_report_bundle("0.1.0", outcomes);
        assert!(bundle.generated_at.contains('T'));
        assert_eq!(bundle.success_count(), 1);
        assert_eq!(bundle.failures, vec![PathBuf::from("b.csv"), PathBuf::from("c.csv")]);
    }

    #[test]
    fn test_outcome_serialization_omits_absent_fields() {
        let ok = FileOutcome::succeeded("a.csv".into(), "a.json".into(), ReportKind::Tpm, 2, 0);
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["kind"], "tpm");
        assert_eq!(json["output"], "a.json");
        assert!(json.get("error").is_none());

        let failed = FileOutcome::failed("a.csv".into(), ReportKind::Tpm, "boom");
        let json = serde_json::to_value(&failed).unwrap();
        assert!(json.get("output").is_none());
        assert_eq!(json["error"], "boom");
    }
}
