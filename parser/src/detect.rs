//! Report-kind detection from file paths.
//!
//! Measurement tools name their dumps after the test that produced them
//! (`..._ALGSUPPORT_...`, `..._AIDSUPPORT_...`, `tpm/...`), and batch folders
//! are usually organized the same way. The rules below are checked in order
//! against the whole path string, case-insensitively; the first hit wins.

use std::path::Path;
use std::sync::LazyLock;

use cardprofile_core::ReportKind;
use regex::Regex;
use tracing::debug;

struct Rule {
    kind: ReportKind,
    pattern: Regex,
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    vec![
        Rule {
            kind: ReportKind::Tpm,
            pattern: Regex::new(r"(?i)(?:^|[^a-z0-9])tpm(?:[^a-z0-9]|$)")
                .expect("static regex must compile"),
        },
        Rule {
            kind: ReportKind::Aid,
            pattern: Regex::new(r"(?i)(?:^|[^a-z0-9])aid(?:support)?(?:[^a-z0-9]|$)")
                .expect("static regex must compile"),
        },
        Rule {
            kind: ReportKind::Performance,
            pattern: Regex::new(r"(?i)performance").expect("static regex must compile"),
        },
    ]
});

/// Picks the grammar for `path`, falling back to algorithm support.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use cardprofile_core::ReportKind;
/// use cardprofile_parser::detect_report_kind;
///
/// assert_eq!(detect_report_kind(Path::new("tpm/INTC_results.csv")), ReportKind::Tpm);
/// assert_eq!(
///     detect_report_kind(Path::new("NXP_J3H145_AIDSUPPORT_3B00.csv")),
///     ReportKind::Aid
/// );
/// assert_eq!(
///     detect_report_kind(Path::new("NXP_J3H145_ALGSUPPORT_3B00.csv")),
///     ReportKind::AlgSupport
/// );
/// ```
pub fn detect_report_kind(path: &Path) -> ReportKind {
    let text = path.to_string_lossy();
    let kind = RULES
        .iter()
        .find(|rule| rule.pattern.is_match(&text))
        .map_or(ReportKind::AlgSupport, |rule| rule.kind);
    debug!(path = %text, kind = %kind, "Detected report kind");
    kind
}
