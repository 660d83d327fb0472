//! Per-family log grammars.
//!
//! Each log family has its own informal layout, so each gets its own state
//! machine behind the [`Grammar`] trait:
//!
//! - [`algsupport`]: generic JavaCard algorithm-support dumps; groups are
//!   sections, lines are support rows.
//! - [`aid`]: JavaCard AID / package support; literal section markers route
//!   lines into buffers parsed after partitioning.
//! - [`performance`]: JavaCard benchmarks; section headers (fixed and
//!   variable-data) bracket method blocks reduced into method records.
//! - [`tpm`]: TPM 2.0 benchmarks; operation headers followed by data groups.
//!
//! Grammars never fail. Lines they do not recognize are skipped, which keeps
//! conversions of historical logs best-effort.
//!
//! # Example
//!
//! ```
//! use cardprofile_core::{BASIC_INFO, ReportKind};
//! use cardprofile_parser::convert_text;
//!
//! let doc = convert_text(ReportKind::Tpm, "Manufacturer;INTC\n\nTPM2_Sign\n", ";");
//! assert_eq!(doc.section_names(), vec![BASIC_INFO, "TPM2_Sign"]);
//! ```

pub mod aid;
pub mod algsupport;
pub mod performance;
pub mod tpm;

use cardprofile_core::{ReportKind, ResultDocument};
use tracing::debug;

use crate::segment::{LineGroup, segment_text};

/// A log-family grammar: turns segmented line groups into a result document.
pub trait Grammar: Send + Sync {
    fn kind(&self) -> ReportKind;
    fn convert(&self, groups: &[LineGroup], delimiter: &str) -> ResultDocument;
}

static ALGSUPPORT: algsupport::AlgSupportGrammar = algsupport::AlgSupportGrammar;
static AID: aid::AidGrammar = aid::AidGrammar;
static PERFORMANCE: performance::PerformanceGrammar = performance::PerformanceGrammar;
static TPM: tpm::TpmGrammar = tpm::TpmGrammar;

/// Returns the grammar that handles `kind`.
pub fn grammar_for(kind: ReportKind) -> &'static dyn Grammar {
    match kind {
        ReportKind::AlgSupport => &ALGSUPPORT,
        ReportKind::Aid => &AID,
        ReportKind::Performance => &PERFORMANCE,
        ReportKind::Tpm => &TPM,
    }
}

/// Converts pre-segmented groups with the grammar for `kind`.
pub fn convert_groups(kind: ReportKind, groups: &[LineGroup], delimiter: &str) -> ResultDocument {
    debug!(kind = %kind, groups = groups.len(), "Converting line groups");
    grammar_for(kind).convert(groups, delimiter)
}

/// Segments `text` and converts it with the grammar for `kind`.
pub fn convert_text(kind: ReportKind, text: &str, delimiter: &str) -> ResultDocument {
    convert_groups(kind, &segment_text(text), delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_for_matches_requested_kind() {
        for kind in ReportKind::ALL {
            assert_eq!(grammar_for(kind).kind(), kind);
        }
    }

    #[test]
    fn test_empty_input_produces_typed_document() {
        for kind in ReportKind::ALL {
            let doc = convert_text(kind, "", ";");
            assert_eq!(doc.kind(), kind);
            let json = serde_json::to_value(&doc).unwrap();
            assert_eq!(json["_type"], kind.label());
        }
    }
}
