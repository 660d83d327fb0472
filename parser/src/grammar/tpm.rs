//! TPM 2.0 benchmark dumps.
//!
//! The first group is the basic-information preamble. Afterwards a bare
//! `TPM2_<Command>` group opens an operation section and each following data
//! group (parameters line, then `operation stats` / `operation info` lines)
//! becomes one flat record under it.

use cardprofile_core::{BASIC_INFO, Entry, Record, ReportKind, ResultDocument};
use tracing::debug;

use super::Grammar;
use crate::segment::LineGroup;
use crate::tokenize::{attribute_from_tokens, colon_pairs, tokenize};

pub const OPERATION_PREFIX: &str = "TPM2_";

/// Line prefixes that open a data group.
pub const CONFIG_KEYWORDS: [&str; 4] = [
    "Key parameters:",
    "Algorithm:",
    "Hash algorithm:",
    "Data length (bytes):",
];

/// Group classification by first line, checked in this order.
#[derive(Debug, PartialEq, Eq)]
enum GroupKind<'a> {
    Operation(&'a str),
    Data,
    Unclassified,
}

fn classify<'a>(first_line: &'a str, delimiter: &str) -> GroupKind<'a> {
    let has_delimiter = !delimiter.is_empty() && first_line.contains(delimiter);
    if first_line.starts_with(OPERATION_PREFIX) && !has_delimiter {
        GroupKind::Operation(first_line)
    } else if CONFIG_KEYWORDS
        .iter()
        .any(|keyword| first_line.starts_with(keyword))
    {
        GroupKind::Data
    } else {
        GroupKind::Unclassified
    }
}

/// Grammar for `tpm` dumps.
#[derive(Debug, Default, Clone, Copy)]
pub struct TpmGrammar;

impl Grammar for TpmGrammar {
    fn kind(&self) -> ReportKind {
        ReportKind::Tpm
    }

    fn convert(&self, groups: &[LineGroup], delimiter: &str) -> ResultDocument {
        let mut doc = ResultDocument::new(ReportKind::Tpm);
        let Some((basic, rest)) = groups.split_first() else {
            return doc;
        };

        let attributes = basic
            .iter()
            .filter_map(|line| attribute_from_tokens(&tokenize(line, delimiter)))
            .map(Entry::Attribute)
            .collect();
        doc.extend_entries(BASIC_INFO, attributes);

        let mut operation: Option<&str> = None;
        for group in rest {
            let Some(first_line) = group.first_line() else {
                continue;
            };

            match classify(first_line, delimiter) {
                GroupKind::Operation(name) => {
                    debug!(operation = name, "Opening operation");
                    doc.ensure_list(name);
                    operation = Some(name);
                }
                kind => {
                    let Some(name) = operation else {
                        debug!(line = first_line, "Discarding data group without an operation");
                        continue;
                    };
                    if kind == GroupKind::Unclassified {
                        debug!(operation = name, line = first_line, "Parsing unclassified group as data");
                    }
                    let record = parse_data_group(group, delimiter);
                    if !record.is_empty() {
                        doc.push_entry(name, Entry::Record(record));
                    }
                }
            }
        }

        doc
    }
}

/// Merges a data group into one record.
///
/// The first line contributes its `key:` / value pairs from the first token.
/// `operation stats` and `operation info` lines contribute theirs after the
/// label. Later keys overwrite earlier ones in place.
fn parse_data_group(group: &LineGroup, delimiter: &str) -> Record {
    let mut record = Record::new();
    for (index, line) in group.iter().enumerate() {
        let start = if index == 0 {
            0
        } else if line.starts_with("operation stats") || line.starts_with("operation info") {
            1
        } else {
            continue;
        };
        for (key, value) in colon_pairs(&tokenize(line, delimiter), start) {
            record.insert(key, value);
        }
    }
    record
}
