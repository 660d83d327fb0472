//! Generic JavaCard algorithm-support dumps.
//!
//! The dump opens with a free-form preamble of `name;value` lines that ends
//! at the line carrying `JavaCard support version`. Every later group is one
//! section: its first line names it, and each line becomes a support row
//! (`algorithm_name`, `is_supported`, `time_elapsed` and three memory
//! figures). `JCSystem` and `CPLC` sections hold plain attributes instead.

use cardprofile_core::{Attribute, BASIC_INFO, Entry, ReportKind, ResultDocument};
use tracing::debug;

use super::Grammar;
use crate::segment::LineGroup;
use crate::tokenize::tokenize;

/// Substring that terminates the basic-information preamble.
pub const END_OF_BASIC_INFO: &str = "JavaCard support version";

/// Field names of a support row, by token position.
pub const ROW_FIELDS: [&str; 6] = [
    "algorithm_name",
    "is_supported",
    "time_elapsed",
    "persistent_mem_allocated",
    "ram_deselect_allocated",
    "ram_reset_allocated",
];

/// Sections whose lines stay flat `{name, value}` attributes.
const FLAT_SECTIONS: [&str; 2] = ["JCSystem", "CPLC"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Still inside the preamble; every line is a basic attribute.
    BasicInfo,
    /// Preamble finished; each group opens its own section.
    Sections,
}

/// Grammar for `javacard-algsupport` dumps.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlgSupportGrammar;

impl Grammar for AlgSupportGrammar {
    fn kind(&self) -> ReportKind {
        ReportKind::AlgSupport
    }

    fn convert(&self, groups: &[LineGroup], delimiter: &str) -> ResultDocument {
        let mut doc = ResultDocument::new(ReportKind::AlgSupport);
        let mut phase = Phase::BasicInfo;

        for group in groups {
            if phase == Phase::Sections && group.len() < 2 {
                debug!(line = ?group.first_line(), "Dropping single-line group");
                continue;
            }

            let (name, entries, next) = parse_group(group, phase, delimiter);
            if next != phase {
                debug!(section = %name, "Basic information finished");
            }
            phase = next;
            doc.extend_entries(name, entries);
        }

        doc
    }
}

fn parse_group(group: &LineGroup, phase: Phase, delimiter: &str) -> (String, Vec<Entry>, Phase) {
    let mut finished = phase == Phase::Sections;
    let name = match phase {
        Phase::BasicInfo => BASIC_INFO.to_string(),
        Phase::Sections => group
            .first_line()
            .map(|line| section_name(line, delimiter))
            .unwrap_or_default(),
    };
    let flat_section = FLAT_SECTIONS.contains(&name.as_str());

    let mut entries = Vec::new();
    for line in group.iter() {
        if !finished && line.contains(END_OF_BASIC_INFO) {
            finished = true;
        }

        let tokens = tokenize(line, delimiter);
        if tokens.len() < 2 {
            continue;
        }

        if flat_section || !finished || tokens[0] == END_OF_BASIC_INFO {
            entries.push(Entry::Attribute(Attribute::new(tokens[0], tokens[1])));
            continue;
        }

        let row = support_row(&tokens, &name);
        if !row.is_empty() {
            entries.push(Entry::Row(row));
        }
    }

    let next = if finished {
        Phase::Sections
    } else {
        Phase::BasicInfo
    };
    (name, entries, next)
}

/// Derives a section name from the first line of its group.
///
/// Without a delimiter the whole line is the name. Otherwise the token before
/// the first delimiter is used, cut at its first `.` so dotted class names
/// such as `JCSystem.getVersion()` collapse to `JCSystem`.
fn section_name(line: &str, delimiter: &str) -> String {
    let split = if delimiter.is_empty() {
        None
    } else {
        line.split_once(delimiter)
    };
    let Some((head, _)) = split else {
        return line.trim().to_string();
    };
    head.split('.').next().unwrap_or(head).trim().to_string()
}

/// Builds a positional support row, skipping tokens that repeat the section name.
fn support_row(tokens: &[&str], section: &str) -> Vec<Attribute> {
    tokens
        .iter()
        .zip(ROW_FIELDS)
        .filter(|(token, _)| **token != section)
        .map(|(token, field)| Attribute::new(field, *token))
        .collect()
}
