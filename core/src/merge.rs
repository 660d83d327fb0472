//! Record assembly with concatenating section merges.
//!
//! Grammars emit `(section name, payload)` pairs in encounter order. The
//! assembler methods on [`ResultDocument`] fold them into the document: the
//! first emission of a name fixes its output position, later emissions are
//! appended to the existing payload and never replace it.
//!
//! # Example
//!
//! ```
//! use cardprofile_core::*;
//!
//! let mut doc = ResultDocument::new(ReportKind::AlgSupport);
//! doc.extend_entries("Group1", vec![Entry::Attribute(Attribute::new("a", "1"))]);
//! doc.extend_entries("Group2", vec![Entry::Attribute(Attribute::new("b", "2"))]);
//! doc.extend_entries("Group1", vec![Entry::Attribute(Attribute::new("c", "3"))]);
//!
//! assert_eq!(doc.section_names(), vec!["Group1", "Group2"]);
//! assert_eq!(doc.get("Group1").unwrap().entries().len(), 2);
//! ```

use tracing::warn;

use crate::{Entry, KeyInfo, ResultDocument, Section};

impl KeyInfo {
    /// Appends the keys and notes of `other`.
    pub fn merge(&mut self, other: KeyInfo) {
        self.keys.extend(other.keys);
        self.notes.extend(other.notes);
    }
}

impl Section {
    /// Concatenates `incoming` onto this payload.
    ///
    /// Returns `false` when the payload kinds differ; the existing payload is
    /// left untouched in that case.
    pub fn merge(&mut self, incoming: Section) -> bool {
        match (self, incoming) {
            (Section::List(existing), Section::List(more)) => {
                existing.extend(more);
                true
            }
            (Section::KeyInfo(existing), Section::KeyInfo(more)) => {
                existing.merge(more);
                true
            }
            _ => false,
        }
    }
}

impl ResultDocument {
    /// Adds `section` under `name`, concatenating with an existing payload.
    pub fn append(&mut self, name: impl Into<String>, section: Section) {
        let name = name.into();
        match self.position(&name) {
            Some(index) => {
                let existing = &mut self.sections[index].1;
                let existing_kind = existing.kind_name();
                let incoming_kind = section.kind_name();
                if !existing.merge(section) {
                    warn!(
                        section = %name,
                        existing = existing_kind,
                        incoming = incoming_kind,
                        "Dropping section payload of mismatched kind"
                    );
                }
            }
            None => self.sections.push((name, section)),
        }
    }

    /// Appends `entries` to the list section `name`, creating it if absent.
    pub fn extend_entries(&mut self, name: impl Into<String>, entries: Vec<Entry>) {
        self.append(name, Section::List(entries));
    }

    /// Appends a single entry to the list section `name`.
    pub fn push_entry(&mut self, name: impl Into<String>, entry: Entry) {
        self.append(name, Section::List(vec![entry]));
    }

    /// Creates an empty list section `name` unless one already exists.
    ///
    /// Used for headers that open a section before any record arrives, so the
    /// section keeps its position even if it stays empty.
    pub fn ensure_list(&mut self, name: impl Into<String>) {
        self.append(name, Section::List(Vec::new()));
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sections
            .iter()
            .position(|(existing, _)| existing == name)
    }
}
