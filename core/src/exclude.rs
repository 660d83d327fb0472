//! Attribute exclusion by name.
//!
//! Only flat [`Attribute`](crate::Attribute) entries are filtered. Rows,
//! method records, table rows, TPM records and key-info blocks pass through
//! unchanged.

use std::collections::BTreeSet;

use crate::{Entry, ResultDocument, Section};

/// Removes every flat attribute whose name is in `excluded`.
///
/// Returns the filtered document and the number of attributes removed.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeSet;
/// use cardprofile_core::*;
///
/// let mut doc = ResultDocument::new(ReportKind::Tpm);
/// doc.extend_entries(BASIC_INFO, vec![
///     Entry::Attribute(Attribute::new("Manufacturer", "INTC")),
///     Entry::Attribute(Attribute::new("Serial", "1234")),
/// ]);
///
/// let excluded: BTreeSet<String> = ["Serial".to_string()].into();
/// let (filtered, removed) = apply_exclusions(doc, &excluded);
/// assert_eq!(removed, 1);
/// assert_eq!(filtered.get(BASIC_INFO).unwrap().entries().len(), 1);
/// ```
pub fn apply_exclusions(
    mut document: ResultDocument,
    excluded: &BTreeSet<String>,
) -> (ResultDocument, usize) {
    if excluded.is_empty() {
        return (document, 0);
    }

    let mut removed = 0usize;
    for (_, section) in &mut document.sections {
        let Section::List(entries) = section else {
            continue;
        };
        entries.retain(|entry| match entry {
            Entry::Attribute(attr) if excluded.contains(&attr.name) => {
                removed += 1;
                false
            }
            _ => true,
        });
    }

    (document, removed)
}
