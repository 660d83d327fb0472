//! Core result-document types for profile conversion.
//!
//! This crate defines the data model every log grammar produces:
//!
//! - [`Attribute`]: a flat `{name, value}` pair, the leaf of all grammars.
//! - [`Record`]: an insertion-ordered key/value map.
//! - [`MethodRecord`], [`PackageAid`], [`FullPackageAid`], [`KeyInfo`]:
//!   format-specific structured records.
//! - [`Entry`] and [`Section`]: the tagged payloads stored per section.
//! - [`ResultDocument`]: the `_type`-tagged, ordered collection of sections.
//!
//! Assembly ([`ResultDocument::append`] and friends) concatenates repeated
//! section names instead of overwriting them. Exclusion
//! ([`apply_exclusions`]) strips named flat attributes.
//!
//! # Example
//!
//! ```
//! use cardprofile_core::*;
//!
//! let mut doc = ResultDocument::new(ReportKind::Tpm);
//! doc.push_entry(BASIC_INFO, Entry::Attribute(Attribute::new("Manufacturer", "INTC")));
//! doc.ensure_list("TPM2_Sign");
//! doc.push_entry("TPM2_Sign", Entry::Record([("Key parameters", "ECC")].into_iter().collect()));
//!
//! assert_eq!(doc.section_names(), vec![BASIC_INFO, "TPM2_Sign"]);
//! let json = serde_json::to_value(&doc).unwrap();
//! assert_eq!(json["TPM2_Sign"][0]["Key parameters"], "ECC");
//! ```

mod exclude;
mod merge;
mod types;

pub use exclude::apply_exclusions;
pub use types::*;
