//! Conversion of smartcard and TPM test-report logs into result documents.
//!
//! This crate turns the semi-structured, delimiter-separated dumps written by
//! JavaCard and TPM measurement tools into [`ResultDocument`]s:
//!
//! 1. [`segment`](segment::segment) splits raw text into blank-line
//!    separated [`LineGroup`]s.
//! 2. [`detect_report_kind`] picks a grammar from the file path, unless a
//!    kind is forced.
//! 3. One of the four [`grammar`]s classifies groups and lines and extracts
//!    attributes, rows and method records, using [`tokenize`] and
//!    [`normalize_numeric`].
//! 4. [`apply_exclusions`](cardprofile_core::apply_exclusions) drops named
//!    attributes, and [`render`] serializes the document as JSON or YAML.
//!
//! Batch helpers ([`process_files`], [`process_folder`]) wrap the pipeline
//! with per-file failure containment and optional parallelism.
//!
//! # Example
//!
//! ```
//! use cardprofile_core::{BASIC_INFO, ReportKind};
//! use cardprofile_parser::convert_text;
//!
//! let text = "Name;Value\nJavaCard support version;1.0\n\nGroup1\na;1\nb;2\n";
//! let doc = convert_text(ReportKind::AlgSupport, text, ";");
//!
//! assert_eq!(doc.section_names(), vec![BASIC_INFO, "Group1"]);
//! let json = serde_json::to_value(&doc).unwrap();
//! assert_eq!(json["_type"], "javacard-algsupport");
//! assert_eq!(json["Group1"][1][0]["value"], "b");
//! ```
//!
//! [`ResultDocument`]: cardprofile_core::ResultDocument

pub mod config;
pub mod convert;
pub mod detect;
pub mod error;
pub mod grammar;
pub mod output;
pub mod report;
pub mod segment;
pub mod tokenize;

pub use config::{AUTO_KIND, ConvertConfig, DEFAULT_DELIMITER, load_exclusions};
pub use convert::{
    ConvertOptions, collect_input_files, convert_file, convert_to, default_output_dir,
    process_files, process_folder, write_document,
};
pub use detect::detect_report_kind;
pub use error::{ConvertError, Result};
pub use grammar::{Grammar, convert_groups, convert_text, grammar_for};
pub use output::{OutputFormat, render};
pub use report::{ConversionReportBundle, FileOutcome, build_report_bundle};
pub use segment::{LineGroup, load_groups, segment, segment_text};
pub use tokenize::{normalize_numeric, tokenize};
