//! Result document type definitions.
//!
//! This module defines the data model produced by every grammar: flat
//! [`Attribute`]s, ordered [`Record`]s, the per-format structured records, and
//! the [`ResultDocument`] that collects them into named [`Section`]s. The types
//! are designed for serialization with [`serde`]; insertion order is preserved
//! everywhere because the legacy consumers of the JSON output rely on it.

use std::fmt;
use std::str::FromStr;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Name of the leading preamble section shared by all four log families.
pub const BASIC_INFO: &str = "Basic information";

/// Key under which the report kind is written in serialized documents.
pub const TYPE_KEY: &str = "_type";

/// Log family a document was converted from.
///
/// The label is written under `_type` in every serialized document and is the
/// accepted spelling for [`FromStr`].
///
/// # Examples
///
/// ```
/// use cardprofile_core::ReportKind;
///
/// let kind: ReportKind = "tpm".parse().unwrap();
/// assert_eq!(kind, ReportKind::Tpm);
/// assert_eq!(ReportKind::Aid.label(), "javacard-aid");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportKind {
    /// Generic JavaCard algorithm-support dump.
    AlgSupport,
    /// JavaCard AID / package support dump.
    Aid,
    /// JavaCard performance benchmark dump (fixed and variable data).
    Performance,
    /// TPM 2.0 benchmark dump.
    Tpm,
}

impl ReportKind {
    /// Every report kind, in dispatch-priority independent order.
    pub const ALL: [ReportKind; 4] = [
        ReportKind::AlgSupport,
        ReportKind::Aid,
        ReportKind::Performance,
        ReportKind::Tpm,
    ];

    /// Returns the `_type` discriminator for this kind.
    pub fn label(self) -> &'static str {
        match self {
            Self::AlgSupport => "javacard-algsupport",
            Self::Aid => "javacard-aid",
            Self::Performance => "javacard-performance",
            Self::Tpm => "tpm",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a string is not a known [`ReportKind`] label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown report kind '{0}' (expected one of: javacard-algsupport, javacard-aid, javacard-performance, tpm)")]
pub struct UnknownReportKind(pub String);

impl FromStr for ReportKind {
    type Err = UnknownReportKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownReportKind(wanted.to_string()))
    }
}

impl Serialize for ReportKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// A `{name, value}` pair taken from one tokenized line.
///
/// The name is the first token and the value the second token, or an empty
/// string when the line carried a single token.
///
/// # Examples
///
/// ```
/// use cardprofile_core::Attribute;
///
/// let attr = Attribute::new("Card ATR", "3BFC1800");
/// assert_eq!(attr.name, "Card ATR");
/// assert_eq!(
///     serde_json::to_string(&attr).unwrap(),
///     r#"{"name":"Card ATR","value":"3BFC1800"}"#
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    /// Creates an attribute from a name and value.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates an attribute with an empty value (sentinel lines such as `NO CPLC`).
    pub fn flag(name: impl Into<String>) -> Self {
        Self::new(name, String::new())
    }
}

/// Insertion-ordered string map.
///
/// Inserting a key that already exists replaces its value but keeps the
/// key's original position, which mirrors how the source tools built their
/// dictionaries line by line.
///
/// # Examples
///
/// ```
/// use cardprofile_core::Record;
///
/// let mut record = Record::new();
/// record.insert("avg op", "1.0");
/// record.insert("min op", "0.5");
/// record.insert("avg op", "1.5");
///
/// assert_eq!(record.get("avg op"), Some("1.5"));
/// assert_eq!(record.keys().collect::<Vec<_>>(), vec!["avg op", "min op"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// One tested method from a JavaCard performance dump.
///
/// Every field is optional; absent fields are omitted from the output. The
/// `supported` flag is set explicitly by a `NO_SUCH_ALGORITHM` line or
/// inferred from the presence of measurements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MethodRecord {
    #[serde(rename = "method name", skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    #[serde(rename = "data length", skip_serializing_if = "Option::is_none")]
    pub data_length: Option<String>,
    #[serde(rename = "measurement config", skip_serializing_if = "Option::is_none")]
    pub measurement_config: Option<Record>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported: Option<bool>,
    #[serde(rename = "baseline measurements", skip_serializing_if = "Option::is_none")]
    pub baseline_measurements: Option<Vec<String>>,
    #[serde(rename = "baseline stats", skip_serializing_if = "Option::is_none")]
    pub baseline_stats: Option<Record>,
    #[serde(
        rename = "operation raw measurements",
        skip_serializing_if = "Option::is_none"
    )]
    pub operation_raw_measurements: Option<Vec<String>>,
    #[serde(rename = "operation stats", skip_serializing_if = "Option::is_none")]
    pub operation_stats: Option<Record>,
    #[serde(rename = "operation info", skip_serializing_if = "Option::is_none")]
    pub operation_info: Option<Record>,
}

impl MethodRecord {
    /// Returns `true` if the record carries a measurement series or a stats map.
    pub fn has_measurements(&self) -> bool {
        self.baseline_measurements.is_some()
            || self.baseline_stats.is_some()
            || self.operation_raw_measurements.is_some()
            || self.operation_stats.is_some()
    }

    /// Returns `true` if no field was extracted at all.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Row of the `PACKAGE AID` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageAid {
    pub package_aid: String,
    pub major_version: String,
    pub minor_version: String,
    pub package_name: String,
    pub jc_api_version: String,
}

/// Row of the `FULL PACKAGE AID` support table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FullPackageAid {
    pub full_package_aid: String,
    pub supported: bool,
    pub package_name_version: String,
}

/// The `KEY INFO` block of an AID dump: parsed key entries plus free-text notes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyInfo {
    pub keys: Vec<Record>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

/// One item of a list section.
///
/// Serialized untagged, so each variant keeps the JSON shape the legacy
/// converters produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Entry {
    /// Flat `{name, value}` pair.
    Attribute(Attribute),
    /// Algorithm-support row: positional attributes with fixed names.
    Row(Vec<Attribute>),
    /// Performance method record.
    Method(MethodRecord),
    /// `PACKAGE AID` table row.
    Package(PackageAid),
    /// `FULL PACKAGE AID` table row.
    FullPackage(FullPackageAid),
    /// Flat key/value record (TPM operation instance).
    Record(Record),
}

impl Entry {
    /// Returns the attribute if this entry is a flat attribute.
    pub fn as_attribute(&self) -> Option<&Attribute> {
        match self {
            Self::Attribute(attr) => Some(attr),
            _ => None,
        }
    }
}

/// Payload stored under one section name.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Section {
    /// Ordered list of entries; the common case.
    List(Vec<Entry>),
    /// Single structured key-info block.
    KeyInfo(KeyInfo),
}

impl Section {
    /// Returns list entries, or an empty slice for non-list payloads.
    pub fn entries(&self) -> &[Entry] {
        match self {
            Self::List(entries) => entries,
            Self::KeyInfo(_) => &[],
        }
    }

    /// Short name of the payload kind, used in diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::List(_) => "list",
            Self::KeyInfo(_) => "key-info",
        }
    }
}

/// Top-level conversion output: the report kind plus named sections in
/// first-insertion order.
///
/// Sections are added through [`ResultDocument::append`] and its helpers;
/// a repeated section name concatenates instead of overwriting.
///
/// # Examples
///
/// ```
/// use cardprofile_core::{Attribute, BASIC_INFO, Entry, ReportKind, ResultDocument};
///
/// let mut doc = ResultDocument::new(ReportKind::Tpm);
/// doc.push_entry(BASIC_INFO, Entry::Attribute(Attribute::new("Manufacturer", "INTC")));
///
/// let json = serde_json::to_value(&doc).unwrap();
/// assert_eq!(json["_type"], "tpm");
/// assert_eq!(json[BASIC_INFO][0]["value"], "INTC");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ResultDocument {
    pub(crate) kind: ReportKind,
    pub(crate) sections: Vec<(String, Section)>,
}

impl ResultDocument {
    /// Creates an empty document of the given kind.
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            sections: Vec::new(),
        }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Returns the section stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Section> {
        self.sections
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, section)| section)
    }

    /// Section names in output order.
    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn sections(&self) -> impl Iterator<Item = (&str, &Section)> {
        self.sections
            .iter()
            .map(|(name, section)| (name.as_str(), section))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

impl Serialize for ResultDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len() + 1))?;
        map.serialize_entry(TYPE_KEY, &self.kind)?;
        for (name, section) in &self.sections {
            map.serialize_entry(name, section)?;
        }
        map.end()
    }
}
