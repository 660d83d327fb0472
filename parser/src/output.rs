//! Output formatting for result documents and conversion reports.

use serde::Serialize;

use crate::error::Result;

/// Supported output formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty JSON, four-space indent, keys in insertion order.
    #[default]
    Json,
    Yaml,
}

impl OutputFormat {
    /// File extension written for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

/// Renders any serializable value in the requested format.
///
/// JSON output keeps non-ASCII characters as UTF-8 and ends without a
/// trailing newline, matching what the legacy converters wrote.
///
/// # Examples
///
/// ```
/// use cardprofile_core::{ReportKind, ResultDocument};
/// use cardprofile_parser::{OutputFormat, render};
///
/// let doc = ResultDocument::new(ReportKind::Tpm);
/// assert_eq!(render(&doc, OutputFormat::Json).unwrap(), "{\n    \"_type\": \"tpm\"\n}");
/// ```
pub fn render<T: Serialize + ?Sized>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
            value.serialize(&mut serializer)?;
            // serde_json only ever emits valid UTF-8.
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
        OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
    }
}

#[cfg(test)]
mod tests {
    use cardprofile_core::{Attribute, BASIC_INFO, Entry, ReportKind, ResultDocument};

    use super::*;

    fn sample() -> ResultDocument {
        let mut doc = ResultDocument::new(ReportKind::AlgSupport);
        doc.push_entry(BASIC_INFO, Entry::Attribute(Attribute::new("Card name", "Carte à puce")));
        doc
    }

    #[test]
    fn test_json_uses_four_space_indent_and_utf8() {
        let json = render(&sample(), OutputFormat::Json).unwrap();
        assert!(json.starts_with("{\n    \"_type\": \"javacard-algsupport\",\n    \"Basic information\": ["));
        assert!(json.contains("\"value\": \"Carte à puce\""));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn test_yaml_keeps_section_order() {
        let yaml = render(&sample(), OutputFormat::Yaml).unwrap();
        let type_pos = yaml.find("_type").unwrap();
        let basic_pos = yaml.find("Basic information").unwrap();
        assert!(type_pos < basic_pos);
        assert!(yaml.contains("javacard-algsupport"));
    }

    #[test]
    fn test_extension_per_format() {
        assert_eq!(OutputFormat::Json.extension(), "json");
        assert_eq!(OutputFormat::Yaml.extension(), "yaml");
    }
}
