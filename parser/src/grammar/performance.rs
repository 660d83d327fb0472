//! JavaCard performance benchmark dumps.
//!
//! After a basic-information preamble the dump is a sequence of sections.
//! Fixed-data sections open with a bare class name (`MESSAGE DIGEST`,
//! `AESKey`, ...). Variable-data sections open with
//! `<CLASS> - <ALG> - variable data - BEGIN` and close with a `- END` line.
//! Inside a section, each `method name:` line starts a method block that runs
//! until the next boundary and is reduced to one [`MethodRecord`].
//!
//! The scan is a cursor over the flattened lines; group boundaries carry no
//! meaning past the preamble.

use cardprofile_core::{BASIC_INFO, Entry, MethodRecord, Record, ReportKind, ResultDocument};
use tracing::debug;

use super::Grammar;
use crate::segment::LineGroup;
use crate::tokenize::{
    adjacent_pairs, attribute_from_tokens, colon_pairs, normalize_numeric, tokenize,
};

/// Line that ends the preamble when no section header comes first.
pub const END_OF_BASIC_INFO: &str = "JCSystem.getVersion()";

/// Suffix of variable-data section headers.
pub const VARIABLE_BEGIN: &str = " - variable data - BEGIN";

/// Marker closing the current section.
pub const SECTION_END: &str = " - END";

pub const METHOD_NAME: &str = "method name:";
pub const NO_SUCH_ALGORITHM: &str = "NO_SUCH_ALGORITHM";

/// Fixed-data section headers: algorithm classes followed by key classes.
pub const FIXED_SECTIONS: [&str; 22] = [
    "MESSAGE DIGEST",
    "RANDOM GENERATOR",
    "CIPHER",
    "SIGNATURE",
    "CHECKSUM",
    "UTIL",
    "SWALGS",
    "KEY PAIR",
    "KEYAGREEMENT",
    "AESKey",
    "DESKey",
    "KoreanSEEDKey",
    "DSAPrivateKey",
    "DSAPublicKey",
    "ECF2MPublicKey",
    "ECF2MPrivateKey",
    "ECFPPublicKey",
    "ECFPPrivateKey",
    "HMACKey",
    "RSAPrivateCRTKey",
    "RSAPrivateKey",
    "RSAPublicKey",
];

/// Classification of one line, in priority order.
#[derive(Debug, PartialEq, Eq)]
enum LineKind<'a> {
    Header(&'a str),
    SectionEnd,
    MethodName,
    Other,
}

fn classify(line: &str) -> LineKind<'_> {
    if let Some(name) = header_name(line) {
        LineKind::Header(name)
    } else if line.contains(SECTION_END) {
        LineKind::SectionEnd
    } else if line.starts_with(METHOD_NAME) {
        LineKind::MethodName
    } else {
        LineKind::Other
    }
}

/// Returns the section name if `line` is a section header.
///
/// `MESSAGE DIGEST - ALG_SHA - variable data - BEGIN` names the section
/// `MESSAGE DIGEST - ALG_SHA`; fixed headers name themselves.
fn header_name(line: &str) -> Option<&str> {
    if let Some(index) = line.find(VARIABLE_BEGIN) {
        return Some(&line[..index]);
    }
    FIXED_SECTIONS.contains(&line).then_some(line)
}

/// Scan position over the lines after the preamble.
#[derive(Debug)]
enum Cursor<'a> {
    /// Outside any section; method blocks are ignored.
    Idle,
    InSection(&'a str),
    /// Buffering a method block that belongs to `section`.
    InMethod {
        section: &'a str,
        lines: Vec<&'a str>,
    },
}

impl<'a> Cursor<'a> {
    fn section(&self) -> Option<&'a str> {
        match self {
            Cursor::Idle => None,
            Cursor::InSection(section) | Cursor::InMethod { section, .. } => Some(*section),
        }
    }

    /// Reduces an open method block into `doc`; other states have nothing
    /// to flush.
    fn close_method(self, doc: &mut ResultDocument, delimiter: &str) {
        let Cursor::InMethod { section, lines } = self else {
            return;
        };
        let record = reduce_method(&lines, delimiter);
        if record.is_empty() {
            debug!(section, "Dropping empty method block");
        } else {
            doc.push_entry(section, Entry::Method(record));
        }
    }
}

/// Grammar for `javacard-performance` dumps.
#[derive(Debug, Default, Clone, Copy)]
pub struct PerformanceGrammar;

impl Grammar for PerformanceGrammar {
    fn kind(&self) -> ReportKind {
        ReportKind::Performance
    }

    fn convert(&self, groups: &[LineGroup], delimiter: &str) -> ResultDocument {
        let lines: Vec<&str> = groups
            .iter()
            .flat_map(|group| group.iter().map(String::as_str))
            .collect();

        let mut doc = ResultDocument::new(ReportKind::Performance);
        let (basic, start) = parse_basic_info(&lines, delimiter);
        doc.extend_entries(BASIC_INFO, basic);

        let mut cursor = Cursor::Idle;
        for &line in &lines[start..] {
            cursor = match classify(line) {
                LineKind::Header(name) => {
                    cursor.close_method(&mut doc, delimiter);
                    debug!(section = name, "Entering section");
                    doc.ensure_list(name);
                    Cursor::InSection(name)
                }
                LineKind::SectionEnd => {
                    cursor.close_method(&mut doc, delimiter);
                    Cursor::Idle
                }
                LineKind::MethodName => match cursor.section() {
                    Some(section) => {
                        cursor.close_method(&mut doc, delimiter);
                        Cursor::InMethod {
                            section,
                            lines: vec![line],
                        }
                    }
                    None => {
                        debug!(line, "Ignoring method outside of a section");
                        Cursor::Idle
                    }
                },
                LineKind::Other => match cursor {
                    Cursor::InMethod { section, mut lines } => {
                        lines.push(line);
                        Cursor::InMethod { section, lines }
                    }
                    other => other,
                },
            };
        }
        cursor.close_method(&mut doc, delimiter);

        doc
    }
}

/// Collects preamble attributes and returns the index where the section scan
/// resumes: at the first header, or just past the `JCSystem.getVersion()`
/// line.
fn parse_basic_info(lines: &[&str], delimiter: &str) -> (Vec<Entry>, usize) {
    let mut entries = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if header_name(line).is_some() {
            return (entries, index);
        }
        if line.contains(END_OF_BASIC_INFO) {
            return (entries, index + 1);
        }
        if let Some(attr) = attribute_from_tokens(&tokenize(line, delimiter)) {
            entries.push(Entry::Attribute(attr));
        }
    }
    (entries, lines.len())
}

/// Reduces the buffered lines of one method block.
///
/// `NO_SUCH_ALGORITHM` marks the method unsupported and ends extraction. A
/// record that carries measurements and no explicit verdict is marked
/// supported.
fn reduce_method(lines: &[&str], delimiter: &str) -> MethodRecord {
    let mut record = MethodRecord::default();

    for line in lines {
        let tokens = tokenize(line, delimiter);
        if line.starts_with(METHOD_NAME) {
            if let Some(name) = tokens.get(1) {
                record.method_name = Some(name.to_string());
                record.data_length = tokens
                    .get(2)
                    .filter(|length| {
                        !length.is_empty() && length.bytes().all(|b| b.is_ascii_digit())
                    })
                    .map(|length| length.to_string());
            }
        } else if line.starts_with("measurement config:") {
            let config = pair_record(adjacent_pairs(&tokens, 1));
            if !config.is_empty() {
                record.measurement_config = Some(config);
            }
        } else if *line == NO_SUCH_ALGORITHM {
            record.supported = Some(false);
            break;
        } else if line.starts_with("baseline measurements") {
            record.baseline_measurements = Some(measurement_series(&tokens));
        } else if line.starts_with("baseline stats") {
            record.baseline_stats = Some(stats(&tokens));
        } else if line.starts_with("operation raw measurements") {
            record.operation_raw_measurements = Some(measurement_series(&tokens));
        } else if line.starts_with("operation stats") {
            record.operation_stats = Some(stats(&tokens));
        } else if line.starts_with("operation info:") {
            record.operation_info = Some(pair_record(adjacent_pairs(&tokens, 1)));
        }
    }

    if record.supported.is_none() && record.has_measurements() {
        record.supported = Some(true);
    }
    record
}

fn pair_record(pairs: Vec<(&str, &str)>) -> Record {
    pairs.into_iter().collect()
}

/// Numeric values after the label; anything that does not normalize is dropped.
fn measurement_series(tokens: &[&str]) -> Vec<String> {
    tokens
        .iter()
        .skip(1)
        .filter_map(|token| normalize_numeric(token))
        .collect()
}

fn stats(tokens: &[&str]) -> Record {
    colon_pairs(tokens, 1)
        .into_iter()
        .filter_map(|(key, value)| Some((key, normalize_numeric(value)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use cardprofile_core::Attribute;

    use super::*;
    use crate::grammar::convert_text;

    fn convert(text: &str) -> ResultDocument {
        convert_text(ReportKind::Performance, text, ";")
    }

    fn methods<'a>(doc: &'a ResultDocument, section: &str) -> Vec<&'a MethodRecord> {
        doc.get(section)
            .unwrap_or_else(|| panic!("missing section {section}"))
            .entries()
            .iter()
            .map(|entry| match entry {
                Entry::Method(method) => method,
                other => panic!("unexpected entry {other:?}"),
            })
            .collect()
    }

    #[test]
    fn test_no_such_algorithm_marks_unsupported() {
        let doc = convert("Card;X\n\nMESSAGE DIGEST\nmethod name:; ALG_SHA Foo()\nNO_SUCH_ALGORITHM\n");

        let found = methods(&doc, "MESSAGE DIGEST");
        assert_eq!(found.len(), 1);
        assert_eq!(
            *found[0],
            MethodRecord {
                method_name: Some("ALG_SHA Foo()".to_string()),
                supported: Some(false),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_explicit_unsupported_wins_over_measurements() {
        let doc = convert(
            "CIPHER\nmethod name:; ALG_DES Cipher_update()\nbaseline measurements (ms):;1,5;2,0\nNO_SUCH_ALGORITHM\noperation stats (ms/op):;avg op:;1.0\n",
        );

        let method = methods(&doc, "CIPHER")[0];
        assert_eq!(method.supported, Some(false));
        assert_eq!(
            method.baseline_measurements,
            Some(vec!["1.5".to_string(), "2.0".to_string()])
        );
        assert_eq!(method.operation_stats, None);
    }

    #[test]
    fn test_fixed_section_method_with_measurements() {
        let doc = convert(concat!(
            "Card name;Test card\nJCSystem.getVersion();0300\n\n",
            "MESSAGE DIGEST\n",
            "method name:; ALG_SHA MessageDigest_doFinal()\n",
            "measurement config:;appletPrepareINS;34;appletMeasureINS;41;config;00 15 00 01\n",
            "baseline measurements (ms):;27,00;7,00;CHECK;9.00;\n",
            "baseline stats (ms):;avg:;11,80;min:;7,00;max:;CHECK;;;CHECK\n",
            "operation raw measurements (ms):;1,05;0,96\n",
            "operation stats (ms/op):;avg op:;1.05;min op:;0.96;max op:;1.38;;CHECK\n",
            "operation info:;data length;256;total iterations;250;total invocations;250;\n",
        ));

        assert_eq!(doc.section_names(), vec![BASIC_INFO, "MESSAGE DIGEST"]);
        assert_eq!(
            doc.get(BASIC_INFO).unwrap().entries(),
            &[Entry::Attribute(Attribute::new("Card name", "Test card"))]
        );

        let method = methods(&doc, "MESSAGE DIGEST")[0];
        assert_eq!(method.supported, Some(true));
        assert_eq!(method.data_length, None);
        assert_eq!(
            method.measurement_config.as_ref().unwrap().get("config"),
            Some("00 15 00 01")
        );
        assert_eq!(
            method.baseline_measurements,
            Some(vec!["27.00".to_string(), "7.00".to_string(), "9.00".to_string()])
        );
        let baseline = method.baseline_stats.as_ref().unwrap();
        assert_eq!(
            baseline.iter().collect::<Vec<_>>(),
            vec![("avg", "11.80"), ("min", "7.00")]
        );
        assert_eq!(method.operation_stats.as_ref().unwrap().get("max op"), Some("1.38"));
        assert_eq!(
            method.operation_info.as_ref().unwrap().get("total invocations"),
            Some("250")
        );
    }

    #[test]
    fn test_variable_sections_with_data_length() {
        let doc = convert(concat!(
            "Card;X\n\n",
            "MESSAGE DIGEST - ALG_SHA - variable data - BEGIN\n",
            "method name:; ALG_SHA MessageDigest_doFinal();16;\n",
            "operation stats (ms/op):;avg op:;0,5\n",
            "method name:; ALG_SHA MessageDigest_doFinal();abc;\n",
            "operation stats (ms/op):;avg op:;0,7\n",
            "MESSAGE DIGEST - ALG_SHA - END\n",
            "method name:; orphan()\n",
        ));

        assert_eq!(
            doc.section_names(),
            vec![BASIC_INFO, "MESSAGE DIGEST - ALG_SHA"]
        );
        let found = methods(&doc, "MESSAGE DIGEST - ALG_SHA");
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].data_length.as_deref(), Some("16"));
        assert_eq!(found[1].data_length, None);
        assert_eq!(found[1].operation_stats.as_ref().unwrap().get("avg op"), Some("0.7"));
    }

    #[test]
    fn test_header_without_methods_is_kept_and_repeats_merge() {
        let doc = convert(concat!(
            "UTIL\n\n",
            "CIPHER\nmethod name:; A()\nNO_SUCH_ALGORITHM\n\n",
            "SIGNATURE\n\n",
            "CIPHER\nmethod name:; B()\nNO_SUCH_ALGORITHM\n",
        ));

        assert_eq!(
            doc.section_names(),
            vec![BASIC_INFO, "UTIL", "CIPHER", "SIGNATURE"]
        );
        assert!(doc.get("UTIL").unwrap().entries().is_empty());
        let names: Vec<_> = methods(&doc, "CIPHER")
            .iter()
            .map(|method| method.method_name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["A()", "B()"]);
    }

    #[test]
    fn test_lines_outside_method_blocks_are_ignored() {
        let doc = convert("Card;X\nJCSystem.getVersion();0300\nmethod name:; early()\n\nKEY PAIR\nstray;line\n");

        assert_eq!(doc.section_names(), vec![BASIC_INFO, "KEY PAIR"]);
        assert!(doc.get("KEY PAIR").unwrap().entries().is_empty());
    }

    #[test]
    fn test_classification_priority() {
        assert_eq!(
            classify("CIPHER - ALG_AES - variable data - BEGIN"),
            LineKind::Header("CIPHER - ALG_AES")
        );
        assert_eq!(classify("AESKey"), LineKind::Header("AESKey"));
        assert_eq!(classify("CIPHER - ALG_AES - END"), LineKind::SectionEnd);
        assert_eq!(classify("method name:; X()"), LineKind::MethodName);
        assert_eq!(classify("AESKey;128"), LineKind::Other);
    }
}
