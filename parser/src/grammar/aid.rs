//! JavaCard AID / package support dumps.
//!
//! Lines are first partitioned by literal section markers into per-section
//! buffers, then each buffer is parsed on its own. Card info and card data
//! blocks fold into "Basic information".

use cardprofile_core::{
    BASIC_INFO, Entry, FullPackageAid, KeyInfo, PackageAid, Record, ReportKind, ResultDocument,
    Section,
};
use tracing::debug;

use super::Grammar;
use crate::segment::LineGroup;
use crate::tokenize::{attribute_from_tokens, tokenize};

pub const KEY_INFO: &str = "Key info";
pub const PACKAGE_AID: &str = "Package AID";
pub const FULL_PACKAGE_AID: &str = "Full package AID support";

/// Prefix of decorative banner lines.
const BANNER: &str = "*****";
/// Prefix of key entries inside the key-info block.
const KEY_ENTRY: &str = "VER;";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AidSection {
    Basic,
    CardInfo,
    CardData,
    KeyInfo,
    PackageAid,
    FullPackageAid,
}

/// Section markers, checked in order against the start of each line.
const MARKERS: [(&str, AidSection); 5] = [
    ("***** Card info", AidSection::CardInfo),
    ("***** CARD DATA", AidSection::CardData),
    ("***** KEY INFO", AidSection::KeyInfo),
    ("PACKAGE AID;", AidSection::PackageAid),
    ("FULL PACKAGE AID;", AidSection::FullPackageAid),
];

fn marker_section(line: &str) -> Option<AidSection> {
    MARKERS
        .iter()
        .find(|(prefix, _)| line.starts_with(*prefix))
        .map(|(_, section)| *section)
}

#[derive(Debug, Default)]
struct Buffers<'a> {
    basic: Vec<&'a str>,
    key_info: Vec<&'a str>,
    packages: Vec<&'a str>,
    full_packages: Vec<&'a str>,
}

impl<'a> Buffers<'a> {
    fn partition(groups: &'a [LineGroup]) -> Self {
        let mut buffers = Self::default();
        let mut current = AidSection::Basic;

        for line in groups.iter().flat_map(|group| group.iter()) {
            if let Some(section) = marker_section(line) {
                debug!(?section, "Entering section");
                current = section;
                continue;
            }
            let buffer = match current {
                AidSection::Basic | AidSection::CardInfo | AidSection::CardData => {
                    &mut buffers.basic
                }
                AidSection::KeyInfo => &mut buffers.key_info,
                AidSection::PackageAid => &mut buffers.packages,
                AidSection::FullPackageAid => &mut buffers.full_packages,
            };
            buffer.push(line.as_str());
        }

        buffers
    }
}

/// Grammar for `javacard-aid` dumps.
#[derive(Debug, Default, Clone, Copy)]
pub struct AidGrammar;

impl Grammar for AidGrammar {
    fn kind(&self) -> ReportKind {
        ReportKind::Aid
    }

    fn convert(&self, groups: &[LineGroup], delimiter: &str) -> ResultDocument {
        let buffers = Buffers::partition(groups);
        let mut doc = ResultDocument::new(ReportKind::Aid);

        doc.extend_entries(BASIC_INFO, parse_basic(&buffers.basic, delimiter));

        if !buffers.key_info.is_empty() {
            doc.append(KEY_INFO, Section::KeyInfo(parse_key_info(&buffers.key_info)));
        }
        if !buffers.packages.is_empty() {
            doc.extend_entries(PACKAGE_AID, parse_packages(&buffers.packages, delimiter));
        }
        if !buffers.full_packages.is_empty() {
            doc.extend_entries(
                FULL_PACKAGE_AID,
                parse_full_packages(&buffers.full_packages, delimiter),
            );
        }

        doc
    }
}

fn parse_basic(lines: &[&str], delimiter: &str) -> Vec<Entry> {
    lines
        .iter()
        .filter(|line| !line.is_empty() && !line.starts_with(BANNER) && !line.starts_with("http"))
        .filter_map(|line| {
            let tokens = tokenize(line, delimiter);
            let attr = attribute_from_tokens(&tokens)?;
            (!attr.name.is_empty()).then_some(Entry::Attribute(attr))
        })
        .collect()
}

fn parse_key_info(lines: &[&str]) -> KeyInfo {
    let mut info = KeyInfo::default();

    for line in lines.iter().filter(|line| !line.is_empty()) {
        if line.starts_with(KEY_ENTRY) {
            let record = parse_key_entry(line);
            if !record.is_empty() {
                info.keys.push(record);
            }
        } else if line.starts_with(BANNER) || line.starts_with("PACKAGE AID") {
            break;
        } else {
            info.notes.push(line.to_string());
        }
    }

    info
}

/// Parses `VER;255 ID;1 TYPE;DES3 LEN;16` into an ordered record.
fn parse_key_entry(line: &str) -> Record {
    line.split(' ')
        .filter_map(|pair| {
            let mut parts = pair.split(';');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) => Some((key.trim(), value.trim())),
                _ => None,
            }
        })
        .collect()
}

fn parse_packages(lines: &[&str], delimiter: &str) -> Vec<Entry> {
    let mut rows = Vec::new();
    for line in lines.iter().filter(|line| !line.is_empty()) {
        if line.starts_with("FULL PACKAGE AID;") || line.starts_with(BANNER) {
            break;
        }
        let tokens = tokenize(line, delimiter);
        if let [aid, major, minor, name, api, ..] = tokens.as_slice() {
            rows.push(Entry::Package(PackageAid {
                package_aid: aid.to_string(),
                major_version: major.to_string(),
                minor_version: minor.to_string(),
                package_name: name.to_string(),
                jc_api_version: api.to_string(),
            }));
        }
    }
    rows
}

fn parse_full_packages(lines: &[&str], delimiter: &str) -> Vec<Entry> {
    lines
        .iter()
        .filter_map(|line| {
            let tokens = tokenize(line, delimiter);
            let [aid, supported, name, ..] = tokens.as_slice() else {
                return None;
            };
            Some(Entry::FullPackage(FullPackageAid {
                full_package_aid: aid.to_string(),
                supported: supported.eq_ignore_ascii_case("yes"),
                package_name_version: name.to_string(),
            }))
        })
        .collect()
}
