//! Conversion configuration and exclusion lists.
//!
//! Defines the YAML-serializable configuration shared by the CLI and batch
//! conversions. Every field is optional in the file; command-line flags
//! override whatever the file sets.
//!
//! # Example YAML
//!
//! ```yaml
//! delimiter: ";"
//! format: json
//! kind: auto
//! jobs: 4
//! exclude_file: exclusions.txt
//! exclude:
//!   - Card ATR
//!   - ICSerialNumber
//! ```

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use cardprofile_core::ReportKind;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::convert::ConvertOptions;
use crate::error::{ConvertError, Result};
use crate::output::OutputFormat;

/// Default field delimiter of every supported log family.
pub const DEFAULT_DELIMITER: &str = ";";

/// Spelling of the kind setting that enables path-based detection.
pub const AUTO_KIND: &str = "auto";

/// Top-level conversion configuration.
///
/// # Examples
///
/// ```
/// use cardprofile_parser::ConvertConfig;
///
/// let config: ConvertConfig = serde_yaml::from_str("delimiter: \",\"\nkind: tpm\n").unwrap();
/// let options = config.into_options().unwrap();
/// assert_eq!(options.delimiter, ",");
/// assert!(options.kind_override.is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Field delimiter; must not be empty.
    pub delimiter: String,
    /// File listing attribute names to drop, one per line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_file: Option<PathBuf>,
    /// Attribute names to drop, in addition to `exclude_file`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    pub format: OutputFormat,
    /// `auto` or a report-kind label such as `tpm`.
    pub kind: String,
    /// Parallel conversions; unset means available parallelism.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            exclude_file: None,
            exclude: Vec::new(),
            format: OutputFormat::default(),
            kind: AUTO_KIND.to_string(),
            jobs: None,
        }
    }
}

impl ConvertConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Read`] if the file cannot be opened, or
    /// [`ConvertError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ConvertError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = serde_yaml::from_reader(BufReader::new(file))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| ConvertError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::to_writer(BufWriter::new(file), self)?;
        Ok(())
    }

    /// Parses the `kind` setting; `auto` yields `None`.
    pub fn kind_override(&self) -> Result<Option<ReportKind>> {
        if self.kind.trim().eq_ignore_ascii_case(AUTO_KIND) {
            return Ok(None);
        }
        self.kind
            .parse()
            .map(Some)
            .map_err(|err| ConvertError::Config(format!("{err}")))
    }

    /// Validates the configuration and resolves it into conversion options,
    /// loading the exclusion file if one is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::Config`] for an empty delimiter, an unknown
    /// kind or `jobs: 0`, and [`ConvertError::Read`] if the exclusion file
    /// cannot be read.
    pub fn into_options(self) -> Result<ConvertOptions> {
        if self.delimiter.is_empty() {
            return Err(ConvertError::Config("delimiter must not be empty".to_string()));
        }
        if self.jobs == Some(0) {
            return Err(ConvertError::Config("jobs must be at least 1".to_string()));
        }
        let kind_override = self.kind_override()?;

        let mut exclusions: BTreeSet<String> = self
            .exclude
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        if let Some(path) = &self.exclude_file {
            exclusions.extend(load_exclusions(path)?);
        }

        Ok(ConvertOptions {
            delimiter: self.delimiter,
            exclusions,
            format: self.format,
            kind_override,
            jobs: self.jobs,
        })
    }
}

/// Loads attribute names to exclude, one per line.
///
/// Blank lines and lines starting with `#` are ignored; names are trimmed.
pub fn load_exclusions(path: &Path) -> Result<BTreeSet<String>> {
    let text = fs::read_to_string(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let excluded: BTreeSet<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect();
    info!(path = %path.display(), count = excluded.len(), "Loaded excluded properties");
    Ok(excluded)
}
