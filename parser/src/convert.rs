//! File and folder conversion workflows.
//!
//! Each input goes through load → dispatch → convert → exclude → write.
//! Failures are contained per file and reported in its [`FileOutcome`]; a
//! batch never aborts because one file is unreadable or unwritable.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use cardprofile_core::{ReportKind, ResultDocument, apply_exclusions};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::DEFAULT_DELIMITER;
use crate::detect::detect_report_kind;
use crate::error::{ConvertError, Result};
use crate::grammar::convert_groups;
use crate::output::{OutputFormat, render};
use crate::report::FileOutcome;
use crate::segment::load_groups;

/// Extension of input dumps picked up by folder conversion.
pub const INPUT_EXTENSION: &str = "csv";

/// Suffix of the default output folder for folder conversion.
pub const OUTPUT_DIR_SUFFIX: &str = "_parsed";

/// Resolved settings for one conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub delimiter: String,
    /// Attribute names removed from every converted document.
    pub exclusions: BTreeSet<String>,
    pub format: OutputFormat,
    /// Forces one grammar instead of detecting it from each path.
    pub kind_override: Option<ReportKind>,
    /// Parallel conversions; `None` picks a default from the CPU count.
    pub jobs: Option<usize>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER.to_string(),
            exclusions: BTreeSet::new(),
            format: OutputFormat::Json,
            kind_override: None,
            jobs: None,
        }
    }
}

impl ConvertOptions {
    /// Grammar used for `path`: the override if set, else detection.
    pub fn kind_for(&self, path: &Path) -> ReportKind {
        self.kind_override
            .unwrap_or_else(|| detect_report_kind(path))
    }
}

/// Converts one file into a filtered result document.
///
/// # Errors
///
/// Returns [`ConvertError::Read`] if the file cannot be read. Malformed
/// content never fails.
pub fn convert_file(path: &Path, options: &ConvertOptions) -> Result<ResultDocument> {
    let (document, _) = convert_counted(path, options.kind_for(path), options)?;
    Ok(document)
}

fn convert_counted(
    path: &Path,
    kind: ReportKind,
    options: &ConvertOptions,
) -> Result<(ResultDocument, usize)> {
    let groups = load_groups(path)?;
    let document = convert_groups(kind, &groups, &options.delimiter);
    let (document, excluded) = apply_exclusions(document, &options.exclusions);
    if excluded > 0 {
        info!(path = %path.display(), excluded, "Excluded attribute(s) by name");
    }
    Ok((document, excluded))
}

/// Renders `document` and writes it to `output`, creating parent folders.
pub fn write_document(
    document: &ResultDocument,
    output: &Path,
    format: OutputFormat,
) -> Result<()> {
    let rendered = render(document, format)?;
    let write_error = |source| ConvertError::Write {
        path: output.to_path_buf(),
        source,
    };
    if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(output, rendered).map_err(write_error)?;
    Ok(())
}

/// Converts `input` and writes the result to `output`.
pub fn convert_to(input: &Path, output: &Path, options: &ConvertOptions) -> FileOutcome {
    let kind = options.kind_for(input);
    info!(path = %input.display(), kind = %kind, "Processing file");

    let result = convert_counted(input, kind, options).and_then(|(document, excluded)| {
        write_document(&document, output, options.format)?;
        Ok((document.len(), excluded))
    });

    match result {
        Ok((sections, excluded)) => {
            info!(output = %output.display(), "Result saved");
            FileOutcome::succeeded(
                input.to_path_buf(),
                output.to_path_buf(),
                kind,
                sections,
                excluded,
            )
        }
        Err(err) => {
            warn!(path = %input.display(), error = %err, "Skipping file");
            FileOutcome::failed(input.to_path_buf(), kind, err)
        }
    }
}

/// Converts each file and writes the result next to it, with the extension
/// replaced by the output format's.
///
/// Outcomes are returned in input order.
pub fn process_files(paths: &[PathBuf], options: &ConvertOptions) -> Vec<FileOutcome> {
    run_parallel(options.jobs, paths, |input| {
        let output = input.with_extension(options.format.extension());
        convert_to(input, &output, options)
    })
}

/// Converts every `.csv` file under `source` into a mirrored tree.
///
/// Relative paths are kept below `output`, which defaults to
/// `./<source name>_parsed`. A missing source folder is logged and yields no
/// outcomes.
pub fn process_folder(
    source: &Path,
    output: Option<&Path>,
    options: &ConvertOptions,
) -> Vec<FileOutcome> {
    if !source.is_dir() {
        warn!(path = %source.display(), "Source folder does not exist");
        return Vec::new();
    }

    let output_root = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_output_dir(source));
    let inputs = collect_input_files(source);
    info!(
        source = %source.display(),
        output = %output_root.display(),
        files = inputs.len(),
        "Converting folder"
    );

    run_parallel(options.jobs, &inputs, |input| {
        let relative = input.strip_prefix(source).unwrap_or(input);
        let target = output_root
            .join(relative)
            .with_extension(options.format.extension());
        convert_to(input, &target, options)
    })
}

/// Default output folder for `source`: `./<name>_parsed` in the working
/// directory.
pub fn default_output_dir(source: &Path) -> PathBuf {
    let name = source
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .or_else(|| {
            source
                .canonicalize()
                .ok()?
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "profiles".to_string());
    PathBuf::from(format!("{name}{OUTPUT_DIR_SUFFIX}"))
}

/// Recursively collects files with a `.csv` extension (any case), sorted.
///
/// Symlinks are followed; link loops and unreadable entries are logged and
/// skipped.
pub fn collect_input_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "Skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.into_path();
        if path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(INPUT_EXTENSION))
        {
            files.push(path);
        } else {
            debug!(path = %path.display(), "Skipping non-csv file");
        }
    }

    files
}

fn run_parallel<T, F>(jobs: Option<usize>, items: &[T], convert: F) -> Vec<FileOutcome>
where
    T: Sync,
    F: Fn(&T) -> FileOutcome + Sync + Send,
{
    let jobs = jobs
        .filter(|jobs| *jobs > 0)
        .unwrap_or_else(|| default_parallel_jobs(items.len()));
    match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
        Ok(pool) => pool.install(|| items.par_iter().map(&convert).collect()),
        Err(err) => {
            warn!(error = %err, "Failed to build thread pool, converting sequentially");
            items.iter().map(convert).collect()
        }
    }
}

fn default_parallel_jobs(file_count: usize) -> usize {
    let cpu_count = std::thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(4);
    cpu_count.min(file_count.max(1))
}
