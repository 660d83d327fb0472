use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use cardprofile_core::apply_exclusions;
use cardprofile_parser::{
    AUTO_KIND, ConvertConfig, ConvertOptions, FileOutcome, OutputFormat, build_report_bundle,
    convert_text, process_files, process_folder, render,
};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "profile-convert", version)]
#[command(about = "Convert smartcard and TPM test-report logs into JSON")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert files and write each result next to its input.
    Files(FilesArgs),
    /// Convert every .csv file under a folder into a mirrored output tree.
    Folder(FolderArgs),
    /// Convert a log read from stdin and print the result to stdout.
    ParseStdin,
}

/// Options shared by every subcommand. Flags override the config file.
#[derive(Debug, Args)]
struct CommonArgs {
    /// Field delimiter (default: ";").
    #[arg(short, long, global = true)]
    delimiter: Option<String>,
    /// File with attribute names to exclude, one per line.
    #[arg(short = 'x', long, global = true)]
    exclude_file: Option<PathBuf>,
    /// Output format (default: json).
    #[arg(long, global = true)]
    format: Option<OutputFormat>,
    /// Report kind: "auto" to detect from the path, or a label such as "tpm".
    #[arg(long, global = true)]
    kind: Option<String>,
    /// Number of parallel conversions (default: number of CPUs).
    #[arg(long, global = true)]
    jobs: Option<usize>,
    /// Write a JSON conversion report to this path.
    #[arg(long, global = true)]
    report: Option<PathBuf>,
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Args)]
struct FilesArgs {
    /// Log files to convert.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct FolderArgs {
    /// Folder searched recursively for .csv files.
    source: PathBuf,
    /// Output folder (default: ./<source name>_parsed).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.common.verbose, cli.common.quiet);

    let result = resolve_options(&cli.common).and_then(|options| match cli.command {
        Command::Files(args) => run_files(args, &options, cli.common.report.as_deref()),
        Command::Folder(args) => run_folder(args, &options, cli.common.report.as_deref()),
        Command::ParseStdin => run_parse_stdin(&options),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the config file (if any), applies flag overrides and validates.
fn resolve_options(common: &CommonArgs) -> Result<ConvertOptions, String> {
    let mut config = match &common.config {
        Some(path) => ConvertConfig::load(path).map_err(|err| err.to_string())?,
        None => ConvertConfig::default(),
    };

    if let Some(delimiter) = &common.delimiter {
        config.delimiter = delimiter.clone();
    }
    if let Some(path) = &common.exclude_file {
        config.exclude_file = Some(path.clone());
    }
    if let Some(format) = common.format {
        config.format = format;
    }
    if let Some(kind) = &common.kind {
        config.kind = kind.clone();
    }
    if let Some(jobs) = common.jobs {
        config.jobs = Some(jobs);
    }

    config.into_options().map_err(|err| err.to_string())
}

fn run_files(
    args: FilesArgs,
    options: &ConvertOptions,
    report: Option<&Path>,
) -> Result<(), String> {
    let outcomes = process_files(&args.files, options);
    finish_batch(outcomes, report)
}

fn run_folder(
    args: FolderArgs,
    options: &ConvertOptions,
    report: Option<&Path>,
) -> Result<(), String> {
    if !args.source.is_dir() {
        return Err(format!(
            "source folder '{}' does not exist",
            args.source.display()
        ));
    }
    let outcomes = process_folder(&args.source, args.output.as_deref(), options);
    if outcomes.is_empty() {
        warn!(source = %args.source.display(), "No .csv files found");
    }
    finish_batch(outcomes, report)
}

fn run_parse_stdin(options: &ConvertOptions) -> Result<(), String> {
    let kind = options
        .kind_override
        .ok_or_else(|| format!("parse-stdin requires --kind other than '{AUTO_KIND}'"))?;

    let mut text = Vec::new();
    std::io::stdin()
        .read_to_end(&mut text)
        .map_err(|err| format!("Failed to read stdin: {err}"))?;
    let text = String::from_utf8_lossy(&text);

    let document = convert_text(kind, &text, &options.delimiter);
    let (document, _) = apply_exclusions(document, &options.exclusions);
    let rendered = render(&document, options.format).map_err(|err| err.to_string())?;
    println!("{rendered}");
    Ok(())
}

/// Writes the optional report and fails if any file failed.
fn finish_batch(outcomes: Vec<FileOutcome>, report: Option<&Path>) -> Result<(), String> {
    let bundle = build_report_bundle(PACKAGE_VERSION, outcomes);
    info!(
        converted = bundle.success_count(),
        failed = bundle.failures.len(),
        "Processing completed"
    );

    if let Some(path) = report {
        let rendered = render(&bundle, OutputFormat::Json).map_err(|err| err.to_string())?;
        fs::write(path, rendered)
            .map_err(|err| format!("Failed to write report '{}': {err}", path.display()))?;
    }

    if bundle.failures.is_empty() {
        Ok(())
    } else {
        let failed: Vec<String> = bundle
            .failures
            .iter()
            .map(|path| path.display().to_string())
            .collect();
        Err(format!(
            "{} file(s) failed: {}",
            failed.len(),
            failed.join(", ")
        ))
    }
}
