//! treemirror - Mirror a directory tree as plain-text copies.
//!
//! Usage:
//!   treemirror SOURCE DEST            Mirror SOURCE into DEST
//!   treemirror SOURCE DEST --dry-run  Show what would be copied
//!   treemirror --config FILE          Take roots and skip sets from FILE
//!   treemirror --help                 Show help

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result, bail, eyre};
use tracing_subscriber::EnvFilter;

use treemirror_core::{ConfigFile, MirrorConfig, MirrorReport, NewlineMode, SkipRules};
use treemirror_ops::TreeMirror;

#[derive(Parser)]
#[command(
    name = "treemirror",
    version,
    about = "Mirror a directory tree as plain-text copies",
    long_about = "treemirror copies every text file of a source tree into a destination \
                  tree, keeping the directory layout and renaming each file to `.txt`.\n\n\
                  Dependency, build and platform folders, binary assets and lockfiles are \
                  skipped by default; see --no-default-skips."
)]
struct Cli {
    /// Directory tree to mirror (overrides `sourceRoot` from the config file)
    source: Option<PathBuf>,

    /// Destination root (overrides `destRoot` from the config file)
    dest: Option<PathBuf>,

    /// TOML config file (defaults to <config dir>/treemirror/config.toml if present)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Additional directory name to skip (repeatable)
    #[arg(long = "skip-dir", value_name = "NAME")]
    skip_dirs: Vec<String>,

    /// Additional file suffix to skip, e.g. ".lock" (repeatable)
    #[arg(long = "skip-ext", value_name = "SUFFIX")]
    skip_extensions: Vec<String>,

    /// Additional exact file name to skip (repeatable)
    #[arg(long = "skip-file", value_name = "NAME")]
    skip_files: Vec<String>,

    /// Start from empty skip sets instead of the built-in project preset
    #[arg(long)]
    no_default_skips: bool,

    /// Extension given to mirrored files
    #[arg(short, long, value_name = "EXT")]
    marker: Option<String>,

    /// Line ending treatment
    #[arg(long, value_enum)]
    newline: Option<NewlineArg>,

    /// Walk and filter without writing anything
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Summary output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Exit with an error if any file failed to mirror
    #[arg(long)]
    strict: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NewlineArg {
    Preserve,
    Lf,
}

impl From<NewlineArg> for NewlineMode {
    fn from(arg: NewlineArg) -> Self {
        match arg {
            NewlineArg::Preserve => Self::Preserve,
            NewlineArg::Lf => Self::Lf,
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli)?;
    tracing::debug!(?config, "resolved configuration");
    let report = TreeMirror::new(config).run().context("Mirror failed")?;

    match cli.format {
        OutputFormat::Text => print_summary(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if cli.strict && !report.is_success() {
        bail!("{} file(s) failed to mirror", report.failure_count());
    }

    Ok(())
}

/// Install the stderr log subscriber. `RUST_LOG` takes precedence over flags.
fn init_logging(verbose: u8, quiet: bool) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Layer CLI arguments over the config file over the built-in preset.
fn build_config(cli: &Cli) -> Result<MirrorConfig> {
    let file = match &cli.config {
        Some(path) => Some(
            ConfigFile::load(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?,
        ),
        None => ConfigFile::load_default().context("Failed to load default config file")?,
    }
    .unwrap_or_default();

    let base = if cli.no_default_skips {
        SkipRules::new()
    } else {
        SkipRules::project_defaults()
    };
    let skip = file
        .skip_rules(base)
        .with_dirs(cli.skip_dirs.iter().cloned())
        .with_extensions(cli.skip_extensions.iter().cloned())
        .with_files(cli.skip_files.iter().cloned());

    let source = cli
        .source
        .clone()
        .or_else(|| file.source_root.clone())
        .ok_or_else(|| eyre!("No source root: pass SOURCE or set `sourceRoot` in the config"))?;
    let dest = cli
        .dest
        .clone()
        .or_else(|| file.dest_root.clone())
        .ok_or_else(|| eyre!("No destination root: pass DEST or set `destRoot` in the config"))?;

    let mut builder = MirrorConfig::builder();
    builder
        .source_root(source)
        .dest_root(dest)
        .skip(skip)
        .dry_run(cli.dry_run);
    if let Some(marker) = cli.marker.clone().or_else(|| file.marker_extension.clone()) {
        builder.marker_extension(marker);
    }
    if let Some(newline) = cli.newline.map(NewlineMode::from).or(file.newline) {
        builder.newline(newline);
    }

    builder.build().context("Invalid configuration")
}

/// Print a human-readable run summary.
fn print_summary(report: &MirrorReport) {
    println!();
    println!("{}", "─".repeat(60));
    println!(
        " {} -> {}",
        report.source_root.display(),
        report.dest_root.display()
    );
    println!(" {}", report.summary());
    if !report.dry_run {
        println!(
            " {} written in {:.2}s",
            format_size(report.bytes_written),
            report.duration.as_secs_f64()
        );
    }
    println!("{}", "─".repeat(60));

    if !report.collisions.is_empty() {
        println!();
        println!(" {} output file(s) overwritten by a same-stem file:", report.collisions.len());
        for path in &report.collisions {
            println!("   {}", path.display());
        }
    }

    if !report.failures.is_empty() {
        println!();
        println!(" {} file(s) could not be mirrored:", report.failure_count());
        for failure in &report.failures {
            println!("   {failure}");
        }
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
