use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use log::{error, info};
use std::path::PathBuf;
use std::time::Instant;

use embedscan::config::ProjectConfig;
use embedscan::core::{
    EmbeddingQuery, Excludes, ImportResolver, MarkerType, Program, ProgramOptions, SourceRoot,
};
use embedscan::error::AnalysisError;
use embedscan::formatters::{AnalysisReport, JsonReportFormatter, TextFormatter};

#[derive(Debug, Clone, Parser)]
#[command(
    name = "embedscan",
    version,
    author = "embedscan developers",
    about = "Finds Go types embedding a marker type, directly or transitively"
)]
struct Cli {
    /// Root directory of the Go sources to analyze
    #[arg(short, long, value_name = "PATH")]
    input: PathBuf,

    /// Marker type as <import/path>.<TypeName>
    #[arg(short, long, value_name = "TYPE")]
    marker: Option<String>,

    /// Packages to process, by name or import path (default: all)
    #[arg(short, long = "package", value_name = "PKG", value_delimiter = ',')]
    packages: Vec<String>,

    /// Comma-separated base-name glob patterns to skip
    #[arg(short = 'x', long = "exclude", value_name = "GLOBS", value_delimiter = ',')]
    excludes: Vec<String>,

    /// Project file with [build] and [analysis] sections
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Go toolchain used to look up package names of imports
    #[arg(long, value_name = "CMD")]
    go: Option<String>,

    /// Directory logical import paths are measured from
    #[arg(long, value_name = "DIR")]
    source_root: Option<PathBuf>,

    /// Import path prefix of the source root, e.g. the module path
    #[arg(long, value_name = "PATH")]
    import_prefix: Option<String>,

    /// Emit results even when some directories failed to load
    #[arg(long)]
    allow_partial: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let start_time = Instant::now();

    let config = match &cli.config {
        Some(path) => {
            info!("Reading project file: {}", path.display());
            ProjectConfig::load(path)?
        }
        None => ProjectConfig::default(),
    };

    let excludes = if cli.excludes.is_empty() {
        config.excludes()
    } else {
        cli.excludes.clone()
    };
    let mut options = ProgramOptions::default().with_excludes(Excludes::new(&excludes)?);

    let source_root_dir = cli
        .source_root
        .clone()
        .or_else(|| config.analysis.source_root.clone());
    let import_prefix = cli
        .import_prefix
        .clone()
        .or_else(|| config.analysis.import_prefix.clone());
    if source_root_dir.is_some() || import_prefix.is_some() {
        options = options.with_source_root(SourceRoot::new(
            source_root_dir.unwrap_or_else(|| cli.input.clone()),
            import_prefix.unwrap_or_default(),
        ));
    }

    info!("Loading Go sources from {}", cli.input.display());
    let (mut program, mut errors) = Program::load(&cli.input, &options)?;
    info!(
        "Loaded {} packages in {:.2}s",
        program.packages().len(),
        start_time.elapsed().as_secs_f64()
    );

    let go_command = cli
        .go
        .clone()
        .or_else(|| config.analysis.go_command.clone())
        .unwrap_or_else(|| "go".to_string());
    let resolver = ImportResolver::with_go_command(go_command);

    let selected = if cli.packages.is_empty() {
        config.analysis.packages.clone()
    } else {
        cli.packages.clone()
    };
    if selected.is_empty() {
        errors.extend(program.process_all(&resolver));
    } else {
        for selector in &selected {
            match program.process(selector, &resolver) {
                Ok(degraded) => errors.extend(degraded),
                Err(err) => errors.push(err),
            }
        }
    }
    info!(
        "Resolved {} import paths ({} toolchain lookups)",
        resolver.cache_len(),
        resolver.external_lookups()
    );

    let mut report = AnalysisReport::new(&program);
    if let Some(raw) = cli.marker.as_ref().or(config.analysis.marker.as_ref()) {
        let marker: MarkerType = raw.parse()?;
        let matches = EmbeddingQuery::new(&program).find_types_embedding(&marker);
        info!("{} types embed {}", matches.len(), marker);
        report = report.with_matches(marker, matches);
    }

    report_errors(&errors);
    if !cli.allow_partial && errors.iter().any(|err| !err.is_degradation()) {
        bail!(
            "{} problem(s) found while analyzing {}; rerun with --allow-partial to emit partial results",
            errors.len(),
            cli.input.display()
        );
    }

    let rendered = match cli.format {
        OutputFormat::Text => TextFormatter::new().format_report(&report)?,
        OutputFormat::Json => JsonReportFormatter::new().format_report(&report)?,
    };
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Generated {}", path.display());
        }
        None => print!("{rendered}"),
    }

    info!(
        "Total execution time: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

/// All problems at once, so they can be fixed in one pass
fn report_errors(errors: &[AnalysisError]) {
    if errors.is_empty() {
        return;
    }
    let messages: Vec<String> = errors.iter().map(|err| err.to_string()).collect();
    error!("{} problem(s):\n\t{}", errors.len(), messages.join("\n\t"));
}
