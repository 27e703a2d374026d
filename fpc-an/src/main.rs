//! Fingerprint change analysis (fpc-an) - Main entry point
//!
//! Compares the three fingerprints of one capture folder, prints the raw and
//! points-weighted change and appends them to the results history.
//!
//! **Usage:**
//! ```bash
//! fpc-an <SOURCE> [--root-folder DIR] [--pointsystem FILE] [--results FILE] \
//!        [--export FILE] [--no-save] [--debug]
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use fpc_an::engine::DiffOptions;
use fpc_an::loader::{load_triple, load_weight_table};
use fpc_an::{browser_and_pv, AnalysisReport, Analyzer, CliFormatter, ResultsHistory};
use fpc_common::config::{
    find_toml_config, resolve_root_folder, LoggingConfig, RootFolder, ROOT_FOLDER_ENV,
};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{error, info};

/// Command-line arguments for fpc-an
#[derive(Parser, Debug)]
#[command(name = "fpc-an")]
#[command(about = "Analyze fingerprint changes within and between browser sessions")]
#[command(version)]
struct Args {
    /// Folder holding fingerprint_1, fingerprint_2 and fingerprint_3 (.../<pv>/<browser>)
    source: PathBuf,

    /// Root folder containing Pointsystem/ and results/
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Weight table (default: <root>/Pointsystem/pointsystem.json)
    #[arg(long, value_name = "FILE")]
    pointsystem: Option<PathBuf>,

    /// Results history (default: <root>/results/analysis_results.json)
    #[arg(long, value_name = "FILE")]
    results: Option<PathBuf>,

    /// Export the full analysis to a JSON file
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Do not append this run to the results history
    #[arg(long)]
    no_save: bool,

    /// Print both diffs and log at debug level
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = find_toml_config(args.config.as_deref()).context("Failed to load config")?;
    init_logging(&loaded.config.logging, args.debug)?;
    loaded.log_source();
    let config = loaded.config;

    if !args.source.is_dir() {
        anyhow::bail!("Source path does not exist: {}", args.source.display());
    }

    let root = RootFolder::new(resolve_root_folder(
        args.root_folder.as_deref(),
        ROOT_FOLDER_ENV,
        &config,
    ));
    let pointsystem_path = args
        .pointsystem
        .clone()
        .unwrap_or_else(|| config.pointsystem_path(&root));
    let results_path = args
        .results
        .clone()
        .unwrap_or_else(|| config.results_path(&root));

    info!("Root folder: {}", root.path().display());

    let table = load_weight_table(&pointsystem_path)
        .with_context(|| format!("Failed to load weight table {}", pointsystem_path.display()))?;

    let analyzer = Analyzer::new(DiffOptions::from(&config.media));
    let triple = load_triple(&args.source, analyzer.options())
        .with_context(|| format!("Failed to load fingerprints from {}", args.source.display()))?;

    let analysis = analyzer
        .analyze(&triple, &table)
        .context("Fingerprint analysis failed")?;

    if args.debug {
        println!("{}", CliFormatter::format_debug(&analysis));
    }
    println!("{}", CliFormatter::format_outcome(&analysis.outcome));

    let location = browser_and_pv(&args.source);

    if let Some(export_path) = &args.export {
        let mut report = AnalysisReport::new(&args.source, analysis.clone());
        if let Ok((browser, pv)) = &location {
            report = report.with_browser_and_pv(browser, pv);
        }
        match report.export_json(export_path) {
            Ok(()) => println!("\n✓ Results exported to: {}", export_path.display()),
            Err(e) => error!("Failed to export results: {}", e),
        }
    }

    if args.no_save {
        return Ok(());
    }

    let (browser, pv) = location.context("Cannot record results")?;
    let mut history = ResultsHistory::load(&results_path)
        .with_context(|| format!("Failed to read results {}", results_path.display()))?;
    let entry = history.record(&browser, &pv, &analysis.outcome);
    info!(
        browser = %browser,
        pv = %pv,
        runs = entry.runs(),
        pointsystem_average = entry.pointsystem_average,
        raw_average = entry.raw_average,
        "Recorded analysis result"
    );
    history
        .save(&results_path)
        .with_context(|| format!("Failed to write results {}", results_path.display()))?;

    Ok(())
}

/// Install the tracing subscriber
///
/// `RUST_LOG` wins over the configured level; `--debug` wins over both.
fn init_logging(logging: &LoggingConfig, debug: bool) -> Result<()> {
    let filter = if debug {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level))
    };

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }

    Ok(())
}
