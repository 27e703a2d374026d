//! Fingerprint value statistics (fpc-st) - Main entry point
//!
//! **Usage:**
//! ```bash
//! fpc-st [--root-folder DIR] [--fingerprints DIR] [--pointsystem FILE] \
//!        [--output DIR] [--summary]
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use fpc_common::config::{
    find_toml_config, resolve_root_folder, write_atomic, LoggingConfig, RootFolder,
    ROOT_FOLDER_ENV,
};
use fpc_common::loader::load_weight_table;
use fpc_st::{
    format_distribution, unique_distribution, StatisticsCollector, STATISTICS_FILE,
    STATISTICS_RAW_FILE,
};
use serde::Serialize;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

/// Command-line arguments for fpc-st
#[derive(Parser, Debug)]
#[command(name = "fpc-st")]
#[command(about = "Value statistics over a collected fingerprint tree")]
#[command(version)]
struct Args {
    /// Root folder containing Pointsystem/, Fingerprints/ and results/
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Fingerprint tree (default: <root>/Fingerprints)
    #[arg(long, value_name = "DIR")]
    fingerprints: Option<PathBuf>,

    /// Weight table (default: <root>/Pointsystem/pointsystem.json)
    #[arg(long, value_name = "FILE")]
    pointsystem: Option<PathBuf>,

    /// Output folder (default: <root>/results)
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Print the unique-value distribution per browser and pv
    #[arg(short, long)]
    summary: bool,

    /// Log at debug level
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let loaded = find_toml_config(args.config.as_deref()).context("Failed to load config")?;
    init_logging(&loaded.config.logging, args.debug)?;
    loaded.log_source();
    let config = loaded.config;

    let root = RootFolder::new(resolve_root_folder(
        args.root_folder.as_deref(),
        ROOT_FOLDER_ENV,
        &config,
    ));
    let fingerprints_dir = args
        .fingerprints
        .clone()
        .unwrap_or_else(|| config.fingerprints_dir(&root));
    let pointsystem_path = args
        .pointsystem
        .clone()
        .unwrap_or_else(|| config.pointsystem_path(&root));
    let output_dir = args
        .output
        .clone()
        .unwrap_or_else(|| config.statistics_output(&root));

    info!("Root folder: {}", root.path().display());

    let table = load_weight_table(&pointsystem_path)
        .with_context(|| format!("Failed to load weight table {}", pointsystem_path.display()))?;

    let collector = StatisticsCollector::new(&table, config.media.clone());
    let raw = collector
        .collect(&fingerprints_dir)
        .with_context(|| format!("Failed to collect statistics from {}", fingerprints_dir.display()))?;
    let summary = raw.summarize();

    write_json(&output_dir.join(STATISTICS_RAW_FILE), &raw)?;
    write_json(&output_dir.join(STATISTICS_FILE), &summary)?;
    println!("✓ Statistics written to: {}", output_dir.display());

    if args.summary {
        let distribution = unique_distribution(&summary, &config.media.attribute);
        print!("{}", format_distribution(&distribution));
    }

    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    write_atomic(path, json.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!(path = %path.display(), "Wrote statistics");
    Ok(())
}

/// Install the tracing subscriber (`--debug` > `RUST_LOG` > config level)
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
