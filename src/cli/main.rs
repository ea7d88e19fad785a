//! Batch Background Removal CLI Tool
//!
//! Command-line interface for removing backgrounds from a directory of images
//! through the remote rembg service.

use super::config::CliConfigBuilder;
use crate::{
    backends::{RembgHttpBackend, DEFAULT_ENDPOINT},
    batch::BatchProcessor,
    services::{ConsoleProgressReporter, ProgressBarReporter, ProgressReporter},
    tracing_config::{TracingConfig, TracingFormat, TracingOutput},
    types::BatchReport,
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Batch background removal CLI tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "rembg-batch")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// API key for the removal service (also read from a .env file)
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Directory containing the images to process
    #[arg(short, long, value_name = "DIR", default_value = "./files")]
    pub input_dir: PathBuf,

    /// Directory receiving the PNG results
    #[arg(short, long, value_name = "DIR", default_value = "./output")]
    pub output_dir: PathBuf,

    /// File extension to process; repeat for several [default: png, jpg, jpeg]
    #[arg(short = 'e', long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Fail instead of creating a missing output directory
    #[arg(long)]
    pub no_create_output_dir: bool,

    /// Maximum number of files processed at once [default: all]
    #[arg(short = 'j', long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Removal service endpoint
    #[arg(long, value_name = "URL", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Per-request timeout in seconds [default: none]
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Requested output width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Requested output height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Resize to exactly --width x --height
    #[arg(long)]
    pub exact_resize: bool,

    /// Return the alpha mask instead of the cut-out
    #[arg(long)]
    pub mask: bool,

    /// Show a progress bar instead of per-file log lines
    #[arg(long)]
    pub progress: bool,

    /// Print the full batch report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Log output format
    #[arg(long, value_enum, default_value_t = CliLogFormat::Console)]
    pub log_format: CliLogFormat,

    /// Write logs to this file instead of stderr
    #[cfg(feature = "tracing-files")]
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    Console,
    Compact,
    #[cfg(feature = "tracing-json")]
    Json,
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => TracingFormat::Console,
            CliLogFormat::Compact => TracingFormat::Compact,
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => TracingFormat::Json,
        }
    }
}

pub async fn main() -> Result<()> {
    // .env must be loaded before clap reads API_KEY
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    let _tracing_guard = init_tracing(&cli).context("Failed to initialize tracing")?;
    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => tracing::warn!("Ignoring unreadable .env file: {}", e),
    }

    // Validate CLI arguments
    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;

    let backend_config = CliConfigBuilder::backend_config(&cli);
    let backend =
        RembgHttpBackend::new(backend_config).context("Failed to create removal client")?;

    let progress_bar = cli.progress.then(|| Arc::new(ProgressBarReporter::new()));
    let reporter: Arc<dyn ProgressReporter> = match &progress_bar {
        Some(bar) => Arc::clone(bar) as Arc<dyn ProgressReporter>,
        None => Arc::new(ConsoleProgressReporter::new(true)),
    };

    let config = CliConfigBuilder::from_cli(&cli, reporter).context("Invalid configuration")?;

    info!("Starting batch background removal");
    info!("Input directory: {}", config.input_dir.display());
    info!("Output directory: {}", config.output_dir.display());
    debug!(endpoint = %cli.endpoint, ?config, "Configuration");

    let report = BatchProcessor::new(config, Arc::new(backend))
        .run_with_report()
        .await
        .context("Batch processing failed")?;

    if let Some(bar) = progress_bar {
        bar.finish(report.summary.succeeded, report.summary.failed);
    }

    if cli.json {
        let json =
            serde_json::to_string_pretty(&report).context("Failed to serialize batch report")?;
        println!("{json}");
    } else {
        print_summary(&report);
    }

    Ok(())
}

/// Initialize tracing based on CLI flags
fn init_tracing(cli: &Cli) -> Result<crate::tracing_config::TracingGuard> {
    #[cfg(feature = "tracing-files")]
    let output = cli
        .log_file
        .clone()
        .map_or(TracingOutput::Console, TracingOutput::File);
    #[cfg(not(feature = "tracing-files"))]
    let output = TracingOutput::Console;

    TracingConfig::new()
        .with_verbosity(cli.verbose)
        .with_format(cli.log_format.into())
        .with_output(output)
        .with_session_id(uuid::Uuid::new_v4().to_string())
        .init()
        .context("Failed to initialize tracing subscriber")
}

/// Print per-batch counts and every failed file
fn print_summary(report: &BatchReport) {
    let summary = &report.summary;
    println!("Batch processing complete!");
    println!("Succeeded: {}", summary.succeeded);
    println!("Failed: {}", summary.failed);
    for (file, error) in &summary.failures {
        println!("Failed: {file} - {error}");
    }
    debug!(
        duration_ms = report.duration_ms,
        total = summary.total,
        "Batch report"
    );
}
