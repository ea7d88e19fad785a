#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # rembg-batch
//!
//! Batch background removal for whole directories of images, backed by the
//! remote rembg HTTP API.
//!
//! Point it at an input directory and an output directory: every file with a
//! qualifying extension is uploaded to the removal service, and the returned
//! cut-out is written to the output directory as `<stem>.png`. Files are
//! processed concurrently; one failing file never stops the others.
//!
//! ## Features
//!
//! - **Directory batches**: extension filtering, output directory creation,
//!   one result per file in input order
//! - **Pluggable backends**: the orchestration talks to a [`RemovalBackend`]
//!   trait; [`RembgHttpBackend`] is the production implementation
//! - **Progress observers**: callbacks, channels, console logging or an
//!   indicatif progress bar
//! - **Bounded concurrency**: optionally cap the number of files in flight
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rembg_batch::{batch_remove_background, BatchConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = BatchConfig::builder()
//!     .api_key(std::env::var("API_KEY")?)
//!     .input_dir("./files")
//!     .output_dir("./output")
//!     .build()?;
//!
//! let results = batch_remove_background(config).await?;
//! println!("Succeeded: {}", results.iter().filter(|r| r.success).count());
//! println!("Failed: {}", results.iter().filter(|r| !r.success).count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Observing progress
//!
//! ```rust,no_run
//! use rembg_batch::{batch_remove_background, BatchConfig, CallbackProgressReporter};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let reporter = CallbackProgressReporter::new(
//!     |event| println!("[{}%] {}", event.percent, event.file),
//!     |error| eprintln!("{} failed: {}", error.file, error.error),
//! );
//! let config = BatchConfig::builder()
//!     .api_key("secret")
//!     .input_dir("./files")
//!     .output_dir("./output")
//!     .reporter(Arc::new(reporter))
//!     .build()?;
//!
//! batch_remove_background(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, progress bar and tracing subscriber setup
//! - `tracing-json`: JSON log output
//! - `tracing-files`: log to a file

pub mod backends;
pub mod batch;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod processor;
pub mod services;
pub mod tracing_config;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

// Public API exports
pub use backends::{
    HttpBackendConfig, RembgHttpBackend, RemovalBackend, RemovalRequest, RemovedImage,
    DEFAULT_ENDPOINT,
};
pub use batch::{run_batch, BatchProcessor};
pub use config::{BatchConfig, BatchConfigBuilder, DEFAULT_EXTENSIONS};
pub use error::{BatchError, Result};
pub use processor::ImageProcessor;
pub use services::{
    CallbackProgressReporter, ChannelProgressReporter, ConsoleProgressReporter, ImageIOService,
    NoOpProgressReporter, ProgressReporter, ReportEvent,
};
pub use types::{
    BatchReport, BatchSummary, ErrorEvent, FileTask, ProcessResult, ProgressEvent,
};

#[cfg(feature = "cli")]
pub use services::ProgressBarReporter;
#[cfg(feature = "cli")]
pub use tracing_config::{TracingConfig, TracingFormat, TracingGuard, TracingOutput};

/// Remove the background of every qualifying image in a directory
///
/// Uses [`RembgHttpBackend`] with its default endpoint. Use
/// [`BatchProcessor`] to supply another backend.
///
/// # Returns
///
/// One [`ProcessResult`] per qualifying file, in input order. An empty input
/// directory yields an empty vector.
///
/// # Errors
///
/// - Missing API key, input directory or output directory
/// - Input directory missing, or output directory missing and not creatable
pub async fn batch_remove_background(config: BatchConfig) -> Result<Vec<ProcessResult>> {
    let backend = RembgHttpBackend::new(HttpBackendConfig::default())?;
    run_batch(config, Arc::new(backend)).await
}

/// Remove the background of a single image
///
/// Uses [`RembgHttpBackend`] with its default endpoint and writes the PNG
/// result to `output_path`.
///
/// # Examples
///
/// ```rust,no_run
/// # async fn example() -> anyhow::Result<()> {
/// let written = rembg_batch::process_image("secret", "cat.jpg", "cat.png").await?;
/// assert_eq!(written, std::path::PathBuf::from("cat.png"));
/// # Ok(())
/// # }
/// ```
pub async fn process_image<P: AsRef<Path>, Q: AsRef<Path>>(
    api_key: &str,
    input_path: P,
    output_path: Q,
) -> Result<PathBuf> {
    let backend = RembgHttpBackend::new(HttpBackendConfig::default())?;
    ImageProcessor::new(Arc::new(backend))
        .process_one(api_key, input_path, output_path)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_remove_background_validates_first() {
        let config = BatchConfig {
            input_dir: "./files".into(),
            output_dir: "./output".into(),
            ..BatchConfig::default()
        };
        let err = batch_remove_background(config).await.unwrap_err();
        assert!(matches!(err, BatchError::Config(_)));
    }
}
