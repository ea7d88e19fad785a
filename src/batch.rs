//! Batch orchestration
//!
//! `BatchProcessor` validates a [`BatchConfig`], lists the qualifying files of
//! the input directory, dispatches one removal per file and collects one
//! [`ProcessResult`] per file in input order.
//!
//! All per-file futures are driven on the calling task. Progress events are
//! emitted in input order before any of them is polled, so a reporter always
//! sees the full dispatch sequence before the first completion.

use crate::{
    backends::RemovalBackend,
    config::BatchConfig,
    error::Result,
    processor::ImageProcessor,
    services::{ConsoleProgressReporter, ImageIOService, ProgressReporter},
    tracing_config::spans,
    types::{BatchReport, BatchSummary, ErrorEvent, FileTask, ProcessResult, ProgressEvent},
};
use chrono::Utc;
use futures::{future::join_all, stream, StreamExt};
use instant::Instant;
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

/// Runs one configured batch against a removal backend
pub struct BatchProcessor {
    config: BatchConfig,
    processor: ImageProcessor,
    reporter: Arc<dyn ProgressReporter>,
}

impl std::fmt::Debug for BatchProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("config", &self.config)
            .field("processor", &self.processor)
            .finish_non_exhaustive()
    }
}

impl BatchProcessor {
    /// Create a batch processor
    ///
    /// Without a configured reporter, progress goes to debug logs and
    /// failures are logged as errors.
    #[must_use]
    pub fn new(config: BatchConfig, backend: Arc<dyn RemovalBackend>) -> Self {
        let reporter = config
            .reporter
            .clone()
            .unwrap_or_else(|| Arc::new(ConsoleProgressReporter::default()));

        Self {
            config,
            processor: ImageProcessor::new(backend),
            reporter,
        }
    }

    /// Get the batch configuration
    #[must_use]
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Validate paths and list the tasks a run would dispatch
    ///
    /// Creates the output directory when allowed. Does not call the backend.
    ///
    /// # Errors
    /// - [`crate::BatchError::Config`] before any filesystem access
    /// - [`crate::BatchError::InputNotFound`], [`crate::BatchError::OutputNotFound`]
    ///   or [`crate::BatchError::NotADirectory`] for unusable directories
    /// - [`crate::BatchError::Io`] when the input directory cannot be listed
    pub async fn prepare(&self) -> Result<Vec<FileTask>> {
        self.config.validate()?;

        let input_dir = &self.config.input_dir;
        let output_dir = &self.config.output_dir;
        ImageIOService::ensure_input_dir(input_dir).await?;
        ImageIOService::ensure_output_dir(output_dir, self.config.create_output_dir).await?;

        let files =
            ImageIOService::list_qualifying_files(input_dir, &self.config.extensions).await?;

        Ok(files
            .into_iter()
            .map(|input_path| FileTask::new(input_path, output_dir))
            .collect())
    }

    /// Process every qualifying file and return one result per file
    ///
    /// Results are in input order whatever the completion order. Per-file
    /// failures become failed results and never abort the batch.
    ///
    /// # Errors
    /// - Any error from [`BatchProcessor::prepare`]
    pub async fn run(&self) -> Result<Vec<ProcessResult>> {
        let start_time = Instant::now();
        let tasks = self.prepare().await?;

        if tasks.is_empty() {
            info!(
                "No qualifying image files found in {}",
                self.config.input_dir.display()
            );
            return Ok(Vec::new());
        }

        let total = tasks.len();
        info!("Found {} files to process", total);

        // Futures are lazy: every progress event fires here, before any work starts
        let futures: Vec<_> = tasks
            .iter()
            .enumerate()
            .map(|(index, task)| {
                self.reporter.report_progress(ProgressEvent::new(
                    index + 1,
                    total,
                    task.file_name.clone(),
                ));
                self.run_task(task)
            })
            .collect();

        let results = async {
            match self.config.max_concurrency {
                Some(limit) => {
                    debug!("Processing with at most {} files in flight", limit);
                    stream::iter(futures).buffered(limit).collect::<Vec<_>>().await
                },
                None => join_all(futures).await,
            }
        }
        .instrument(spans::batch_processing(total))
        .await;

        let summary = BatchSummary::from_results(&results);
        let elapsed = start_time.elapsed();
        if summary.all_succeeded() {
            info!(
                "Batch completed: {} files in {:.2}s",
                summary.succeeded,
                elapsed.as_secs_f64()
            );
        } else {
            warn!(
                "Batch completed: {} succeeded, {} failed in {:.2}s",
                summary.succeeded,
                summary.failed,
                elapsed.as_secs_f64()
            );
        }

        Ok(results)
    }

    /// Like [`BatchProcessor::run`], wrapped with timestamps and a summary
    ///
    /// # Errors
    /// - Any error from [`BatchProcessor::run`]
    pub async fn run_with_report(&self) -> Result<BatchReport> {
        let started_at = Utc::now();
        let results = self.run().await?;
        Ok(BatchReport::new(started_at, results))
    }

    async fn run_task(&self, task: &FileTask) -> ProcessResult {
        let result = self
            .processor
            .process_task(&self.config.api_key, task)
            .instrument(spans::file_processing(&task.input_path))
            .await;

        if let Some(error) = &result.error {
            self.reporter.report_error(&ErrorEvent {
                file: result.file.clone(),
                input_path: result.input_path.clone(),
                error: error.clone(),
            });
        }
        self.reporter.report_completion(&result);
        result
    }
}

/// Run one batch with `config` against `backend`
///
/// # Errors
/// - Any error from [`BatchProcessor::run`]
pub async fn run_batch(
    config: BatchConfig,
    backend: Arc<dyn RemovalBackend>,
) -> Result<Vec<ProcessResult>> {
    BatchProcessor::new(config, backend).run().await
}
