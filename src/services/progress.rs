//! Progress reporting service
//!
//! This module separates progress reporting concerns from batch logic,
//! allowing different frontends to implement their own progress handling.
//! Reporters are observational only: nothing they do changes batch results.

use crate::types::{ErrorEvent, ProcessResult, ProgressEvent};
use tokio::sync::mpsc;

/// Trait for observing a batch run
pub trait ProgressReporter: Send + Sync {
    /// Report that a file has been dispatched
    ///
    /// Called synchronously, in input order, before the file's work begins.
    fn report_progress(&self, event: ProgressEvent);

    /// Report that a file failed
    ///
    /// Called once per failed file, in settlement order.
    fn report_error(&self, event: &ErrorEvent);

    /// Report that a file settled, successfully or not
    fn report_completion(&self, _result: &ProcessResult) {
        // Default implementation does nothing - only interactive reporters need this
    }
}

/// No-op progress reporter that discards all events
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _event: ProgressEvent) {
        // Intentionally empty - discards progress events
    }

    fn report_error(&self, _event: &ErrorEvent) {
        // Intentionally empty - discards error events
    }
}

/// Console progress reporter that logs through `tracing`
///
/// This is the reporter used when a batch is configured without one; it
/// stays quiet about progress unless verbose and always logs failures.
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    ///
    /// # Arguments
    /// * `verbose` - Log progress at info level instead of debug
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, event: ProgressEvent) {
        if self.verbose {
            tracing::info!(
                "[{}%] {}/{} {}",
                event.percent,
                event.current,
                event.total,
                event.file
            );
        } else {
            tracing::debug!(
                current = event.current,
                total = event.total,
                file = %event.file,
                "Dispatched file"
            );
        }
    }

    fn report_error(&self, event: &ErrorEvent) {
        tracing::error!(file = %event.file, "❌ Processing error: {}", event.error);
    }

    fn report_completion(&self, result: &ProcessResult) {
        if self.verbose && result.success {
            tracing::info!("✅ Completed: {}", result.file);
        }
    }
}

type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;
type ErrorCallback = Box<dyn Fn(&ErrorEvent) + Send + Sync>;

/// Reporter built from two plain closures
pub struct CallbackProgressReporter {
    on_progress: ProgressCallback,
    on_error: ErrorCallback,
}

impl CallbackProgressReporter {
    /// Create a reporter from a progress closure and an error closure
    pub fn new<P, E>(on_progress: P, on_error: E) -> Self
    where
        P: Fn(ProgressEvent) + Send + Sync + 'static,
        E: Fn(&ErrorEvent) + Send + Sync + 'static,
    {
        Self {
            on_progress: Box::new(on_progress),
            on_error: Box::new(on_error),
        }
    }

    /// Create a reporter with a progress closure; errors are logged
    pub fn on_progress<P>(on_progress: P) -> Self
    where
        P: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        let console = ConsoleProgressReporter::default();
        Self::new(on_progress, move |event| console.report_error(event))
    }
}

impl ProgressReporter for CallbackProgressReporter {
    fn report_progress(&self, event: ProgressEvent) {
        (self.on_progress)(event);
    }

    fn report_error(&self, event: &ErrorEvent) {
        (self.on_error)(event);
    }
}

/// Event forwarded by [`ChannelProgressReporter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    /// A file was dispatched
    Progress(ProgressEvent),
    /// A file failed
    Error(ErrorEvent),
    /// A file settled
    Completed(ProcessResult),
}

/// Reporter that forwards every event into an unbounded channel
///
/// The caller drains the receiver at its own pace; events are dropped
/// silently once the receiver is gone.
pub struct ChannelProgressReporter {
    sender: mpsc::UnboundedSender<ReportEvent>,
}

impl ChannelProgressReporter {
    /// Create a reporter and the receiver that drains it
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ReportEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: ReportEvent) {
        if self.sender.send(event).is_err() {
            tracing::trace!("Report receiver dropped; discarding event");
        }
    }
}

impl ProgressReporter for ChannelProgressReporter {
    fn report_progress(&self, event: ProgressEvent) {
        self.send(ReportEvent::Progress(event));
    }

    fn report_error(&self, event: &ErrorEvent) {
        self.send(ReportEvent::Error(event.clone()));
    }

    fn report_completion(&self, result: &ProcessResult) {
        self.send(ReportEvent::Completed(result.clone()));
    }
}

/// Progress bar reporter for interactive terminals
///
/// The bar advances when files settle, since every file is dispatched up front.
#[cfg(feature = "cli")]
pub struct ProgressBarReporter {
    bar: indicatif::ProgressBar,
}

#[cfg(feature = "cli")]
impl ProgressBarReporter {
    /// Create a bar sized lazily from the first progress event
    #[must_use]
    pub fn new() -> Self {
        let bar = indicatif::ProgressBar::new(0);
        bar.set_style(
            indicatif::ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| indicatif::ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    /// Finish the bar with a closing message
    pub fn finish(&self, succeeded: usize, failed: usize) {
        self.bar.finish_with_message(format!(
            "Completed! Processed: {succeeded}, Failed: {failed}"
        ));
    }
}

#[cfg(feature = "cli")]
impl Default for ProgressBarReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "cli")]
impl ProgressReporter for ProgressBarReporter {
    fn report_progress(&self, event: ProgressEvent) {
        self.bar.set_length(event.total as u64);
        self.bar.set_message(format!("Uploading {}", event.file));
    }

    fn report_error(&self, event: &ErrorEvent) {
        self.bar
            .println(format!("❌ Failed: {} - {}", event.file, event.error));
    }

    fn report_completion(&self, result: &ProcessResult) {
        self.bar.set_message(result.file.clone());
        self.bar.inc(1);
    }
}
