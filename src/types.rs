//! Core types for batch background removal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Extension forced onto every output file
pub const OUTPUT_EXTENSION: &str = "png";

/// One qualifying input file and where its result goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    /// File name as listed in the input directory
    pub file_name: String,
    /// Full path of the input image
    pub input_path: PathBuf,
    /// Full path of the PNG to write
    pub output_path: PathBuf,
}

impl FileTask {
    /// Build a task for `input_path`, placing `<stem>.png` in `output_dir`
    #[must_use]
    pub fn new(input_path: PathBuf, output_dir: &Path) -> Self {
        let file_name = input_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        // Built on OsString so distinct non-UTF-8 stems never share an output
        let mut output_name = input_path
            .file_stem()
            .map(OsStr::to_os_string)
            .unwrap_or_default();
        output_name.push(".");
        output_name.push(OUTPUT_EXTENSION);
        let output_path = output_dir.join(output_name);

        Self {
            file_name,
            input_path,
            output_path,
        }
    }
}

/// Outcome of processing a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// File name as listed in the input directory
    pub file: String,
    /// Whether the file was processed and written
    pub success: bool,
    /// Full path of the input image
    pub input_path: PathBuf,
    /// Written output path (success only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub output_path: Option<PathBuf>,
    /// Human-readable failure description (failure only)
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
}

impl ProcessResult {
    /// Result for a task whose output was written
    #[must_use]
    pub fn succeeded(task: &FileTask) -> Self {
        Self {
            file: task.file_name.clone(),
            success: true,
            input_path: task.input_path.clone(),
            output_path: Some(task.output_path.clone()),
            error: None,
        }
    }

    /// Result for a task that failed with `error`
    #[must_use]
    pub fn failed<S: Into<String>>(task: &FileTask, error: S) -> Self {
        Self {
            file: task.file_name.clone(),
            success: false,
            input_path: task.input_path.clone(),
            output_path: None,
            error: Some(error.into()),
        }
    }
}

/// Progress notification emitted when a file is dispatched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// 1-based index of the file in dispatch order
    pub current: usize,
    /// Number of qualifying files in the batch
    pub total: usize,
    /// File name being dispatched
    pub file: String,
    /// `current / total` as a whole percentage, rounded half up
    pub percent: u8,
}

impl ProgressEvent {
    /// Create an event for the `current`-th of `total` files
    #[must_use]
    pub fn new<S: Into<String>>(current: usize, total: usize, file: S) -> Self {
        Self {
            current,
            total,
            file: file.into(),
            percent: Self::percent_of(current, total),
        }
    }

    /// Integer round-half-up of `current * 100 / total`, capped at 100
    #[must_use]
    pub fn percent_of(current: usize, total: usize) -> u8 {
        if total == 0 {
            return 0;
        }
        let rounded = (current.saturating_mul(200) + total) / (2 * total);
        rounded.min(100) as u8
    }
}

/// Error notification emitted once per failed file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEvent {
    /// File name that failed
    pub file: String,
    /// Full path of the input image
    pub input_path: PathBuf,
    /// Human-readable failure description
    pub error: String,
}

/// Aggregate counts over a finished batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Number of results
    pub total: usize,
    /// Number of successful results
    pub succeeded: usize,
    /// Number of failed results
    pub failed: usize,
    /// `(file, error)` for every failed result, in result order
    pub failures: Vec<(String, String)>,
}

impl BatchSummary {
    /// Summarize a result slice
    #[must_use]
    pub fn from_results(results: &[ProcessResult]) -> Self {
        let failures: Vec<(String, String)> = results
            .iter()
            .filter(|result| !result.success)
            .map(|result| {
                (
                    result.file.clone(),
                    result.error.clone().unwrap_or_default(),
                )
            })
            .collect();

        Self {
            total: results.len(),
            succeeded: results.len() - failures.len(),
            failed: failures.len(),
            failures,
        }
    }

    /// Whether every file succeeded
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Full record of one batch run, as printed by the CLI in JSON mode
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// When the batch started
    pub started_at: DateTime<Utc>,
    /// When the last file settled
    pub finished_at: DateTime<Utc>,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
    /// Counts and failures derived from `results`
    pub summary: BatchSummary,
    /// Per-file outcomes in input order
    pub results: Vec<ProcessResult>,
}

impl BatchReport {
    /// Build a report from results collected between `started_at` and now
    #[must_use]
    pub fn new(started_at: DateTime<Utc>, results: Vec<ProcessResult>) -> Self {
        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        Self {
            started_at,
            finished_at,
            duration_ms,
            summary: BatchSummary::from_results(&results),
            results,
        }
    }
}
