//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use rembg_batch::{
    BatchConfig, BatchError, ErrorEvent, ProgressEvent, ProgressReporter, RemovalBackend,
    RemovalRequest, RemovedImage, Result,
};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Bytes every successful mock call produces
pub const CUTOUT_BYTES: &[u8] = b"\x89PNG\r\n\x1a\ncutout";

/// Removal backend that succeeds unless told otherwise
#[derive(Debug, Clone, Default)]
pub struct ScriptedBackend {
    failing: HashSet<String>,
    calls: Arc<Mutex<Vec<String>>>,
    temp_files: Arc<Mutex<Vec<PathBuf>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn temp_files(&self) -> Vec<PathBuf> {
        self.temp_files.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemovalBackend for ScriptedBackend {
    async fn remove_background(&self, request: RemovalRequest<'_>) -> Result<RemovedImage> {
        let file_name = request
            .input_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .into_owned();
        self.calls.lock().unwrap().push(file_name.clone());
        tokio::task::yield_now().await;

        if self.failing.contains(&file_name) {
            return Err(BatchError::Api {
                status: 422,
                body: format!("could not process {}", file_name),
            });
        }

        let mut temp_file = tempfile::Builder::new().suffix(".png").tempfile()?;
        temp_file.write_all(CUTOUT_BYTES)?;
        let temp_path = temp_file.into_temp_path();
        self.temp_files.lock().unwrap().push(temp_path.to_path_buf());
        Ok(RemovedImage::new(temp_path))
    }
}

/// Reporter that records everything it sees
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub progress: Mutex<Vec<ProgressEvent>>,
    pub errors: Mutex<Vec<ErrorEvent>>,
}

impl RecordingReporter {
    pub fn progress(&self) -> Vec<ProgressEvent> {
        self.progress.lock().unwrap().clone()
    }

    pub fn errors(&self) -> Vec<ErrorEvent> {
        self.errors.lock().unwrap().clone()
    }
}

impl ProgressReporter for RecordingReporter {
    fn report_progress(&self, event: ProgressEvent) {
        self.progress.lock().unwrap().push(event);
    }

    fn report_error(&self, event: &ErrorEvent) {
        self.errors.lock().unwrap().push(event.clone());
    }
}

/// Scratch input and output directories
pub struct Workspace {
    pub root: TempDir,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl Workspace {
    /// Create `input/` populated with `files`; `output/` is not created
    pub fn with_files(files: &[&str]) -> Self {
        let root = TempDir::new().expect("Failed to create temp directory");
        let input = root.path().join("input");
        let output = root.path().join("output");
        std::fs::create_dir(&input).unwrap();
        for name in files {
            std::fs::write(input.join(name), b"raw image bytes").unwrap();
        }
        Self {
            root,
            input,
            output,
        }
    }

    pub fn config(&self, reporter: Arc<dyn ProgressReporter>) -> BatchConfig {
        BatchConfig::builder()
            .api_key("test-api-key")
            .input_dir(&self.input)
            .output_dir(&self.output)
            .reporter(reporter)
            .build()
            .unwrap()
    }
}

/// Sorted file names of a directory
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
