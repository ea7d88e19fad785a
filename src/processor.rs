//! Single-image processor
//!
//! This module provides `ImageProcessor`, which runs one image through the
//! removal backend and copies the temporary result to its final location.
//! The batch orchestrator uses it per file; it is also usable on its own.

use crate::{
    backends::{RemovalBackend, RemovalRequest},
    error::{BatchError, Result},
    services::ImageIOService,
    types::{FileTask, ProcessResult},
};
use instant::Instant;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Processes one image at a time through an injected backend
#[derive(Clone)]
pub struct ImageProcessor {
    backend: Arc<dyn RemovalBackend>,
}

impl std::fmt::Debug for ImageProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageProcessor")
            .field("backend", &self.backend.name())
            .finish()
    }
}

impl ImageProcessor {
    /// Create a processor around a backend
    #[must_use]
    pub fn new(backend: Arc<dyn RemovalBackend>) -> Self {
        Self { backend }
    }

    /// Remove the background of `input_path` and write the PNG to `output_path`
    ///
    /// The backend's temporary result is deleted once copied. No retries.
    ///
    /// # Errors
    /// - [`BatchError::Processing`] wrapping any backend or copy failure
    pub async fn process_one<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        api_key: &str,
        input_path: P,
        output_path: Q,
    ) -> Result<PathBuf> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();
        let file = input_path
            .file_name()
            .map_or_else(|| input_path.display().to_string(), |name| {
                name.to_string_lossy().into_owned()
            });

        info!("Processing: {}", input_path.display());
        let start_time = Instant::now();

        let removed = self
            .backend
            .remove_background(RemovalRequest {
                api_key,
                input_path,
                output_path,
            })
            .await
            .map_err(|e| BatchError::processing(&file, e.file_message()))?;

        // On copy failure the temporary result is deleted when `removed` drops
        ImageIOService::copy_output(removed.path(), output_path)
            .await
            .map_err(|e| BatchError::processing(&file, e.file_message()))?;

        if let Err(e) = removed.cleanup() {
            warn!("Failed to remove temporary result for {}: {}", file, e);
        }

        debug!(
            file = %file,
            output = %output_path.display(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "Wrote result"
        );
        Ok(output_path.to_path_buf())
    }

    /// Run one batch task and fold its outcome into a [`ProcessResult`]
    pub async fn process_task(&self, api_key: &str, task: &FileTask) -> ProcessResult {
        match self
            .process_one(api_key, &task.input_path, &task.output_path)
            .await
        {
            Ok(_) => ProcessResult::succeeded(task),
            Err(e) => ProcessResult::failed(task, e.file_message()),
        }
    }
}
