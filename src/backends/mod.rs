//! Removal backends
//!
//! A backend takes one input image, has its background removed somewhere, and
//! hands back a temporary PNG. The batch layer only sees the
//! [`RemovalBackend`] trait:
//! - HTTP backend (the remote rembg service)
//! - Mock backend for unit tests

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;
use tempfile::TempPath;

pub mod http;

// Test utilities for backend testing
#[cfg(test)]
pub mod test_utils;

pub use self::http::{HttpBackendConfig, RembgHttpBackend, DEFAULT_ENDPOINT};

/// Everything a backend needs to process one file
#[derive(Debug, Clone, Copy)]
pub struct RemovalRequest<'a> {
    /// Credential forwarded to the removal service
    pub api_key: &'a str,
    /// Image to process
    pub input_path: &'a Path,
    /// Final destination of the result; backends must not write here
    pub output_path: &'a Path,
}

/// Temporary result of a removal call
///
/// The file behind it is deleted by [`RemovedImage::cleanup`] or, failing
/// that, when the value is dropped.
#[derive(Debug)]
pub struct RemovedImage {
    temp_path: TempPath,
}

impl RemovedImage {
    /// Wrap an existing temporary path
    #[must_use]
    pub fn new(temp_path: TempPath) -> Self {
        Self { temp_path }
    }

    /// Location of the temporary result
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Delete the temporary result
    ///
    /// # Errors
    /// - The file could not be removed
    pub fn cleanup(self) -> std::io::Result<()> {
        self.temp_path.close()
    }
}

impl From<TempPath> for RemovedImage {
    fn from(temp_path: TempPath) -> Self {
        Self::new(temp_path)
    }
}

/// Trait for services that remove the background from a single image
#[async_trait]
pub trait RemovalBackend: Send + Sync {
    /// Process one image and return its temporary PNG result
    ///
    /// # Errors
    /// - Any failure reaching or using the removal service
    async fn remove_background(&self, request: RemovalRequest<'_>) -> Result<RemovedImage>;

    /// Short backend name used in logs
    fn name(&self) -> &'static str {
        "custom"
    }
}
