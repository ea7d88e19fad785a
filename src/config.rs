//! Configuration types for batch background removal

use crate::error::{BatchError, Result};
use crate::services::ProgressReporter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Extensions processed when none are configured
pub const DEFAULT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Configuration for one batch run
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// API key for the removal service
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Directory whose immediate entries are processed
    pub input_dir: PathBuf,

    /// Directory receiving one PNG per processed input
    pub output_dir: PathBuf,

    /// Lowercase extensions (without leading dot) that qualify a file
    pub extensions: BTreeSet<String>,

    /// Create `output_dir` recursively when it does not exist (default: true)
    pub create_output_dir: bool,

    /// Maximum number of files in flight (None = all at once)
    pub max_concurrency: Option<usize>,

    /// Observer for progress and per-file errors
    #[serde(skip)]
    pub reporter: Option<Arc<dyn ProgressReporter>>,
}

impl std::fmt::Debug for BatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchConfig")
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("input_dir", &self.input_dir)
            .field("output_dir", &self.output_dir)
            .field("extensions", &self.extensions)
            .field("create_output_dir", &self.create_output_dir)
            .field("max_concurrency", &self.max_concurrency)
            .field("reporter", &self.reporter.as_ref().map(|_| "Some(...)"))
            .finish()
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            input_dir: PathBuf::new(),
            output_dir: PathBuf::new(),
            extensions: default_extensions(),
            create_output_dir: true,
            max_concurrency: None,
            reporter: None,
        }
    }
}

/// The default extension set as owned strings
#[must_use]
pub fn default_extensions() -> BTreeSet<String> {
    DEFAULT_EXTENSIONS.iter().map(|ext| (*ext).to_string()).collect()
}

/// Lowercase an extension and strip surrounding whitespace and a leading dot
#[must_use]
pub fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_lowercase()
}

impl BatchConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    ///
    /// ```rust
    /// use rembg_batch::BatchConfig;
    ///
    /// let config = BatchConfig::builder()
    ///     .api_key("secret")
    ///     .input_dir("./files")
    ///     .output_dir("./output")
    ///     .extensions([".PNG", "webp"])
    ///     .build()
    ///     .unwrap();
    ///
    /// assert!(config.extensions.contains("png"));
    /// assert!(config.extensions.contains("webp"));
    /// ```
    #[must_use]
    pub fn builder() -> BatchConfigBuilder {
        BatchConfigBuilder::default()
    }

    /// Validate configuration without touching the filesystem
    ///
    /// # Errors
    /// - Empty API key, input directory or output directory
    /// - Empty extension set
    /// - `max_concurrency` of zero
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(BatchError::config("Missing API key"));
        }
        if self.input_dir.as_os_str().is_empty() {
            return Err(BatchError::config("Missing input directory"));
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(BatchError::config("Missing output directory"));
        }
        if self.extensions.is_empty() || self.extensions.iter().any(String::is_empty) {
            return Err(BatchError::config(
                "At least one non-empty file extension is required",
            ));
        }
        if self.max_concurrency == Some(0) {
            return Err(BatchError::config(
                "max_concurrency must be at least 1 (omit it for unbounded)",
            ));
        }
        Ok(())
    }

    /// Whether a lowercase extension (no dot) qualifies a file
    #[must_use]
    pub fn accepts_extension(&self, ext: &str) -> bool {
        self.extensions.contains(ext)
    }
}

/// Builder for `BatchConfig`
#[derive(Debug, Default)]
pub struct BatchConfigBuilder {
    config: BatchConfig,
}

impl BatchConfigBuilder {
    /// Set the API key
    #[must_use]
    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.config.api_key = api_key.into();
        self
    }

    /// Set the input directory
    #[must_use]
    pub fn input_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.input_dir = dir.into();
        self
    }

    /// Set the output directory
    #[must_use]
    pub fn output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Replace the extension set; entries are normalized
    #[must_use]
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.config.extensions = extensions
            .into_iter()
            .map(|ext| normalize_extension(ext.as_ref()))
            .collect();
        self
    }

    /// Enable or disable creation of a missing output directory
    #[must_use]
    pub fn create_output_dir(mut self, create: bool) -> Self {
        self.config.create_output_dir = create;
        self
    }

    /// Limit the number of files in flight
    #[must_use]
    pub fn max_concurrency(mut self, limit: Option<usize>) -> Self {
        self.config.max_concurrency = limit;
        self
    }

    /// Set the progress and error observer
    #[must_use]
    pub fn reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.config.reporter = Some(reporter);
        self
    }

    /// Build and validate the configuration
    ///
    /// # Errors
    /// - Any rule checked by [`BatchConfig::validate`]
    pub fn build(self) -> Result<BatchConfig> {
        let config = self.config;
        config.validate()?;
        Ok(config)
    }
}
