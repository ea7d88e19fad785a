//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::Cli;
use crate::{
    backends::HttpBackendConfig,
    config::BatchConfig,
    services::ProgressReporter,
};
use anyhow::{bail, Context, Result};
use std::sync::Arc;
use std::time::Duration;

/// Convert CLI arguments to library configuration
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build a `BatchConfig` from CLI arguments
    pub(crate) fn from_cli(cli: &Cli, reporter: Arc<dyn ProgressReporter>) -> Result<BatchConfig> {
        let api_key = cli
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .context("Missing API key: set API_KEY (environment or .env) or pass --api-key")?;

        let mut builder = BatchConfig::builder()
            .api_key(api_key)
            .input_dir(&cli.input_dir)
            .output_dir(&cli.output_dir)
            .create_output_dir(!cli.no_create_output_dir)
            .max_concurrency(cli.max_concurrency)
            .reporter(reporter);

        // Keep the library defaults unless extensions were given
        if !cli.extensions.is_empty() {
            builder = builder.extensions(&cli.extensions);
        }

        Ok(builder.build()?)
    }

    /// Build the HTTP backend options from CLI arguments
    pub(crate) fn backend_config(cli: &Cli) -> HttpBackendConfig {
        HttpBackendConfig {
            endpoint: cli.endpoint.clone(),
            timeout: cli.timeout.map(Duration::from_secs),
            width: cli.width,
            height: cli.height,
            exact_resize: cli.exact_resize,
            mask: cli.mask,
        }
    }

    /// Validate CLI arguments for consistency
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        let endpoint = reqwest::Url::parse(&cli.endpoint)
            .with_context(|| format!("Invalid endpoint URL: {}", cli.endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!("Endpoint must use http or https: {}", cli.endpoint);
        }

        if cli.timeout == Some(0) {
            bail!("--timeout must be at least 1 second");
        }
        if cli.max_concurrency == Some(0) {
            bail!("--max-concurrency must be at least 1");
        }
        if cli.width == Some(0) || cli.height == Some(0) {
            bail!("--width and --height must be positive");
        }
        if cli.exact_resize && (cli.width.is_none() || cli.height.is_none()) {
            bail!("--exact-resize requires both --width and --height");
        }

        Ok(())
    }
}
