//! HTTP backend for the remote rembg service
//!
//! Uploads the input image as `multipart/form-data` and streams the PNG the
//! service returns into a temporary file.

use crate::backends::{RemovalBackend, RemovalRequest, RemovedImage};
use crate::error::{BatchError, Result};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio_util::io::{ReaderStream, StreamReader};

/// Default removal endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.rembg.com/rmbg";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-api-key";

/// Multipart field carrying the image
const IMAGE_FIELD: &str = "image";

/// Options for [`RembgHttpBackend`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpBackendConfig {
    /// Removal endpoint URL
    pub endpoint: String,
    /// Whole-request timeout (None = wait indefinitely)
    pub timeout: Option<Duration>,
    /// Requested output width in pixels
    pub width: Option<u32>,
    /// Requested output height in pixels
    pub height: Option<u32>,
    /// Resize to exactly `width` x `height` instead of fitting
    pub exact_resize: bool,
    /// Return the alpha mask instead of the cut-out image
    pub mask: bool,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: None,
            width: None,
            height: None,
            exact_resize: false,
            mask: false,
        }
    }
}

impl HttpBackendConfig {
    /// Optional text fields sent alongside the image
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();
        if let Some(width) = self.width {
            fields.push(("w", width.to_string()));
        }
        if let Some(height) = self.height {
            fields.push(("h", height.to_string()));
        }
        if self.exact_resize {
            fields.push(("exact_resize", "true".to_string()));
        }
        if self.mask {
            fields.push(("mask", "true".to_string()));
        }
        fields
    }
}

/// Backend that calls the rembg HTTP API
#[derive(Debug, Clone)]
pub struct RembgHttpBackend {
    client: Client,
    config: HttpBackendConfig,
}

impl RembgHttpBackend {
    /// Create a backend with its own HTTP client
    ///
    /// # Errors
    /// - Failed to create HTTP client
    pub fn new(config: HttpBackendConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BatchError::network_error("Failed to create HTTP client", e))?;

        Ok(Self { client, config })
    }

    /// Create a backend around an existing client
    #[must_use]
    pub fn with_client(client: Client, config: HttpBackendConfig) -> Self {
        Self { client, config }
    }

    /// Backend configuration
    #[must_use]
    pub fn config(&self) -> &HttpBackendConfig {
        &self.config
    }

    async fn image_part(input_path: &Path) -> Result<Part> {
        let file = tokio::fs::File::open(input_path)
            .await
            .map_err(|e| BatchError::file_io_error("open input image", input_path, &e))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| BatchError::file_io_error("read input metadata", input_path, &e))?
            .len();

        let file_name = input_path
            .file_name()
            .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());

        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), length)
            .file_name(file_name);

        match mime_for(input_path) {
            Some(mime) => part
                .mime_str(mime)
                .map_err(|e| BatchError::network_error("Invalid image content type", e)),
            None => Ok(part),
        }
    }
}

/// Content type for common image extensions
fn mime_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "tif" | "tiff" => Some("image/tiff"),
        _ => None,
    }
}

#[async_trait]
impl RemovalBackend for RembgHttpBackend {
    async fn remove_background(&self, request: RemovalRequest<'_>) -> Result<RemovedImage> {
        let input_path = request.input_path;
        tracing::debug!(
            endpoint = %self.config.endpoint,
            input = %input_path.display(),
            "Uploading image to removal service"
        );

        let mut form = Form::new().part(IMAGE_FIELD, Self::image_part(input_path).await?);
        for (name, value) in self.config.form_fields() {
            form = form.text(name, value);
        }

        let response = self
            .client
            .post(&self.config.endpoint)
            .header(API_KEY_HEADER, request.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BatchError::Api {
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let temp_file = tempfile::Builder::new()
            .prefix("rembg-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| {
                BatchError::file_io_error("create temporary file", std::env::temp_dir(), &e)
            })?;
        let (std_file, temp_path) = temp_file.into_parts();
        let mut file = tokio::fs::File::from_std(std_file);

        let mut stream = StreamReader::new(
            response
                .bytes_stream()
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e)),
        );
        let written = tokio::io::copy(&mut stream, &mut file)
            .await
            .map_err(|e| BatchError::network_error("Failed to download removal result", e))?;
        file.flush()
            .await
            .map_err(|e| BatchError::file_io_error("flush temporary file", &temp_path, &e))?;

        if written == 0 {
            return Err(BatchError::Api {
                status: status.as_u16(),
                body: "empty response body".to_string(),
            });
        }

        tracing::debug!(
            bytes = written,
            temp = %temp_path.display(),
            "Received removal result"
        );
        Ok(RemovedImage::new(temp_path))
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
