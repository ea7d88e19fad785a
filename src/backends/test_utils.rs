//! Test utilities and mock backends for testing batch functionality
//!
//! This module provides a mock implementation of the `RemovalBackend` trait
//! so the orchestration can be tested without network access.

use crate::{
    backends::{RemovalBackend, RemovalRequest, RemovedImage},
    error::{BatchError, Result},
};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Bytes written into every mock result
pub const MOCK_PNG: &[u8] = b"\x89PNG\r\n\x1a\nmock-cutout";

/// Mock removal backend for testing
#[derive(Debug, Clone, Default)]
pub struct MockRemovalBackend {
    /// File names that fail
    failing: HashSet<String>,
    /// Artificial latency per file name
    delays: HashMap<String, Duration>,
    /// File names in call order
    call_history: Arc<Mutex<Vec<String>>>,
    /// Temporary result paths handed out
    issued: Arc<Mutex<Vec<PathBuf>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockRemovalBackend {
    /// Create a mock backend where every file succeeds
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `file_name` fail
    #[must_use]
    pub fn failing_on(mut self, file_name: &str) -> Self {
        self.failing.insert(file_name.to_string());
        self
    }

    /// Delay the result for `file_name`
    #[must_use]
    pub fn with_delay(mut self, file_name: &str, delay: Duration) -> Self {
        self.delays.insert(file_name.to_string(), delay);
        self
    }

    /// Get the call history for verification in tests
    pub fn get_call_history(&self) -> Vec<String> {
        self.call_history.lock().unwrap().clone()
    }

    /// Temporary result paths handed out so far
    pub fn issued_paths(&self) -> Vec<PathBuf> {
        self.issued.lock().unwrap().clone()
    }

    /// Highest number of concurrent calls observed
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemovalBackend for MockRemovalBackend {
    async fn remove_background(&self, request: RemovalRequest<'_>) -> Result<RemovedImage> {
        let file_name = request
            .input_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.call_history.lock().unwrap().push(file_name.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(&file_name) {
            tokio::time::sleep(*delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&file_name) {
            return Err(BatchError::Api {
                status: 500,
                body: format!("mock failure for {}", file_name),
            });
        }

        let mut temp_file = tempfile::Builder::new().suffix(".png").tempfile()?;
        temp_file.write_all(MOCK_PNG)?;
        let temp_path = temp_file.into_temp_path();
        self.issued.lock().unwrap().push(temp_path.to_path_buf());
        Ok(RemovedImage::new(temp_path))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
