//! Filesystem operations service
//!
//! This module separates directory checks, listing and copying from the batch
//! logic, making the orchestrator testable against scratch directories.

use crate::error::{BatchError, Result};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

const STAGING_PREFIX: &str = ".rembg-staged-";

/// Service for handling filesystem input/output operations
pub struct ImageIOService;

impl ImageIOService {
    /// Check that the input directory exists and is a directory
    ///
    /// # Errors
    /// - [`BatchError::InputNotFound`] when the path is missing, unreadable or
    ///   not a directory
    pub async fn ensure_input_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path_ref = path.as_ref();
        match tokio::fs::metadata(path_ref).await {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => {
                log::debug!("Input path is not a directory: {}", path_ref.display());
                Err(BatchError::InputNotFound(path_ref.to_path_buf()))
            },
            Err(e) => {
                log::debug!("Cannot access input directory {}: {}", path_ref.display(), e);
                Err(BatchError::InputNotFound(path_ref.to_path_buf()))
            },
        }
    }

    /// Make sure the output directory exists, creating it when allowed
    ///
    /// # Arguments
    /// * `path` - Output directory
    /// * `create` - Create the directory (recursively) when it is missing
    ///
    /// # Errors
    /// - [`BatchError::NotADirectory`] when the path exists but is not a directory
    /// - [`BatchError::OutputNotFound`] when it is missing and `create` is false
    /// - [`BatchError::Io`] when creation fails
    pub async fn ensure_output_dir<P: AsRef<Path>>(path: P, create: bool) -> Result<()> {
        let path_ref = path.as_ref();
        match tokio::fs::metadata(path_ref).await {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(BatchError::NotADirectory(path_ref.to_path_buf())),
            Err(_) if !create => Err(BatchError::OutputNotFound(path_ref.to_path_buf())),
            Err(_) => {
                tokio::fs::create_dir_all(path_ref).await.map_err(|e| {
                    BatchError::file_io_error("create output directory", path_ref, &e)
                })?;
                log::info!("Created output directory: {}", path_ref.display());
                Ok(())
            },
        }
    }

    /// List the regular files directly inside `dir` whose extension qualifies
    ///
    /// Entries are returned in directory listing order. Subdirectories are
    /// never descended into and never returned, whatever their name.
    ///
    /// # Errors
    /// - [`BatchError::Io`] when the directory cannot be read
    pub async fn list_qualifying_files<P: AsRef<Path>>(
        dir: P,
        extensions: &BTreeSet<String>,
    ) -> Result<Vec<PathBuf>> {
        let dir_ref = dir.as_ref();
        let mut entries = tokio::fs::read_dir(dir_ref)
            .await
            .map_err(|e| BatchError::file_io_error("read input directory", dir_ref, &e))?;

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BatchError::file_io_error("read input directory", dir_ref, &e))?
        {
            let path = entry.path();
            if !Self::has_qualifying_extension(&path, extensions) {
                continue;
            }
            if entry.file_name().to_str().is_none() {
                log::warn!("Skipping file with non UTF-8 name: {}", path.display());
                continue;
            }
            if Self::is_regular_file(&entry).await {
                files.push(path);
            } else {
                log::debug!("Skipping non-file entry: {}", path.display());
            }
        }

        Ok(files)
    }

    /// Whether the lowercase extension of `path` is in `extensions`
    #[must_use]
    pub fn has_qualifying_extension(path: &Path, extensions: &BTreeSet<String>) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| extensions.contains(&ext))
    }

    /// Copy a finished result to its destination, replacing any existing file
    ///
    /// The bytes are staged next to `to` and renamed into place, so writers
    /// racing on one destination each leave a complete file behind.
    ///
    /// # Errors
    /// - [`BatchError::Io`] when staging, copying or renaming fails
    pub async fn copy_output<P: AsRef<Path>, Q: AsRef<Path>>(from: P, to: Q) -> Result<u64> {
        let to_ref = to.as_ref();
        let parent = to_ref
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let staged = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempfile_in(parent)
            .map_err(|e| BatchError::file_io_error("stage output file", to_ref, &e))?
            .into_temp_path();

        // Dropping `staged` on any error below removes the partial file
        let copied = tokio::fs::copy(from.as_ref(), &staged)
            .await
            .map_err(|e| BatchError::file_io_error("write output file", to_ref, &e))?;
        staged
            .persist(to_ref)
            .map_err(|e| BatchError::file_io_error("write output file", to_ref, &e.error))?;

        log::debug!("Wrote {} bytes to {}", copied, to_ref.display());
        Ok(copied)
    }

    async fn is_regular_file(entry: &tokio::fs::DirEntry) -> bool {
        match entry.file_type().await {
            Ok(file_type) if file_type.is_symlink() => tokio::fs::metadata(entry.path())
                .await
                .map(|metadata| metadata.is_file())
                .unwrap_or(false),
            Ok(file_type) => file_type.is_file(),
            Err(_) => false,
        }
    }
}
