//! Integration tests for complete batch workflows
//!
//! These tests drive `BatchProcessor` end to end against scratch directories,
//! using a scripted backend instead of the remote service.

mod common;

use common::{file_names, RecordingReporter, ScriptedBackend, Workspace, CUTOUT_BYTES};
use rembg_batch::{
    run_batch, BatchConfig, BatchError, BatchProcessor, NoOpProgressReporter, ProcessResult,
    Result,
};
use std::collections::HashSet;
use std::sync::Arc;

fn status(results: &[ProcessResult]) -> Vec<(String, bool)> {
    let mut status: Vec<(String, bool)> = results
        .iter()
        .map(|r| (r.file.clone(), r.success))
        .collect();
    status.sort();
    status
}

fn sorted_files(results: &[ProcessResult]) -> Vec<String> {
    let mut files: Vec<String> = results.iter().map(|r| r.file.clone()).collect();
    files.sort();
    files
}

#[tokio::test]
async fn test_every_qualifying_file_gets_one_result() -> Result<()> {
    let workspace = Workspace::with_files(&["one.png", "two.jpg", "three.jpeg", "four.PNG"]);
    let backend = ScriptedBackend::new();

    let results = run_batch(
        workspace.config(Arc::new(NoOpProgressReporter)),
        Arc::new(backend.clone()),
    )
    .await?;

    assert_eq!(results.len(), 4);
    let unique: HashSet<_> = results.iter().map(|r| r.file.as_str()).collect();
    assert_eq!(unique.len(), 4);
    assert!(results.iter().all(|r| r.success));
    assert_eq!(backend.calls().len(), 4);

    assert_eq!(
        file_names(&workspace.output),
        vec!["four.png", "one.png", "three.png", "two.png"]
    );
    assert_eq!(std::fs::read(workspace.output.join("two.png"))?, CUTOUT_BYTES);
    Ok(())
}

#[tokio::test]
async fn test_mixed_directory_processes_only_images() -> Result<()> {
    let workspace = Workspace::with_files(&["a.png", "b.jpg", "c.txt"]);

    let results = run_batch(
        workspace.config(Arc::new(NoOpProgressReporter)),
        Arc::new(ScriptedBackend::new()),
    )
    .await?;

    assert_eq!(sorted_files(&results), vec!["a.png", "b.jpg"]);
    for result in &results {
        assert!(result.success);
        assert!(result.error.is_none());
        let output = result.output_path.as_ref().unwrap();
        assert_eq!(output.extension().unwrap(), "png");
        assert!(output.exists());
        assert_eq!(result.input_path, workspace.input.join(&result.file));
    }
    Ok(())
}

#[tokio::test]
async fn test_custom_extensions_exclude_defaults() -> Result<()> {
    let workspace = Workspace::with_files(&["a.png", "b.webp", "c.WEBP"]);
    let config = BatchConfig::builder()
        .api_key("test-api-key")
        .input_dir(&workspace.input)
        .output_dir(&workspace.output)
        .extensions(["webp"])
        .reporter(Arc::new(NoOpProgressReporter))
        .build()?;

    let results = run_batch(config, Arc::new(ScriptedBackend::new())).await?;

    assert_eq!(sorted_files(&results), vec!["b.webp", "c.WEBP"]);
    Ok(())
}

#[tokio::test]
async fn test_failing_file_does_not_abort_batch() -> Result<()> {
    let workspace = Workspace::with_files(&["good.png", "x.png", "fine.jpg"]);
    let reporter = Arc::new(RecordingReporter::default());

    let results = run_batch(
        workspace.config(reporter.clone()),
        Arc::new(ScriptedBackend::new().failing_on("x.png")),
    )
    .await?;

    assert_eq!(results.len(), 3);
    let failed = results.iter().find(|r| r.file == "x.png").unwrap();
    assert!(!failed.success);
    assert!(failed.output_path.is_none());
    let message = failed.error.as_deref().unwrap();
    assert!(!message.is_empty());
    assert!(message.contains("could not process x.png"));

    assert_eq!(results.iter().filter(|r| r.success).count(), 2);
    assert!(!workspace.output.join("x.png").exists());

    let errors = reporter.errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].file, "x.png");
    assert_eq!(errors[0].error, message);
    Ok(())
}

#[tokio::test]
async fn test_progress_events_in_dispatch_order() -> Result<()> {
    let workspace = Workspace::with_files(&["a.png", "b.png", "c.png"]);
    let reporter = Arc::new(RecordingReporter::default());

    let results = run_batch(
        workspace.config(reporter.clone()),
        Arc::new(ScriptedBackend::new()),
    )
    .await?;

    let progress = reporter.progress();
    assert_eq!(progress.len(), 3);
    for (index, event) in progress.iter().enumerate() {
        assert_eq!(event.current, index + 1);
        assert_eq!(event.total, 3);
    }
    assert_eq!(
        progress.iter().map(|e| e.percent).collect::<Vec<_>>(),
        vec![33, 67, 100]
    );

    // Results follow the same input order as the progress events
    let dispatched: Vec<_> = progress.iter().map(|e| e.file.clone()).collect();
    let returned: Vec<_> = results.iter().map(|r| r.file.clone()).collect();
    assert_eq!(dispatched, returned);
    Ok(())
}

#[tokio::test]
async fn test_empty_directory_returns_no_results() -> Result<()> {
    let workspace = Workspace::with_files(&[]);
    let reporter = Arc::new(RecordingReporter::default());
    let backend = ScriptedBackend::new();

    let results = run_batch(workspace.config(reporter.clone()), Arc::new(backend.clone())).await?;

    assert!(results.is_empty());
    assert!(reporter.progress().is_empty());
    assert!(backend.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_no_qualifying_files_returns_no_results() -> Result<()> {
    let workspace = Workspace::with_files(&["readme.md", "data.csv"]);
    std::fs::create_dir(workspace.input.join("nested.png"))?;
    let reporter = Arc::new(RecordingReporter::default());
    let backend = ScriptedBackend::new();

    let results = run_batch(workspace.config(reporter.clone()), Arc::new(backend.clone())).await?;

    assert!(results.is_empty());
    assert!(reporter.progress().is_empty());
    assert!(backend.calls().is_empty());
    // The output directory is still prepared
    assert!(workspace.output.is_dir());
    Ok(())
}

#[tokio::test]
async fn test_missing_input_dir_fails_before_progress() {
    let workspace = Workspace::with_files(&[]);
    let reporter = Arc::new(RecordingReporter::default());
    let mut config = workspace.config(reporter.clone());
    config.input_dir = workspace.root.path().join("does-not-exist");

    let err = run_batch(config, Arc::new(ScriptedBackend::new()))
        .await
        .unwrap_err();

    assert!(matches!(err, BatchError::InputNotFound(_)));
    assert!(err.to_string().contains("does-not-exist"));
    assert!(reporter.progress().is_empty());
}

#[tokio::test]
async fn test_missing_output_dir_without_creation_fails() {
    let workspace = Workspace::with_files(&["a.png"]);
    let reporter = Arc::new(RecordingReporter::default());
    let mut config = workspace.config(reporter.clone());
    config.create_output_dir = false;
    let backend = ScriptedBackend::new();

    let err = run_batch(config, Arc::new(backend.clone()))
        .await
        .unwrap_err();

    assert!(matches!(err, BatchError::OutputNotFound(_)));
    assert!(!workspace.output.exists());
    assert!(reporter.progress().is_empty());
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_missing_output_dir_is_created_recursively() -> Result<()> {
    let workspace = Workspace::with_files(&["a.png"]);
    let mut config = workspace.config(Arc::new(NoOpProgressReporter));
    let nested = workspace.root.path().join("deep").join("er").join("out");
    config.output_dir = nested.clone();

    let results = run_batch(config, Arc::new(ScriptedBackend::new())).await?;

    assert!(nested.is_dir());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].output_path.as_deref(), Some(nested.join("a.png").as_path()));
    Ok(())
}

#[tokio::test]
async fn test_repeated_runs_are_idempotent() -> Result<()> {
    let workspace = Workspace::with_files(&["a.png", "b.jpg", "x.png"]);
    let backend = ScriptedBackend::new().failing_on("x.png");
    let processor = BatchProcessor::new(
        workspace.config(Arc::new(NoOpProgressReporter)),
        Arc::new(backend),
    );

    let first = processor.run().await?;
    let second = processor.run().await?;

    assert_eq!(status(&first), status(&second));
    assert_eq!(file_names(&workspace.output), vec!["a.png", "b.png"]);
    Ok(())
}

#[tokio::test]
async fn test_temporary_results_are_removed() -> Result<()> {
    let workspace = Workspace::with_files(&["a.png", "b.png"]);
    let backend = ScriptedBackend::new();

    run_batch(
        workspace.config(Arc::new(NoOpProgressReporter)),
        Arc::new(backend.clone()),
    )
    .await?;

    let temp_files = backend.temp_files();
    assert_eq!(temp_files.len(), 2);
    for path in temp_files {
        assert!(!path.exists(), "{} should be cleaned up", path.display());
    }
    Ok(())
}
