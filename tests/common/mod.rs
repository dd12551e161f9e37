// Shared test helpers for integration tests
use std::fs;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

use poly_runner::core::config::RunnerConfig;
use poly_runner::core::execution::{ExecutionEngine, RunRequest};
use poly_runner::core::framework::{Framework, FrameworkChoice};
use poly_runner::core::registry::RunRegistry;
use std::sync::Arc;

/// Creates an empty temporary project directory.
pub fn empty_project() -> TempDir {
    tempdir().expect("Failed to create temporary directory")
}

/// Creates a temporary project directory containing the given files.
/// Contents are written verbatim; parent directories are created as needed.
pub fn project_with_files(files: &[(&str, &str)]) -> TempDir {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    for (name, content) in files {
        let path = temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&path, content).expect("Failed to write fixture file");
    }
    temp_dir
}

/// Builds an engine whose command for `framework` is overridden with a
/// shell line, so integration tests can script the external process.
pub fn engine_with_override(
    framework: Framework,
    command_line: &str,
) -> (ExecutionEngine, Arc<RunRegistry>) {
    let mut config = RunnerConfig::default();
    config
        .commands
        .insert(framework.as_str().to_string(), command_line.to_string());
    let registry = Arc::new(RunRegistry::new(chrono::Duration::hours(1)));
    let engine = ExecutionEngine::new(Arc::clone(&registry), config);
    (engine, registry)
}

/// A run request with explicit framework and no pattern.
pub fn request(directory: PathBuf, framework: Framework, timeout_ms: u64) -> RunRequest {
    RunRequest {
        directory,
        test_pattern: None,
        framework: FrameworkChoice::Explicit(framework),
        coverage: false,
        timeout_ms,
    }
}
