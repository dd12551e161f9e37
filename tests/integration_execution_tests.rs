//! # Execution Engine Integration Tests / 执行引擎集成测试
//!
//! These tests drive real external processes through the engine: the
//! framework command is overridden with small shell scripts so every
//! lifecycle path (completion, structured and fallback parsing, timeout,
//! spawn failure, pre-spawn validation) is exercised end to end against
//! the registry and status API.
//!
//! 这些测试通过引擎驱动真实的外部进程：框架命令被覆盖为小的 shell
//! 脚本，从而针对注册表和状态 API 端到端地演练每条生命周期路径
//! （完成、结构化与回退解析、超时、派生失败、派生前校验）。

mod common;

use poly_runner::core::execution::{ExecutionEngine, RunRequest};
use poly_runner::core::framework::{Framework, FrameworkChoice};
use poly_runner::core::models::{EngineError, RunStatus, TestRun};
use poly_runner::core::registry::RunRegistry;
use poly_runner::core::status::StatusApi;
use std::sync::Arc;
use std::time::Duration;

/// Polls the registry until the run leaves `Running`.
async fn wait_terminal(registry: &RunRegistry, run_id: &str) -> TestRun {
    for _ in 0..400 {
        if let Some(run) = registry.get(run_id) {
            if run.is_terminal() {
                return run;
            }
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("run did not reach a terminal state in time");
}

#[cfg(unix)]
mod completion_tests {
    use super::*;

    /// A process that exits 0 after printing a structured report yields
    /// exact counts and an empty diagnostic list.
    #[tokio::test]
    async fn test_structured_report_completes_with_exact_counts() {
        // The override runs in the project directory; shell quoting would
        // mangle the inline JSON, so the fake runner just cats a report.
        let project = common::project_with_files(&[(
            "report.json",
            r#"{"numPassedTests":5,"numFailedTests":0,"testResults":[]}"#,
        )]);
        let (engine, registry) =
            common::engine_with_override(Framework::Jest, "cat report.json");

        let run = engine
            .run_to_completion(common::request(
                project.path().to_path_buf(),
                Framework::Jest,
                5000,
            ))
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.progress, 100);
        assert!(run.errors.is_empty());
        let results = run.results.unwrap();
        assert_eq!(results.passed, 5);
        assert_eq!(results.failed, 0);
        assert!(results.errors.is_empty());

        // The same terminal state is visible through the registry.
        let stored = registry.get(&run.run_id).unwrap();
        assert_eq!(stored.status, RunStatus::Completed);
    }

    /// A nonzero exit still completes; "completed" means "finished
    /// executing", not "all tests passed".
    #[tokio::test]
    async fn test_failing_tests_still_complete() {
        let (engine, _registry) = common::engine_with_override(
            Framework::Pytest,
            "sh -c 'echo \"1 failed, 4 passed in 0.2s\"; exit 1'",
        );
        let project = common::empty_project();

        let run = engine
            .run_to_completion(common::request(
                project.path().to_path_buf(),
                Framework::Pytest,
                5000,
            ))
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Completed);
        let results = run.results.unwrap();
        assert_eq!(results.passed, 4);
        assert_eq!(results.failed, 1);
    }

    /// Unparseable output degrades to the exit-code fallback and flags the
    /// run with a diagnostic, never an unhandled error.
    #[tokio::test]
    async fn test_malformed_report_falls_back_with_diagnostic() {
        let (engine, _registry) = common::engine_with_override(
            Framework::Jest,
            "sh -c 'echo this is not a report'",
        );
        let project = common::empty_project();

        let run = engine
            .run_to_completion(common::request(
                project.path().to_path_buf(),
                Framework::Jest,
                5000,
            ))
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Completed);
        let results = run.results.unwrap();
        assert_eq!(results.passed, 1);
        assert_eq!(results.failed, 0);
        assert!(!run.errors.is_empty());
        assert!(run.errors[0].contains("exit code 0"));
    }
}

#[cfg(unix)]
mod failure_tests {
    use super::*;

    /// A process exceeding its budget ends as `TimedOut` with no results
    /// and the exact timeout diagnostic.
    #[tokio::test]
    async fn test_timeout_discards_results_and_records_diagnostic() {
        let (engine, registry) =
            common::engine_with_override(Framework::Cargo, "sh -c 'sleep 30'");
        let project = common::empty_project();

        let run = engine
            .run_to_completion(common::request(
                project.path().to_path_buf(),
                Framework::Cargo,
                300,
            ))
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::TimedOut);
        assert!(run.results.is_none());
        assert_eq!(run.errors, vec!["execution exceeded 300ms timeout".to_string()]);
        assert_eq!(run.progress, 100);

        let stored = registry.get(&run.run_id).unwrap();
        assert_eq!(stored.status, RunStatus::TimedOut);
    }

    /// A missing executable fails the run without consuming the timeout.
    #[tokio::test]
    async fn test_missing_executable_fails_fast() {
        let (engine, _registry) = common::engine_with_override(
            Framework::Mocha,
            "definitely-not-a-real-binary-4242",
        );
        let project = common::empty_project();

        let started = std::time::Instant::now();
        let run = engine
            .run_to_completion(common::request(
                project.path().to_path_buf(),
                Framework::Mocha,
                60_000,
            ))
            .await
            .unwrap();

        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.results.is_none());
        assert!(run.errors[0].contains("failed to spawn test process"));
        // Far below the 60s budget: spawn errors never wait on the deadline.
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}

mod validation_tests {
    use super::*;

    /// "auto" against an unrecognizable directory is rejected before any
    /// run record exists.
    #[tokio::test]
    async fn test_auto_detection_failure_creates_no_run() {
        let registry = Arc::new(RunRegistry::new(chrono::Duration::hours(1)));
        let engine = ExecutionEngine::new(Arc::clone(&registry), Default::default());
        let project = common::empty_project();

        let err = engine
            .submit(RunRequest {
                directory: project.path().to_path_buf(),
                test_pattern: None,
                framework: FrameworkChoice::Auto,
                coverage: false,
                timeout_ms: 5000,
            })
            .unwrap_err();

        assert!(matches!(err, EngineError::DetectionFailed(ref evidence) if !evidence.is_empty()));
        assert!(registry.is_empty());
    }

    /// A single-file run on a nonexistent path fails fast before spawning.
    #[tokio::test]
    async fn test_single_file_on_missing_path_creates_no_run() {
        let registry = Arc::new(RunRegistry::new(chrono::Duration::hours(1)));
        let engine = ExecutionEngine::new(Arc::clone(&registry), Default::default());

        let err = engine
            .submit_single_file(
                std::path::Path::new("/definitely/missing/login.spec.js"),
                FrameworkChoice::Explicit(Framework::Jest),
                false,
                5000,
            )
            .unwrap_err();

        assert!(matches!(err, EngineError::FileNotFound(_)));
        assert!(registry.is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_single_file_run_executes_in_the_parent_directory() {
        let project = common::project_with_files(&[("login.spec.js", "// spec")]);
        let file = project.path().join("login.spec.js");

        let (engine, registry) =
            common::engine_with_override(Framework::Jest, "sh -c 'echo ran'");
        let run = engine
            .submit_single_file(
                &file,
                FrameworkChoice::Explicit(Framework::Jest),
                false,
                5000,
            )
            .unwrap();

        assert_eq!(run.directory, project.path());
        assert_eq!(run.test_pattern.as_deref(), Some(file.to_str().unwrap()));

        let finished = wait_terminal(&registry, &run.run_id).await;
        assert_eq!(finished.status, RunStatus::Completed);
    }
}

#[cfg(unix)]
mod status_polling_tests {
    use super::*;

    /// Submission returns immediately; successive status queries observe
    /// non-decreasing progress and exactly one terminal state.
    #[tokio::test]
    async fn test_progress_is_non_decreasing_across_polls() {
        let (engine, registry) =
            common::engine_with_override(Framework::Cargo, "sh -c 'sleep 1'");
        let project = common::empty_project();

        let run = engine
            .submit(common::request(
                project.path().to_path_buf(),
                Framework::Cargo,
                3000,
            ))
            .unwrap();
        assert_eq!(run.status, RunStatus::Running);

        let api = StatusApi::new(Arc::clone(&registry));
        let mut observed = Vec::new();
        loop {
            let snapshot = api.status(&run.run_id).unwrap();
            observed.push(snapshot.progress);
            if snapshot.status.is_terminal() {
                assert_eq!(snapshot.status, RunStatus::Completed);
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        assert!(observed.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*observed.last().unwrap(), 100);
    }

    #[tokio::test]
    async fn test_elapsed_is_computed_at_query_time() {
        let (engine, registry) =
            common::engine_with_override(Framework::Cargo, "sh -c 'sleep 0.4'");
        let project = common::empty_project();

        let run = engine
            .submit(common::request(
                project.path().to_path_buf(),
                Framework::Cargo,
                5000,
            ))
            .unwrap();

        let api = StatusApi::new(Arc::clone(&registry));
        let early = api.status(&run.run_id).unwrap().elapsed_ms;
        tokio::time::sleep(Duration::from_millis(200)).await;
        let later = api.status(&run.run_id).unwrap().elapsed_ms;
        assert!(later > early);

        wait_terminal(&registry, &run.run_id).await;
    }

    /// Concurrent runs never interfere with each other's records.
    #[tokio::test]
    async fn test_concurrent_runs_keep_separate_records() {
        let (engine, registry) = common::engine_with_override(
            Framework::Pytest,
            "sh -c 'echo \"2 passed in 0.1s\"'",
        );
        let project = common::empty_project();

        let mut run_ids = Vec::new();
        for _ in 0..8 {
            let run = engine
                .submit(common::request(
                    project.path().to_path_buf(),
                    Framework::Pytest,
                    5000,
                ))
                .unwrap();
            run_ids.push(run.run_id);
        }

        for run_id in &run_ids {
            let finished = wait_terminal(&registry, run_id).await;
            assert_eq!(finished.status, RunStatus::Completed);
            assert_eq!(finished.results.unwrap().passed, 2);
        }
        assert_eq!(registry.len(), 8);
    }
}
