//! # Execution Engine Module / 执行引擎模块
//!
//! The orchestration layer tying the pieces together: it resolves the
//! framework (running the detector when "auto" was requested), creates the
//! registry entry, and drives each run as a single awaitable task that
//! feeds progress and the terminal outcome back into the registry. The
//! caller gets a run id immediately, or awaits the terminal snapshot,
//! depending on the entry point.
//!
//! 将各部分联系在一起的编排层：它解析框架（请求 "auto" 时运行
//! 检测器），创建注册表条目，并将每次运行作为单个可等待任务驱动，
//! 把进度和终态结果反馈到注册表。根据入口点不同，调用方会立即获得
//! 运行 id，或等待终态快照。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::config::RunnerConfig;
use crate::core::framework::{DetectFramework, Framework, FrameworkChoice};
use crate::core::models::{EngineError, RunStatus, TestRun};
use crate::core::parser;
use crate::core::registry::{RunParams, RunRegistry, RunUpdate};
use crate::infra::command::{self, CommandError, ProcessCommand};
use crate::infra::detect::ConfigScanDetector;
use crate::infra::fs;

/// A run submission. `framework` may be `Auto`; it is resolved to a
/// concrete value before any run record exists.
///
/// 一次运行提交。`framework` 可以是 `Auto`；
/// 它会在任何运行记录存在之前被解析为具体值。
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub directory: PathBuf,
    pub test_pattern: Option<String>,
    pub framework: FrameworkChoice,
    pub coverage: bool,
    pub timeout_ms: u64,
}

/// Orchestrates runs against one registry. Cheap to share behind an `Arc`;
/// all state lives in the registry.
///
/// 针对一个注册表编排运行。放在 `Arc` 后共享的成本很低；
/// 所有状态都位于注册表中。
pub struct ExecutionEngine {
    registry: Arc<RunRegistry>,
    detector: Arc<dyn DetectFramework>,
    config: RunnerConfig,
    cancel: CancellationToken,
}

impl ExecutionEngine {
    /// Creates an engine with the default config-scanning detector.
    pub fn new(registry: Arc<RunRegistry>, config: RunnerConfig) -> Self {
        Self::with_detector(registry, config, Arc::new(ConfigScanDetector))
    }

    /// Creates an engine with an injected detector, for tests and embedders.
    /// 使用注入的检测器创建引擎，供测试和嵌入方使用。
    pub fn with_detector(
        registry: Arc<RunRegistry>,
        config: RunnerConfig,
        detector: Arc<dyn DetectFramework>,
    ) -> Self {
        Self {
            registry,
            detector,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn registry(&self) -> Arc<RunRegistry> {
        Arc::clone(&self.registry)
    }

    /// Token cancelling every in-flight run this engine spawned. Used to
    /// wire a Ctrl-C handler; cancellation is explicit, never an ad hoc flag.
    ///
    /// 取消此引擎派生的所有进行中运行的令牌。用于接入 Ctrl-C 处理；
    /// 取消是显式操作，而不是临时标志位。
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Resolves `Auto` through the detector. A `None` verdict fails fast
    /// with the detector's evidence, before any run record is created.
    ///
    /// 通过检测器解析 `Auto`。`None` 判定会在创建任何运行记录之前
    /// 携带检测器的证据快速失败。
    fn resolve_framework(
        &self,
        choice: FrameworkChoice,
        directory: &Path,
    ) -> Result<Framework, EngineError> {
        match choice {
            FrameworkChoice::Explicit(framework) => Ok(framework),
            FrameworkChoice::Auto => {
                let detection = self.detector.detect(directory);
                detection
                    .framework
                    .ok_or(EngineError::DetectionFailed(detection.evidence))
            }
        }
    }

    /// Picks the command for a request: a configured override wins,
    /// otherwise the framework's built-in invocation (coverage variant
    /// when requested).
    fn resolve_command(
        &self,
        framework: Framework,
        request: &RunRequest,
    ) -> Result<ProcessCommand, EngineError> {
        match self.config.command_override(framework)? {
            Some(override_cmd) => Ok(override_cmd),
            None if request.coverage => Ok(framework.coverage_command()),
            None => Ok(framework.test_command(request.test_pattern.as_deref())),
        }
    }

    /// Submits a run and returns its initial `Running` snapshot without
    /// waiting for the process. The run continues in the background; its
    /// outcome is only observable through the registry / status API.
    ///
    /// 提交一次运行并返回其初始 `Running` 快照，而不等待进程。
    /// 运行在后台继续；其结果只能通过注册表/状态 API 观察到。
    pub fn submit(&self, request: RunRequest) -> Result<TestRun, EngineError> {
        let (run, _handle) = self.spawn_run(request)?;
        Ok(run)
    }

    /// Submits a run and awaits its terminal snapshot.
    /// 提交一次运行并等待其终态快照。
    pub async fn run_to_completion(&self, request: RunRequest) -> Result<TestRun, EngineError> {
        let (run, handle) = self.spawn_run(request)?;
        // The driver task never panics in normal operation; a join error
        // would leave the record Running, which the lookup below reports.
        let _ = handle.await;
        self.registry
            .get(&run.run_id)
            .ok_or(EngineError::UnknownRunId(run.run_id))
    }

    /// Variant of submit scoped to one test file. The file's existence is
    /// validated first, failing fast with `FileNotFound` before any
    /// process is spawned or record created.
    ///
    /// 作用于单个测试文件的提交变体。先验证文件存在性，
    /// 在派生任何进程或创建记录之前以 `FileNotFound` 快速失败。
    pub fn submit_single_file(
        &self,
        file: &Path,
        framework: FrameworkChoice,
        coverage: bool,
        timeout_ms: u64,
    ) -> Result<TestRun, EngineError> {
        if !fs::file_exists(file) {
            return Err(EngineError::FileNotFound(file.to_path_buf()));
        }

        let directory = file
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        let framework = self.resolve_framework(framework, &directory)?;
        let command = match self.config.command_override(framework)? {
            Some(override_cmd) => override_cmd,
            None => framework.single_file_command(file),
        };

        let params = RunParams {
            framework,
            directory,
            test_pattern: Some(file.display().to_string()),
            coverage,
            timeout_ms,
        };
        Ok(self.spawn_prepared(params, command))
    }

    fn spawn_run(&self, request: RunRequest) -> Result<(TestRun, JoinHandle<()>), EngineError> {
        let framework = self.resolve_framework(request.framework, &request.directory)?;
        let command = self.resolve_command(framework, &request)?;

        let params = RunParams {
            framework,
            directory: request.directory,
            test_pattern: request.test_pattern,
            coverage: request.coverage,
            timeout_ms: request.timeout_ms,
        };
        Ok(self.spawn_prepared_with_handle(params, command))
    }

    fn spawn_prepared(&self, params: RunParams, command: ProcessCommand) -> TestRun {
        self.spawn_prepared_with_handle(params, command).0
    }

    fn spawn_prepared_with_handle(
        &self,
        params: RunParams,
        command: ProcessCommand,
    ) -> (TestRun, JoinHandle<()>) {
        let run = self.registry.create(params);
        let handle = tokio::spawn(drive_run(
            Arc::clone(&self.registry),
            run.run_id.clone(),
            run.framework,
            run.directory.clone(),
            command,
            run.timeout_ms,
            self.cancel.child_token(),
        ));
        (run, handle)
    }
}

/// Drives one run to its terminal state. This is the only task that
/// mutates the run's record after creation, so per-run updates never race
/// each other; the registry serializes updates across runs.
///
/// 将一次运行驱动到终态。这是创建后唯一修改该运行记录的任务，
/// 因此同一运行的更新之间不会竞争；注册表对跨运行的更新做序列化。
async fn drive_run(
    registry: Arc<RunRegistry>,
    run_id: String,
    framework: Framework,
    directory: PathBuf,
    command: ProcessCommand,
    timeout_ms: u64,
    cancel: CancellationToken,
) {
    let timeout = Duration::from_millis(timeout_ms);

    let progress_registry = Arc::clone(&registry);
    let progress_id = run_id.clone();
    let on_progress = move |progress: u8| {
        progress_registry.update(&progress_id, RunUpdate::progress(progress));
    };

    let outcome = tokio::select! {
        outcome = command::run_with_deadline(&command, &directory, timeout, on_progress) => outcome,
        _ = cancel.cancelled() => {
            // Dropping the executor future kills the child via kill_on_drop.
            registry.update(
                &run_id,
                RunUpdate::terminal(
                    RunStatus::Failed,
                    "run cancelled before completion".to_string(),
                ),
            );
            return;
        }
    };

    match outcome {
        Ok(raw) => {
            let (results, warning) = parser::parse_outcome(framework, &raw);
            registry.update(&run_id, RunUpdate::completed(results, warning));
        }
        Err(CommandError::Timeout(ms)) => {
            registry.update(
                &run_id,
                RunUpdate::terminal(RunStatus::TimedOut, EngineError::Timeout(ms).to_string()),
            );
        }
        Err(CommandError::Spawn(message)) => {
            registry.update(
                &run_id,
                RunUpdate::terminal(RunStatus::Failed, EngineError::Spawn(message).to_string()),
            );
        }
    }
}
