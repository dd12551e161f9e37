//! # Data Models Module / 数据模型模块
//!
//! This module defines the core data structures used throughout the runner.
//! It includes models for run records, normalized test results, coverage
//! reports and the engine's error taxonomy.
//!
//! 此模块定义了整个运行器中使用的核心数据结构。
//! 它包括运行记录、归一化测试结果、覆盖率报告以及引擎错误分类的模型。

use crate::core::framework::Framework;
use crate::infra::t;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Opaque identifier for a single submitted run.
/// 单次提交运行的不透明标识符。
pub type RunId = String;

/// The lifecycle state of a [`TestRun`].
/// `Running` is the sole initial state; the other three are terminal and
/// a run leaves `Running` at most once.
///
/// [`TestRun`] 的生命周期状态。
/// `Running` 是唯一的初始状态；其余三个是终态，
/// 一次运行最多只会离开 `Running` 一次。
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The external process is still executing.
    /// 外部进程仍在执行。
    Running,
    /// The process exited and its output was parsed (fully or via fallback).
    /// A completed run may still have failing tests.
    /// 进程已退出且其输出已被解析（完整解析或回退解析）。
    /// 已完成的运行仍可能包含失败的测试。
    Completed,
    /// The process could not be spawned.
    /// 进程无法被派生。
    Failed,
    /// The process exceeded its wall-clock timeout and was killed.
    /// 进程超出其墙钟超时时间并被终止。
    TimedOut,
}

impl RunStatus {
    /// `true` for `Completed`, `Failed` and `TimedOut`; no transition leaves them.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Running)
    }

    /// Gets the status as a localized string for display.
    /// 以字符串形式获取状态以供显示。
    pub fn label(&self, locale: &str) -> String {
        match self {
            RunStatus::Running => t!("report.status_running", locale = locale).to_string(),
            RunStatus::Completed => t!("report.status_completed", locale = locale).to_string(),
            RunStatus::Failed => t!("report.status_failed", locale = locale).to_string(),
            RunStatus::TimedOut => t!("report.status_timed_out", locale = locale).to_string(),
        }
    }
}

/// The normalized outcome of one external test process, independent of the
/// framework that produced it.
///
/// 一次外部测试进程的归一化结果，与产生它的框架无关。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Number of passing test units.
    /// 通过的测试单元数量。
    pub passed: u32,
    /// Number of failing test units.
    /// 失败的测试单元数量。
    pub failed: u32,
    /// Ordered per-test failure messages. May be empty even when
    /// `failed > 0` if the report did not enumerate individual failures.
    /// 按顺序排列的单个测试失败消息。如果报告没有列举单个失败，
    /// 即使 `failed > 0` 也可能为空。
    pub errors: Vec<String>,
    /// Wall-clock duration of the external process, in milliseconds.
    /// 外部进程的墙钟持续时间（毫秒）。
    pub duration_ms: u64,
    /// Captured stdout/stderr, retained for diagnostics and for post-hoc
    /// coverage parsing.
    /// 捕获的 stdout/stderr，保留用于诊断和事后覆盖率解析。
    pub raw: String,
}

/// One record per submitted execution. The registry is the only owner of
/// these records; everything else works on clones.
///
/// 每次提交的执行对应一条记录。注册表是这些记录的唯一所有者；
/// 其他组件只在克隆上工作。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestRun {
    /// Unique identifier, generated at creation, immutable.
    /// 创建时生成的唯一标识符，不可变。
    pub run_id: RunId,
    /// The concrete framework this run executes under. "auto" is resolved
    /// before any record is created, so this is never ambiguous.
    /// 此运行所使用的具体框架。"auto" 在创建任何记录之前就已解析，
    /// 因此这里永远不会有歧义。
    pub framework: Framework,
    /// Current lifecycle state.
    /// 当前生命周期状态。
    pub status: RunStatus,
    /// 0-100, monotonically non-decreasing while running, frozen at 100
    /// once terminal.
    /// 0-100，运行期间单调不减，进入终态后固定为 100。
    pub progress: u8,
    /// Creation timestamp, taken from the registry clock.
    /// 创建时间戳，取自注册表时钟。
    pub start_time: DateTime<Utc>,
    /// Working directory the external process runs in.
    /// 外部进程运行所在的工作目录。
    pub directory: PathBuf,
    /// Optional test name/path pattern forwarded to the framework.
    /// 转发给框架的可选测试名称/路径模式。
    pub test_pattern: Option<String>,
    /// Whether the coverage-enabled command variant was requested.
    /// 是否请求了启用覆盖率的命令变体。
    pub coverage_requested: bool,
    /// Hard wall-clock timeout for the external process.
    /// 外部进程的硬性墙钟超时时间。
    pub timeout_ms: u64,
    /// Present only once terminal and parsing succeeded (fully or via
    /// fallback). A timed-out run never carries results.
    /// 仅在进入终态且解析成功（完整或回退）后存在。
    /// 超时的运行永远不会携带结果。
    pub results: Option<TestResult>,
    /// Diagnostics: populated on `Failed`/`TimedOut`, and alongside a
    /// fallback-parsed result to flag degraded parsing.
    /// 诊断信息：在 `Failed`/`TimedOut` 时填充，
    /// 并在回退解析结果时一并填充以标记解析降级。
    pub errors: Vec<String>,
}

impl TestRun {
    /// Checks whether the run has reached one of the three terminal states.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// Coverage numbers for a single file.
/// 单个文件的覆盖率数据。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileCoverage {
    /// Path of the covered file, as reported by the coverage tool.
    /// 覆盖率工具报告的被覆盖文件路径。
    pub path: String,
    /// Units (lines/statements) exercised at least once.
    /// 至少被执行过一次的单元（行/语句）。
    pub covered_units: u64,
    /// Units never exercised.
    /// 从未被执行的单元。
    pub uncovered_units: u64,
    /// `covered / total * 100`, `0.0` when the file has no units.
    /// `covered / total * 100`，文件没有单元时为 `0.0`。
    pub coverage_percent: f64,
}

impl FileCoverage {
    pub fn new(path: impl Into<String>, covered_units: u64, uncovered_units: u64) -> Self {
        Self {
            path: path.into(),
            covered_units,
            uncovered_units,
            coverage_percent: percent(covered_units, covered_units + uncovered_units),
        }
    }
}

/// Normalized coverage report, aggregated over all files the external tool
/// reported. Independent of [`TestResult`].
///
/// 归一化的覆盖率报告，聚合了外部工具报告的所有文件。
/// 与 [`TestResult`] 相互独立。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Per-file breakdown.
    /// 按文件的明细。
    pub files: Vec<FileCoverage>,
    /// Aggregate percentage over all files.
    /// 所有文件的聚合百分比。
    pub coverage_percent: f64,
    /// Total units across all files.
    /// 所有文件的单元总数。
    pub total_units: u64,
    /// Covered units across all files.
    /// 所有文件的已覆盖单元数。
    pub covered_units: u64,
    /// Non-fatal problems hit while locating or reading the artifact.
    /// 定位或读取产物时遇到的非致命问题。
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl CoverageReport {
    /// Builds a report from per-file entries, summing units into the
    /// aggregate numbers.
    pub fn from_files(files: Vec<FileCoverage>) -> Self {
        let covered_units: u64 = files.iter().map(|f| f.covered_units).sum();
        let total_units: u64 = files
            .iter()
            .map(|f| f.covered_units + f.uncovered_units)
            .sum();
        Self {
            files,
            coverage_percent: percent(covered_units, total_units),
            total_units,
            covered_units,
            warnings: Vec::new(),
        }
    }

    /// A zero-valued report carrying a single warning, used when the
    /// coverage artifact is absent or malformed.
    pub fn empty_with_warning(warning: impl Into<String>) -> Self {
        Self {
            files: Vec::new(),
            coverage_percent: 0.0,
            total_units: 0,
            covered_units: 0,
            warnings: vec![warning.into()],
        }
    }
}

/// `covered / total * 100`. A zero total yields `0.0`, not a division error.
/// `covered / total * 100`。总数为零时得到 `0.0`，而不是除法错误。
pub fn percent(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64 * 100.0
    }
}

/// The engine's error taxonomy. Pre-spawn errors are returned synchronously
/// and never produce a [`TestRun`]; post-spawn failures only ever surface
/// through the run record itself.
///
/// 引擎的错误分类。派生前的错误同步返回且永远不会产生 [`TestRun`]；
/// 派生后的失败只会通过运行记录本身呈现。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// "auto" was requested and no framework could be inferred. Carries the
    /// detector's evidence list.
    /// 请求了 "auto" 但无法推断出任何框架。携带检测器的证据列表。
    DetectionFailed(Vec<String>),
    /// A single-file run named a path that does not exist.
    /// 单文件运行指定了不存在的路径。
    FileNotFound(PathBuf),
    /// The caller named a framework the engine has no strategy for.
    /// 调用方指定了引擎没有对应策略的框架。
    UnsupportedFramework(String),
    /// The executable could not be located or refused to start.
    /// 可执行文件无法定位或拒绝启动。
    Spawn(String),
    /// The deadline elapsed before the process exited.
    /// 进程退出前截止时间已到。
    Timeout(u64),
    /// Structured/textual parsing failed. Recovered internally via the
    /// exit-code fallback; never surfaced as a hard failure.
    /// 结构化/文本解析失败。通过退出码回退在内部恢复；
    /// 永远不会作为硬失败呈现。
    Parse(String),
    /// Status query for a run that was never issued or has been swept away.
    /// 查询从未签发或已被清理的运行状态。
    UnknownRunId(RunId),
    /// The configuration file or a command override in it is invalid.
    /// 配置文件或其中的命令覆盖无效。
    Config(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::DetectionFailed(evidence) => {
                write!(
                    f,
                    "no test framework could be detected (checked: {})",
                    evidence.join("; ")
                )
            }
            EngineError::FileNotFound(path) => {
                write!(f, "test file not found: {}", path.display())
            }
            EngineError::UnsupportedFramework(name) => {
                write!(f, "unsupported framework: {}", name)
            }
            EngineError::Spawn(message) => {
                write!(f, "failed to spawn test process: {}", message)
            }
            EngineError::Timeout(ms) => write!(f, "execution exceeded {}ms timeout", ms),
            EngineError::Parse(message) => {
                write!(f, "failed to parse test output: {}", message)
            }
            EngineError::UnknownRunId(run_id) => write!(f, "unknown run id: {}", run_id),
            EngineError::Config(message) => write!(f, "invalid configuration: {}", message),
        }
    }
}

impl std::error::Error for EngineError {}
