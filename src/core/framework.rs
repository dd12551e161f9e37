//! # Framework Module / 框架模块
//!
//! This module defines the closed set of supported test frameworks and how
//! each one is invoked. Adding a framework is a compile-time operation: the
//! enum is matched exhaustively by command construction, result parsing and
//! coverage collection.
//!
//! 此模块定义了受支持测试框架的封闭集合以及每个框架的调用方式。
//! 添加框架是一个编译期操作：命令构建、结果解析和覆盖率收集
//! 都对该枚举进行穷尽匹配。

use crate::core::models::EngineError;
use crate::infra::command::ProcessCommand;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// The closed set of frameworks the engine has an execution and parsing
/// strategy for. "auto" is not a member; it is resolved to one of these by
/// the detector before any run record exists.
///
/// 引擎拥有执行和解析策略的框架封闭集合。"auto" 不是成员；
/// 在任何运行记录存在之前，它会被检测器解析为其中之一。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framework {
    Jest,
    Vitest,
    Mocha,
    Pytest,
    Cargo,
}

impl Framework {
    /// Every supported framework, in detection-priority order.
    /// 每个受支持的框架，按检测优先级排序。
    pub const ALL: [Framework; 5] = [
        Framework::Vitest,
        Framework::Jest,
        Framework::Mocha,
        Framework::Pytest,
        Framework::Cargo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::Jest => "jest",
            Framework::Vitest => "vitest",
            Framework::Mocha => "mocha",
            Framework::Pytest => "pytest",
            Framework::Cargo => "cargo",
        }
    }

    /// Builds the command for a whole-project test run, optionally filtered
    /// by a framework-specific pattern.
    ///
    /// 构建整个项目测试运行的命令，可选地按框架特定模式过滤。
    pub fn test_command(&self, pattern: Option<&str>) -> ProcessCommand {
        match self {
            Framework::Jest => {
                let mut cmd = ProcessCommand::new("npx", ["jest", "--json"]);
                if let Some(pattern) = pattern {
                    cmd.args.push("--testPathPattern".to_string());
                    cmd.args.push(pattern.to_string());
                }
                cmd
            }
            Framework::Vitest => {
                let mut cmd = ProcessCommand::new("npx", ["vitest", "run", "--reporter=json"]);
                if let Some(pattern) = pattern {
                    cmd.args.push("-t".to_string());
                    cmd.args.push(pattern.to_string());
                }
                cmd
            }
            Framework::Mocha => {
                let mut cmd = ProcessCommand::new("npx", ["mocha"]);
                if let Some(pattern) = pattern {
                    cmd.args.push("--grep".to_string());
                    cmd.args.push(pattern.to_string());
                }
                cmd
            }
            Framework::Pytest => {
                let mut cmd = ProcessCommand::new("python3", ["-m", "pytest"]);
                if let Some(pattern) = pattern {
                    cmd.args.push("-k".to_string());
                    cmd.args.push(pattern.to_string());
                }
                cmd
            }
            Framework::Cargo => {
                let mut cmd = ProcessCommand::new("cargo", ["test"]);
                if let Some(pattern) = pattern {
                    cmd.args.push(pattern.to_string());
                }
                cmd
            }
        }
    }

    /// Builds the command for running one test file.
    /// 构建运行单个测试文件的命令。
    pub fn single_file_command(&self, file: &Path) -> ProcessCommand {
        let file_arg = file.display().to_string();
        match self {
            Framework::Jest => ProcessCommand::new(
                "npx",
                ["jest", "--json", "--runTestsByPath", file_arg.as_str()],
            ),
            Framework::Vitest => ProcessCommand::new(
                "npx",
                ["vitest", "run", "--reporter=json", file_arg.as_str()],
            ),
            Framework::Mocha => ProcessCommand::new("npx", ["mocha", file_arg.as_str()]),
            Framework::Pytest => {
                ProcessCommand::new("python3", ["-m", "pytest", file_arg.as_str()])
            }
            Framework::Cargo => {
                // Cargo addresses integration tests by target name, not path.
                let stem = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or(file_arg);
                ProcessCommand::new("cargo", ["test", "--test", stem.as_str()])
            }
        }
    }

    /// Builds the coverage-enabled variant of the test command. The artifact
    /// location depends on the framework; see the coverage module.
    ///
    /// 构建测试命令的覆盖率变体。产物位置取决于框架；参见覆盖率模块。
    pub fn coverage_command(&self) -> ProcessCommand {
        match self {
            Framework::Jest => ProcessCommand::new(
                "npx",
                ["jest", "--json", "--coverage", "--coverageReporters=json-summary"],
            ),
            Framework::Vitest => ProcessCommand::new(
                "npx",
                [
                    "vitest",
                    "run",
                    "--reporter=json",
                    "--coverage",
                    "--coverage.reporter=json-summary",
                ],
            ),
            Framework::Mocha => {
                ProcessCommand::new("npx", ["nyc", "--reporter=json-summary", "mocha"])
            }
            Framework::Pytest => {
                ProcessCommand::new("python3", ["-m", "pytest", "--cov", "--cov-report=json"])
            }
            Framework::Cargo => ProcessCommand::new("cargo", ["llvm-cov", "--json"]),
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Framework {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jest" => Ok(Framework::Jest),
            "vitest" => Ok(Framework::Vitest),
            "mocha" => Ok(Framework::Mocha),
            "pytest" => Ok(Framework::Pytest),
            "cargo" => Ok(Framework::Cargo),
            other => Err(EngineError::UnsupportedFramework(other.to_string())),
        }
    }
}

/// What the caller asked for: a concrete framework, or automatic detection.
/// 调用方的请求：一个具体框架，或自动检测。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkChoice {
    Auto,
    Explicit(Framework),
}

impl FromStr for FrameworkChoice {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            Ok(FrameworkChoice::Auto)
        } else {
            s.parse().map(FrameworkChoice::Explicit)
        }
    }
}

/// How certain the detector is about its best guess.
/// 检测器对其最佳猜测的确定程度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Low => f.write_str("low"),
            Confidence::Medium => f.write_str("medium"),
            Confidence::High => f.write_str("high"),
        }
    }
}

/// The detector's verdict for a directory. `framework: None` means nothing
/// recognizable was found; `evidence` records what was checked either way.
///
/// 检测器对某个目录的判定。`framework: None` 表示没有找到可识别的内容；
/// 无论如何 `evidence` 都会记录检查过的内容。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub framework: Option<Framework>,
    pub confidence: Confidence,
    pub evidence: Vec<String>,
}

/// Narrow seam for the framework detector collaborator. The engine consumes
/// this trait; the default implementation lives in `infra::detect`.
///
/// 框架检测器协作方的窄接口。引擎消费此 trait；
/// 默认实现位于 `infra::detect`。
pub trait DetectFramework: Send + Sync {
    fn detect(&self, directory: &Path) -> Detection;
}
