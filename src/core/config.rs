//! # Configuration Module / 配置模块
//!
//! Runner-wide settings loaded from a `PolyRunner.toml` file: output
//! language, default timeout, retention window for finished run records,
//! and optional per-framework command overrides.
//!
//! 从 `PolyRunner.toml` 文件加载的运行器全局设置：输出语言、默认超时、
//! 已完成运行记录的保留窗口，以及可选的按框架命令覆盖。

use crate::core::framework::Framework;
use crate::core::models::EngineError;
use crate::infra::command::ProcessCommand;
use crate::infra::t;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
/// 默认配置文件名，在当前目录中查找。
pub const DEFAULT_CONFIG_FILE: &str = "PolyRunner.toml";

/// The runner configuration. Every field has a default, so an absent file
/// is equivalent to an empty one.
///
/// 运行器配置。每个字段都有默认值，因此文件不存在等同于文件为空。
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunnerConfig {
    /// Language for console messages (e.g. "en", "zh-CN"). When absent the
    /// locale chosen by `--lang`/system detection stays in effect.
    ///
    /// 控制台消息的语言（例如 "en"、"zh-CN"）。缺省时保持
    /// `--lang`/系统检测选择的区域设置。
    #[serde(default)]
    pub language: Option<String>,

    /// Timeout applied to runs that do not specify one, in milliseconds.
    /// 未指定超时的运行所采用的超时时间（毫秒）。
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,

    /// How long finished run records stay queryable, in seconds.
    /// 已完成运行记录可查询的保留时长（秒）。
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,

    /// Optional command line overriding the built-in invocation, keyed by
    /// framework name. The value is a shell-like string: environment
    /// variables and `~` are expanded, then it is split into words.
    ///
    /// 按框架名称键控、覆盖内置调用的可选命令行。值是一个类 shell
    /// 字符串：先展开环境变量和 `~`，然后拆分为单词。
    #[serde(default)]
    pub commands: HashMap<String, String>,
}

fn default_timeout_ms() -> u64 {
    60_000
}

fn default_retention_secs() -> u64 {
    3_600
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            language: None,
            default_timeout_ms: default_timeout_ms(),
            retention_secs: default_retention_secs(),
            commands: HashMap::new(),
        }
    }
}

impl RunnerConfig {
    /// Loads the configuration from `path`, falling back to defaults when
    /// the file does not exist. A present-but-invalid file is an error.
    ///
    /// 从 `path` 加载配置，文件不存在时回退到默认值。
    /// 文件存在但无效则是错误。
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| t!("config_read_failed_path", path = path.display()))?;
        let config: RunnerConfig =
            toml::from_str(&content).with_context(|| t!("config_parse_failed"))?;
        Ok(config)
    }

    /// Resolves the command override for `framework`, if one is configured.
    /// The override string goes through `shellexpand` and `shlex`, exactly
    /// like a custom test command.
    ///
    /// 解析 `framework` 的命令覆盖（如果已配置）。
    /// 覆盖字符串会经过 `shellexpand` 和 `shlex` 处理，
    /// 与自定义测试命令完全一致。
    pub fn command_override(
        &self,
        framework: Framework,
    ) -> Result<Option<ProcessCommand>, EngineError> {
        let Some(line) = self.commands.get(framework.as_str()) else {
            return Ok(None);
        };

        let expanded = shellexpand::full(line)
            .map_err(|e| EngineError::Config(format!("failed to expand command '{line}': {e}")))?
            .to_string();

        let parts = shlex::split(&expanded)
            .ok_or_else(|| EngineError::Config(format!("failed to parse command '{expanded}'")))?;

        let (program, args) = parts
            .split_first()
            .ok_or_else(|| EngineError::Config("empty command after parsing".to_string()))?;

        Ok(Some(ProcessCommand::new(program.clone(), args.to_vec())))
    }
}
