//! # Configuration Initialization Module / 配置初始化模块
//!
//! This module provides functionality for initializing a new runner
//! configuration through an interactive command-line wizard. It helps
//! users create a `PolyRunner.toml` file with sensible defaults and
//! optional per-framework command overrides.
//!
//! 此模块通过交互式命令行向导提供初始化新运行器配置的功能。
//! 它帮助用户创建带有合理默认值和可选按框架命令覆盖的
//! `PolyRunner.toml` 文件。
//!
//! ## Features / 功能特性
//!
//! - **Interactive Wizard**: Step-by-step guidance for configuration setup
//! - **Command Overrides**: Per-framework custom test commands
//! - **Overwrite Protection**: Confirmation prompts before overwriting existing configurations
//!
//! - **交互式向导**: 配置设置的逐步指导
//! - **命令覆盖**: 按框架的自定义测试命令
//! - **覆盖保护**: 覆盖现有配置前的确认提示

use anyhow::{Context, Result};
use colored::*;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::core::config::{RunnerConfig, DEFAULT_CONFIG_FILE};
use crate::core::framework::Framework;
use crate::infra::t;

/// Runs the interactive wizard to generate a `PolyRunner.toml` file.
///
/// This function provides a step-by-step guided process for creating a new
/// runner configuration file, with prompts for the default timeout, the
/// retention window, and optional command overrides.
///
/// 运行交互式向导以生成 `PolyRunner.toml` 文件。
///
/// 此函数提供逐步指导过程，用于创建新的运行器配置文件，
/// 包括默认超时、保留窗口和可选命令覆盖的提示。
pub fn run_init_wizard(language: &str, non_interactive: bool) -> Result<()> {
    let config_path = Path::new(DEFAULT_CONFIG_FILE);
    let theme = ColorfulTheme::default();

    if !non_interactive {
        println!(
            "\n{}",
            t!("init_wizard_welcome", locale = language).cyan().bold()
        );
        println!("{}", t!("init_wizard_description", locale = language));
    }

    if config_path.exists() && !non_interactive {
        let confirmation = Confirm::with_theme(&theme)
            .with_prompt(
                t!(
                    "init_overwrite_prompt",
                    locale = language,
                    path = config_path.display()
                )
                .to_string(),
            )
            .default(false)
            .interact()
            .context(t!("init_user_confirmation_failed", locale = language).to_string())?;
        if !confirmation {
            println!("{}", t!("init_aborted", locale = language));
            return Ok(());
        }
    }

    let mut config = RunnerConfig {
        language: Some(language.to_string()),
        ..RunnerConfig::default()
    };

    if non_interactive {
        return write_config(config_path, &config, language);
    }

    // Interactive part starts here
    config.default_timeout_ms = Input::with_theme(&theme)
        .with_prompt(t!("init_timeout_prompt", locale = language).to_string())
        .default(config.default_timeout_ms)
        .interact_text()?;

    config.retention_secs = Input::with_theme(&theme)
        .with_prompt(t!("init_retention_prompt", locale = language).to_string())
        .default(config.retention_secs)
        .interact_text()?;

    let framework_names: Vec<&str> = Framework::ALL.iter().map(|f| f.as_str()).collect();
    let selections = MultiSelect::with_theme(&theme)
        .with_prompt(t!("init_override_selection_prompt", locale = language).to_string())
        .items(&framework_names)
        .interact()
        .context(t!("init_user_confirmation_failed", locale = language).to_string())?;

    if selections.is_empty() {
        println!(
            "{}",
            t!("init_no_overrides_selected", locale = language).yellow()
        );
    }

    let mut commands = HashMap::new();
    for i in selections {
        let framework = Framework::ALL[i];
        let command: String = Input::with_theme(&theme)
            .with_prompt(
                t!(
                    "init_override_command_prompt",
                    locale = language,
                    framework = framework
                )
                .to_string(),
            )
            .interact_text()?;
        commands.insert(framework.as_str().to_string(), command);
    }
    config.commands = commands;

    write_config(config_path, &config, language)
}

fn write_config(path: &Path, config: &RunnerConfig, language: &str) -> Result<()> {
    let toml_string = toml::to_string_pretty(config)
        .context(t!("init_serialize_failed", locale = language).to_string())?;

    fs::write(path, toml_string)
        .with_context(|| t!("init_write_failed", locale = language, path = path.display()))?;

    println!(
        "\n{} {}",
        "✔".green(),
        t!(
            "init_success_created",
            locale = language,
            path = path.display()
        )
        .bold()
    );
    println!("{}", t!("init_usage_hint", locale = language));

    Ok(())
}
