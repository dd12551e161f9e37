//! # Poly Runner Library / Poly Runner 库
//!
//! This library provides the core functionality for the Poly Runner tool,
//! a framework-agnostic test execution orchestrator. It launches test runs
//! as external processes, tracks their lifecycle asynchronously, enforces
//! timeouts, and normalizes heterogeneous result formats.
//!
//! 此库为 Poly Runner 工具提供核心功能，
//! 这是一个与框架无关的测试执行编排器。它以外部进程的形式启动测试运行，
//! 异步跟踪其生命周期，强制执行超时，并将异构的结果格式归一化。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, run registry, parsers and the execution engine
//! - `infra` - Infrastructure services like process execution, framework
//!   detection and file system operations
//! - `reporting` - Console presentation of run results and coverage
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 数据模型、运行注册表、解析器和执行引擎
//! - `infra` - 基础设施服务，如进程执行、框架检测和文件系统操作
//! - `reporting` - 运行结果和覆盖率的控制台展示
//! - `cli` - 命令行接口和命令

pub mod core;
pub mod infra;
pub mod reporting;
pub mod cli;

// Re-export commonly used items
pub use crate::core::execution;
pub use crate::core::models;
pub use crate::core::registry;

/// Initializes the application's internationalization (i18n) based on the system locale.
///
/// This function detects the user's system locale and sets the appropriate
/// language for the application's user interface. It attempts to match the full
/// locale (e.g., "zh-CN"), then just the language code (e.g., "en"), and
/// finally falls back to the default language ("en").
pub fn init() {
    // Detect system locale and set it for i18n.
    // Fallback to "en" if detection fails.
    let locale = sys_locale::get_locale().unwrap_or_else(|| "en".to_string());
    let available_locales = rust_i18n::available_locales!();

    // Try to match the full locale first (e.g., "zh-CN")
    // Then try to match the language part only (e.g., "en" from "en-US")
    // Finally, fall back to "en"
    let lang = if available_locales.contains(&locale.as_str()) {
        &locale
    } else {
        locale
            .split('-')
            .next()
            .filter(|lang_code| available_locales.contains(lang_code))
            .unwrap_or("en")
    };

    rust_i18n::set_locale(lang);
}

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");
