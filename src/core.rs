//! # Core Module / 核心模块
//!
//! This module contains the core functionality of Poly Runner,
//! including data models, the run registry, result parsing,
//! coverage collection and the execution engine.
//!
//! 此模块包含 Poly Runner 的核心功能，
//! 包括数据模型、运行注册表、结果解析、覆盖率收集和执行引擎。

pub mod models;
pub mod config;
pub mod framework;
pub mod registry;
pub mod parser;
pub mod coverage;
pub mod status;
pub mod execution;

// Re-exports
pub use models::{EngineError, RunStatus, TestResult, TestRun};
pub use framework::Framework;
pub use registry::RunRegistry;
pub use execution::ExecutionEngine;
