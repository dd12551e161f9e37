//! # Reporting Module / 报告模块
//!
//! This module handles the presentation of run results, coverage reports
//! and detection verdicts on the console.
//!
//! 此模块负责在控制台上展示运行结果、覆盖率报告和检测判定。

pub mod console;
