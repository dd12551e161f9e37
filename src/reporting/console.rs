//! # Console Reporting Module / 控制台报告模块
//!
//! This module handles the display of run outcomes in the console.
//! It provides colorful, formatted summaries with internationalization
//! support.
//!
//! 此模块处理在控制台中显示运行结果。
//! 它提供彩色的格式化摘要，支持国际化。

use colored::*;
use std::path::Path;

use crate::core::framework::Detection;
use crate::core::models::{CoverageReport, RunStatus};
use crate::core::status::StatusSnapshot;
use crate::infra::t;

/// Prints the final summary for one run: identity line, counts, and any
/// diagnostics collected along the way.
///
/// 打印一次运行的最终摘要：标识行、计数，以及沿途收集的诊断信息。
///
/// # Arguments / 参数
/// * `snapshot` - The terminal status snapshot to summarize
///                要总结的终态状态快照
/// * `locale` - The language locale to use for messages
///              用于消息的语言区域设置
pub fn print_run_summary(snapshot: &StatusSnapshot, locale: &str) {
    println!("\n{}", t!("report.summary_banner", locale = locale).bold());

    let status_label = snapshot.status.label(locale);
    let status_colored = match snapshot.status {
        RunStatus::Running => status_label.blue(),
        RunStatus::Completed => {
            if snapshot.results.as_ref().is_some_and(|r| r.failed > 0) {
                status_label.yellow()
            } else {
                status_label.green()
            }
        }
        RunStatus::Failed | RunStatus::TimedOut => status_label.red(),
    };

    println!(
        "  {}",
        t!(
            "report.run_line",
            locale = locale,
            id = snapshot.run_id,
            framework = snapshot.framework,
            status = status_colored
        )
    );

    match &snapshot.results {
        Some(results) => {
            println!(
                "  {}",
                t!(
                    "report.counts",
                    locale = locale,
                    passed = results.passed,
                    failed = results.failed,
                    duration = results.duration_ms
                )
            );
            for error in &results.errors {
                println!("    - {}", error.red());
            }
        }
        None => println!("  {}", t!("report.no_results", locale = locale).dimmed()),
    }

    if !snapshot.errors.is_empty() {
        println!("\n{}", t!("report.errors_banner", locale = locale).bold());
        for error in &snapshot.errors {
            println!("  - {}", error.yellow());
        }
    }
}

/// Prints a normalized coverage report as a per-file table followed by the
/// aggregate line. Warnings are shown first so a zero-valued report is
/// never mistaken for a fully uncovered project.
///
/// 以按文件表格加聚合行的形式打印归一化覆盖率报告。警告最先显示，
/// 以免零值报告被误认为是完全未覆盖的项目。
pub fn print_coverage_report(report: &CoverageReport, locale: &str) {
    println!("\n{}", t!("coverage.banner", locale = locale).bold());

    for warning in &report.warnings {
        println!("  {}", warning.yellow());
    }

    if report.files.is_empty() {
        println!("  {}", t!("coverage.none", locale = locale).dimmed());
    } else {
        for file in &report.files {
            let percent = format!("{:>6.2}%", file.coverage_percent);
            let percent_colored = if file.coverage_percent >= 80.0 {
                percent.green()
            } else if file.coverage_percent >= 50.0 {
                percent.yellow()
            } else {
                percent.red()
            };
            println!(
                "  {} | {:<50} ({}/{})",
                percent_colored,
                file.path,
                file.covered_units,
                file.covered_units + file.uncovered_units
            );
        }
    }

    println!(
        "  {}",
        t!(
            "coverage.aggregate",
            locale = locale,
            percent = format!("{:.2}", report.coverage_percent),
            covered = report.covered_units,
            total = report.total_units
        )
        .bold()
    );
}

/// Prints the detector's verdict and its evidence trail for a directory.
/// 打印检测器对某个目录的判定及其证据轨迹。
pub fn print_detection(directory: &Path, detection: &Detection, locale: &str) {
    println!(
        "{}",
        t!("detect.banner", locale = locale, path = directory.display()).bold()
    );

    match detection.framework {
        Some(framework) => println!(
            "{}",
            t!(
                "detect.result",
                locale = locale,
                framework = framework.to_string().green(),
                confidence = detection.confidence
            )
        ),
        None => println!("{}", t!("detect.unknown", locale = locale).red()),
    }

    println!("{}", t!("detect.evidence_header", locale = locale));
    for item in &detection.evidence {
        println!("  - {}", item.dimmed());
    }
}
