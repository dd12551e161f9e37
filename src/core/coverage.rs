//! # Coverage Collection Module / 覆盖率收集模块
//!
//! Runs the coverage-enabled variant of a framework's command through the
//! same process executor, then locates and normalizes the coverage
//! artifact. Depending on the framework the artifact is a sidecar file
//! written into the working directory (Istanbul `coverage-summary.json`,
//! coverage.py `coverage.json`) or a JSON document on captured stdout
//! (`cargo llvm-cov`). A missing or malformed artifact degrades to a
//! zero-valued report with a warning instead of failing the run.
//!
//! 通过同一个进程执行器运行框架命令的覆盖率变体，然后定位并归一化
//! 覆盖率产物。根据框架不同，产物是写入工作目录的伴生文件
//! （Istanbul `coverage-summary.json`、coverage.py 的 `coverage.json`），
//! 或捕获的 stdout 上的 JSON 文档（`cargo llvm-cov`）。
//! 产物缺失或格式错误时降级为零值报告加警告，而不是使运行失败。

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::core::framework::Framework;
use crate::core::models::{CoverageReport, EngineError, FileCoverage};
use crate::infra::command::{self, CommandError};
use crate::infra::fs;

/// Runs the coverage variant for `framework` in `directory` and returns
/// the normalized report. Spawn and timeout failures are hard errors;
/// artifact problems are not.
///
/// 在 `directory` 中为 `framework` 运行覆盖率变体并返回归一化报告。
/// 派生和超时失败是硬错误；产物问题不是。
pub async fn collect(
    directory: &Path,
    framework: Framework,
    timeout_ms: u64,
) -> Result<CoverageReport, EngineError> {
    let cmd = framework.coverage_command();
    let outcome = command::run_with_deadline(
        &cmd,
        directory,
        Duration::from_millis(timeout_ms),
        |_| {},
    )
    .await
    .map_err(|e| match e {
        CommandError::Spawn(message) => EngineError::Spawn(message),
        CommandError::Timeout(ms) => EngineError::Timeout(ms),
    })?;

    Ok(locate_report(directory, framework, &outcome.stdout))
}

/// Locates the coverage artifact for a finished run and normalizes it.
/// `output` is the captured stdout (or the retained raw output of a run
/// record, for post-hoc parsing).
///
/// 为已结束的运行定位覆盖率产物并将其归一化。`output` 是捕获的
/// stdout（或运行记录保留的原始输出，用于事后解析）。
pub fn locate_report(directory: &Path, framework: Framework, output: &str) -> CoverageReport {
    let located = match framework {
        Framework::Jest | Framework::Vitest | Framework::Mocha => {
            parse_istanbul_summary(&directory.join("coverage").join("coverage-summary.json"))
        }
        Framework::Pytest => parse_coverage_py(&directory.join("coverage.json")),
        Framework::Cargo => parse_llvm_cov(output),
    };

    match located {
        Ok(report) => report,
        Err(e) => CoverageReport::empty_with_warning(format!("coverage artifact unavailable: {e:#}")),
    }
}

// --- Istanbul json-summary (Jest / Vitest / nyc) ---

#[derive(Debug, Deserialize)]
struct IstanbulEntry {
    lines: IstanbulCounts,
}

#[derive(Debug, Deserialize)]
struct IstanbulCounts {
    total: u64,
    covered: u64,
}

/// `coverage-summary.json` maps file paths (plus a "total" key) to line
/// counters. The aggregate is recomputed from the per-file entries rather
/// than trusted from the "total" entry.
///
/// `coverage-summary.json` 将文件路径（外加一个 "total" 键）映射到
/// 行计数器。聚合值从按文件条目重新计算，而不是直接信任 "total" 条目。
fn parse_istanbul_summary(path: &Path) -> Result<CoverageReport> {
    let content = fs::read_to_string(path)?;
    let entries: BTreeMap<String, IstanbulEntry> =
        serde_json::from_str(&content).context("malformed coverage-summary.json")?;

    let files = entries
        .into_iter()
        .filter(|(name, _)| name != "total")
        .map(|(name, entry)| {
            let uncovered = entry.lines.total.saturating_sub(entry.lines.covered);
            FileCoverage::new(name, entry.lines.covered, uncovered)
        })
        .collect();

    Ok(CoverageReport::from_files(files))
}

// --- coverage.py JSON report (pytest --cov) ---

#[derive(Debug, Deserialize)]
struct CoveragePyReport {
    files: BTreeMap<String, CoveragePyFile>,
}

#[derive(Debug, Deserialize)]
struct CoveragePyFile {
    summary: CoveragePySummary,
}

#[derive(Debug, Deserialize)]
struct CoveragePySummary {
    covered_lines: u64,
    missing_lines: u64,
}

fn parse_coverage_py(path: &Path) -> Result<CoverageReport> {
    let content = fs::read_to_string(path)?;
    let report: CoveragePyReport =
        serde_json::from_str(&content).context("malformed coverage.json")?;

    let files = report
        .files
        .into_iter()
        .map(|(name, file)| {
            FileCoverage::new(name, file.summary.covered_lines, file.summary.missing_lines)
        })
        .collect();

    Ok(CoverageReport::from_files(files))
}

// --- cargo llvm-cov JSON export (on stdout) ---

#[derive(Debug, Deserialize)]
struct LlvmCovExport {
    data: Vec<LlvmCovData>,
}

#[derive(Debug, Deserialize)]
struct LlvmCovData {
    #[serde(default)]
    files: Vec<LlvmCovFile>,
}

#[derive(Debug, Deserialize)]
struct LlvmCovFile {
    filename: String,
    summary: LlvmCovSummary,
}

#[derive(Debug, Deserialize)]
struct LlvmCovSummary {
    lines: LlvmCovCounts,
}

#[derive(Debug, Deserialize)]
struct LlvmCovCounts {
    count: u64,
    covered: u64,
}

/// The export document shares stdout with test output, so each line is
/// tried in turn, the same way the structured result parser scans.
///
/// 导出文档与测试输出共享 stdout，因此逐行尝试，
/// 与结构化结果解析器的扫描方式相同。
fn parse_llvm_cov(output: &str) -> Result<CoverageReport> {
    let export = output
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .find_map(|line| serde_json::from_str::<LlvmCovExport>(line).ok())
        .context("no llvm-cov JSON export found on stdout")?;

    let files = export
        .data
        .into_iter()
        .flat_map(|data| data.files)
        .map(|file| {
            let uncovered = file.summary.lines.count.saturating_sub(file.summary.lines.covered);
            FileCoverage::new(file.filename, file.summary.lines.covered, uncovered)
        })
        .collect();

    Ok(CoverageReport::from_files(files))
}
