//! # Result Parser Module / 结果解析模块
//!
//! Converts a raw process outcome into a normalized [`TestResult`]. Each
//! framework uses one of two strategies: deserializing a self-describing
//! JSON report (Jest, Vitest), or scanning human-readable output for
//! summary markers (Mocha, Pytest, Cargo). When either strategy fails, a
//! result is synthesized from the exit code alone so the registry always
//! receives a terminal result instead of a parse exception.
//!
//! 将原始进程结果转换为归一化的 [`TestResult`]。每个框架使用两种
//! 策略之一：反序列化自描述的 JSON 报告（Jest、Vitest），或扫描
//! 人类可读输出中的摘要标记（Mocha、Pytest、Cargo）。任一策略失败时，
//! 会仅根据退出码合成一个结果，使注册表始终收到终态结果而不是
//! 解析异常。

use serde::Deserialize;

use crate::core::framework::Framework;
use crate::core::models::{EngineError, TestResult};
use crate::infra::command::RawOutcome;

/// Summary markers for one textual framework: which words follow a count
/// in summary lines, and how per-test failures are flagged.
///
/// 一个文本型框架的摘要标记：摘要行中计数后面跟随的单词，
/// 以及单个测试失败的标记方式。
pub struct TextualMarkers {
    /// Words that, preceded by a count, report passing tests.
    pub passed_words: &'static [&'static str],
    /// Words that, preceded by a count, report failing tests.
    pub failed_words: &'static [&'static str],
    /// Line prefixes that flag an individual failure or error.
    pub failure_prefixes: &'static [&'static str],
    /// Whether failures are listed as numbered items ("1) name").
    pub numbered_failures: bool,
}

/// Pytest: "2 failed, 3 passed in 0.12s", failures flagged as
/// "FAILED path::test" / "ERROR path".
pub const PYTEST_MARKERS: TextualMarkers = TextualMarkers {
    passed_words: &["passed"],
    failed_words: &["failed", "error", "errors"],
    failure_prefixes: &["FAILED", "ERROR"],
    numbered_failures: false,
};

/// Mocha: "5 passing (40ms)" / "2 failing", failures listed as "1) name".
pub const MOCHA_MARKERS: TextualMarkers = TextualMarkers {
    passed_words: &["passing"],
    failed_words: &["failing"],
    failure_prefixes: &[],
    numbered_failures: true,
};

/// Cargo: "test result: FAILED. 1 passed; 2 failed; ...", failure blocks
/// delimited by "---- name stdout ----".
pub const CARGO_MARKERS: TextualMarkers = TextualMarkers {
    passed_words: &["passed"],
    failed_words: &["failed"],
    failure_prefixes: &["----"],
    numbered_failures: false,
};

/// Parses `raw` according to the framework's strategy. Never fails: when
/// parsing throws, the exit-code fallback result is returned together with
/// a diagnostic the caller must attach to the run record.
///
/// 按框架的策略解析 `raw`。永不失败：解析出错时，
/// 返回退出码回退结果以及调用方必须附加到运行记录上的诊断信息。
pub fn parse_outcome(framework: Framework, raw: &RawOutcome) -> (TestResult, Option<String>) {
    match try_parse(framework, raw) {
        Ok(result) => (result, None),
        Err(e) => {
            let warning = format!(
                "could not parse {} output, result synthesized from exit code {}: {}",
                framework, raw.exit_code, e
            );
            (fallback_result(raw), Some(warning))
        }
    }
}

/// Strategy dispatch. The match is exhaustive: a new framework variant
/// will not compile until it is given a parsing strategy here.
///
/// 策略分发。match 是穷尽的：新的框架变体在这里获得解析策略之前
/// 无法通过编译。
fn try_parse(framework: Framework, raw: &RawOutcome) -> Result<TestResult, EngineError> {
    match framework {
        Framework::Jest | Framework::Vitest => parse_json_report(raw),
        Framework::Pytest => parse_textual(raw, &PYTEST_MARKERS),
        Framework::Mocha => parse_textual(raw, &MOCHA_MARKERS),
        Framework::Cargo => parse_textual(raw, &CARGO_MARKERS),
    }
}

/// Synthesizes a minimal result from the exit code alone: exit 0 means one
/// passing unit, anything else one failing unit. A crude approximation of
/// the real counts, kept deliberately.
///
/// 仅从退出码合成最小结果：退出码 0 表示一个通过单元，
/// 其他情况表示一个失败单元。这是对真实计数的粗略近似，有意保留。
pub fn fallback_result(raw: &RawOutcome) -> TestResult {
    let (passed, failed) = if raw.success() { (1, 0) } else { (0, 1) };
    TestResult {
        passed,
        failed,
        errors: Vec::new(),
        duration_ms: raw.duration_ms,
        raw: raw.combined_output(),
    }
}

// --- Structured strategy / 结构化策略 ---

/// The JSON report shape shared by Jest and Vitest (`--json` /
/// `--reporter=json`). Count fields are required so that arbitrary JSON
/// lines in the output cannot masquerade as a report.
///
/// Jest 与 Vitest 共享的 JSON 报告结构（`--json` / `--reporter=json`）。
/// 计数字段是必需的，这样输出中任意的 JSON 行就无法冒充报告。
#[derive(Debug, Deserialize)]
struct JsonReport {
    #[serde(rename = "numPassedTests")]
    num_passed: u32,
    #[serde(rename = "numFailedTests")]
    num_failed: u32,
    #[serde(rename = "testResults", default)]
    test_results: Vec<JsonSuite>,
}

#[derive(Debug, Deserialize)]
struct JsonSuite {
    #[serde(rename = "assertionResults", default)]
    assertions: Vec<JsonAssertion>,
}

#[derive(Debug, Deserialize)]
struct JsonAssertion {
    #[serde(default)]
    status: String,
    #[serde(rename = "fullName", default)]
    full_name: String,
    #[serde(rename = "failureMessages", default)]
    failure_messages: Vec<String>,
}

/// Deserializes the report and reads counts and itemized failures directly
/// from named fields. The report shares stdout with arbitrary logging, so
/// the whole output is tried first and then each line in turn.
///
/// 反序列化报告并直接从命名字段读取计数和逐条失败。
/// 报告与任意日志共享 stdout，因此先尝试整个输出，再逐行尝试。
fn parse_json_report(raw: &RawOutcome) -> Result<TestResult, EngineError> {
    let report = serde_json::from_str::<JsonReport>(raw.stdout.trim())
        .ok()
        .or_else(|| {
            raw.stdout
                .lines()
                .map(str::trim)
                .filter(|line| line.starts_with('{'))
                .find_map(|line| serde_json::from_str::<JsonReport>(line).ok())
        })
        .ok_or_else(|| EngineError::Parse("no JSON test report found in output".to_string()))?;

    let mut errors = Vec::new();
    for suite in &report.test_results {
        for assertion in &suite.assertions {
            if assertion.status == "failed" {
                match assertion.failure_messages.first() {
                    Some(message) => {
                        // Keep the first line; stack traces go to `raw`.
                        let first_line = message.lines().next().unwrap_or(message.as_str());
                        errors.push(format!("{}: {}", assertion.full_name, first_line));
                    }
                    None => errors.push(assertion.full_name.clone()),
                }
            }
        }
    }

    Ok(TestResult {
        passed: report.num_passed,
        failed: report.num_failed,
        errors,
        duration_ms: raw.duration_ms,
        raw: raw.combined_output(),
    })
}

// --- Textual strategy / 文本策略 ---

/// Scans stdout and stderr line by line for summary markers (a count
/// followed by a passed/failed word), then collects flagged failure lines
/// into the diagnostic list.
///
/// 逐行扫描 stdout 和 stderr 中的摘要标记（计数后跟通过/失败单词），
/// 然后将被标记的失败行收集到诊断列表中。
fn parse_textual(raw: &RawOutcome, markers: &TextualMarkers) -> Result<TestResult, EngineError> {
    let mut passed: Option<u32> = None;
    let mut failed: Option<u32> = None;

    for line in raw.stdout.lines().chain(raw.stderr.lines()) {
        scan_summary_line(line, markers, &mut passed, &mut failed);
    }

    if passed.is_none() && failed.is_none() {
        return Err(EngineError::Parse(
            "no summary line recognized in output".to_string(),
        ));
    }

    let errors = collect_failure_lines(raw, markers);

    Ok(TestResult {
        passed: passed.unwrap_or(0),
        failed: failed.unwrap_or(0),
        errors,
        duration_ms: raw.duration_ms,
        raw: raw.combined_output(),
    })
}

/// Looks for `<count> <marker-word>` token pairs in one line, accumulating
/// into the running totals. Trailing punctuation on the word is ignored so
/// "failed," and "failed;" both match.
///
/// 在单行中查找 `<计数> <标记词>` 的 token 对，累加到累计总数中。
/// 单词的尾部标点会被忽略，因此 "failed," 和 "failed;" 都能匹配。
fn scan_summary_line(
    line: &str,
    markers: &TextualMarkers,
    passed: &mut Option<u32>,
    failed: &mut Option<u32>,
) {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    for window in tokens.windows(2) {
        let Ok(count) = window[0].parse::<u32>() else {
            continue;
        };
        let word = window[1].trim_end_matches([',', ';', '.', ':']);
        if markers.passed_words.contains(&word) {
            *passed = Some(passed.unwrap_or(0) + count);
        } else if markers.failed_words.contains(&word) {
            *failed = Some(failed.unwrap_or(0) + count);
        }
    }
}

/// Collects lines flagged as failures: prefix-matched lines, and numbered
/// items ("1) name") for frameworks that list failures that way.
///
/// 收集被标记为失败的行：前缀匹配的行，以及对以编号列出失败的框架
/// 而言的编号条目（"1) name"）。
fn collect_failure_lines(raw: &RawOutcome, markers: &TextualMarkers) -> Vec<String> {
    let mut errors = Vec::new();
    for line in raw.stdout.lines().chain(raw.stderr.lines()) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let prefixed = markers
            .failure_prefixes
            .iter()
            .any(|prefix| trimmed.starts_with(prefix));
        if prefixed || (markers.numbered_failures && is_numbered_item(trimmed)) {
            errors.push(trimmed.to_string());
        }
    }
    errors
}

/// `true` for lines shaped like "12) some failing test".
fn is_numbered_item(line: &str) -> bool {
    match line.split_once(')') {
        Some((number, rest)) => {
            !number.is_empty()
                && number.chars().all(|c| c.is_ascii_digit())
                && rest.starts_with(' ')
        }
        None => false,
    }
}
