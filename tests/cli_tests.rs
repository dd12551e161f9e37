use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// This test runs `poly-runner detect` against a directory containing a
/// Cargo manifest and asserts that the cargo framework is reported with
/// high confidence.
///
/// 这个测试针对包含 Cargo 清单的目录运行 `poly-runner detect`，
/// 并断言以高置信度报告了 cargo 框架。
#[test]
fn test_detect_cargo_project() {
    let project = tempdir().unwrap();
    fs::write(project.path().join("Cargo.toml"), "[package]\nname = \"demo\"\n").unwrap();

    let mut cmd = Command::cargo_bin("poly-runner").unwrap();
    cmd.arg("detect")
        .arg("--project-dir")
        .arg(project.path())
        .arg("--lang")
        .arg("en");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("cargo"))
        .stdout(predicate::str::contains("high"));
}

/// This test checks the unknown-directory scenario: detection reports
/// that nothing was found and prints its evidence trail.
///
/// 这个测试检查未知目录的场景：检测报告未找到任何框架，
/// 并打印其证据轨迹。
#[test]
fn test_detect_unknown_directory() {
    let project = tempdir().unwrap();

    let mut cmd = Command::cargo_bin("poly-runner").unwrap();
    cmd.arg("detect")
        .arg("--project-dir")
        .arg(project.path())
        .arg("--lang")
        .arg("en");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No test framework could be detected"))
        .stdout(predicate::str::contains("package.json not present"));
}

/// This test asserts that a run submission naming an unknown framework is
/// rejected synchronously, before anything executes.
///
/// 这个测试断言指定未知框架的运行提交会被同步拒绝，
/// 在任何执行发生之前。
#[test]
fn test_run_with_unsupported_framework_fails() {
    let project = tempdir().unwrap();

    let mut cmd = Command::cargo_bin("poly-runner").unwrap();
    cmd.arg("run")
        .arg("--project-dir")
        .arg(project.path())
        .arg("--framework")
        .arg("rspec")
        .arg("--lang")
        .arg("en");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("unsupported framework: rspec"));
}

/// This test asserts that "auto" against an unrecognizable directory is
/// rejected with the detector's evidence and no run id.
///
/// 这个测试断言对无法识别的目录使用 "auto" 会携带检测器证据被拒绝，
/// 并且不会产生运行 id。
#[test]
fn test_run_auto_detection_failure() {
    let project = tempdir().unwrap();

    let mut cmd = Command::cargo_bin("poly-runner").unwrap();
    cmd.arg("run")
        .arg("--project-dir")
        .arg(project.path())
        .arg("--lang")
        .arg("en");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no test framework could be detected"));
}

/// This test asserts the init command writes a default configuration in
/// non-interactive mode.
///
/// 这个测试断言 init 命令在非交互模式下写出默认配置。
#[test]
fn test_init_non_interactive_writes_config() {
    let dir = tempdir().unwrap();

    let mut cmd = Command::cargo_bin("poly-runner").unwrap();
    cmd.current_dir(dir.path())
        .arg("init")
        .arg("--non-interactive")
        .arg("--lang")
        .arg("en");

    cmd.assert().success();

    let written = fs::read_to_string(dir.path().join("PolyRunner.toml")).unwrap();
    assert!(written.contains("default_timeout_ms"));
    assert!(written.contains("retention_secs"));
}
