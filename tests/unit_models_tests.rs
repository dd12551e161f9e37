//! # Models Module Unit Tests / Models 模块单元测试
//!
//! This module contains unit tests for the `models.rs` module,
//! covering run statuses, normalized results, coverage aggregation and the
//! error taxonomy's display contract.
//!
//! 此模块包含 `models.rs` 模块的单元测试，
//! 覆盖运行状态、归一化结果、覆盖率聚合以及错误分类的显示约定。

use poly_runner::core::framework::{Framework, FrameworkChoice};
use poly_runner::core::models::{
    percent, CoverageReport, EngineError, FileCoverage, RunStatus, TestResult,
};
use std::path::PathBuf;

#[cfg(test)]
mod run_status_tests {
    use super::*;

    #[test]
    fn test_running_is_the_only_non_terminal_state() {
        assert!(!RunStatus::Running.is_terminal());
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::TimedOut.is_terminal());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&RunStatus::TimedOut).unwrap(),
            "\"timed_out\""
        );
        assert_eq!(
            serde_json::to_string(&RunStatus::Running).unwrap(),
            "\"running\""
        );
    }
}

#[cfg(test)]
mod framework_tests {
    use super::*;

    #[test]
    fn test_framework_parses_case_insensitively() {
        assert_eq!("jest".parse::<Framework>().unwrap(), Framework::Jest);
        assert_eq!("Pytest".parse::<Framework>().unwrap(), Framework::Pytest);
        assert_eq!("CARGO".parse::<Framework>().unwrap(), Framework::Cargo);
    }

    #[test]
    fn test_unknown_framework_is_rejected() {
        let err = "rspec".parse::<Framework>().unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedFramework(name) if name == "rspec"));
    }

    #[test]
    fn test_auto_is_not_a_concrete_framework() {
        // "auto" only exists at the choice level; the closed enum rejects it.
        assert!("auto".parse::<Framework>().is_err());
        assert_eq!(
            "auto".parse::<FrameworkChoice>().unwrap(),
            FrameworkChoice::Auto
        );
        assert_eq!(
            "vitest".parse::<FrameworkChoice>().unwrap(),
            FrameworkChoice::Explicit(Framework::Vitest)
        );
    }

    #[test]
    fn test_framework_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Framework::Jest).unwrap(), "\"jest\"");
        assert_eq!(
            serde_json::from_str::<Framework>("\"mocha\"").unwrap(),
            Framework::Mocha
        );
    }

    #[test]
    fn test_pattern_is_forwarded_into_the_command() {
        let cmd = Framework::Pytest.test_command(Some("test_login"));
        assert_eq!(cmd.program, "python3");
        assert!(cmd.args.contains(&"-k".to_string()));
        assert!(cmd.args.contains(&"test_login".to_string()));

        let bare = Framework::Pytest.test_command(None);
        assert!(!bare.args.contains(&"-k".to_string()));
    }

    #[test]
    fn test_single_file_command_uses_the_path() {
        let cmd = Framework::Mocha.single_file_command(&PathBuf::from("test/login.spec.js"));
        assert_eq!(cmd.program, "npx");
        assert!(cmd.args.iter().any(|a| a.contains("login.spec.js")));
    }
}

#[cfg(test)]
mod coverage_model_tests {
    use super::*;

    #[test]
    fn test_percent_of_zero_total_is_zero() {
        // No units must yield 0, never NaN or a division error.
        assert_eq!(percent(0, 0), 0.0);
        assert_eq!(percent(5, 10), 50.0);
    }

    #[test]
    fn test_file_coverage_computes_its_own_percent() {
        let file = FileCoverage::new("src/a.js", 8, 2);
        assert_eq!(file.coverage_percent, 80.0);

        let empty = FileCoverage::new("src/empty.js", 0, 0);
        assert_eq!(empty.coverage_percent, 0.0);
    }

    #[test]
    fn test_report_aggregates_across_files() {
        let report = CoverageReport::from_files(vec![
            FileCoverage::new("src/a.js", 8, 2),
            FileCoverage::new("src/b.js", 2, 8),
        ]);

        assert_eq!(report.total_units, 20);
        assert_eq!(report.covered_units, 10);
        assert_eq!(report.coverage_percent, 50.0);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_empty_report_carries_a_warning() {
        let report = CoverageReport::empty_with_warning("artifact missing");
        assert_eq!(report.coverage_percent, 0.0);
        assert_eq!(report.total_units, 0);
        assert_eq!(report.warnings, vec!["artifact missing".to_string()]);
    }
}

#[cfg(test)]
mod engine_error_tests {
    use super::*;

    #[test]
    fn test_timeout_message_names_the_budget() {
        assert_eq!(
            EngineError::Timeout(5000).to_string(),
            "execution exceeded 5000ms timeout"
        );
    }

    #[test]
    fn test_detection_failure_carries_evidence() {
        let err = EngineError::DetectionFailed(vec![
            "no framework config file present".to_string(),
            "package.json not present".to_string(),
        ]);
        let message = err.to_string();
        assert!(message.contains("no test framework could be detected"));
        assert!(message.contains("package.json not present"));
    }

    #[test]
    fn test_file_not_found_names_the_path() {
        let err = EngineError::FileNotFound(PathBuf::from("/proj/missing.spec.js"));
        assert!(err.to_string().contains("/proj/missing.spec.js"));
    }

    #[test]
    fn test_result_serde_round_trip() {
        let result = TestResult {
            passed: 5,
            failed: 2,
            errors: vec!["login test: expected 200".to_string()],
            duration_ms: 321,
            raw: "raw output".to_string(),
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: TestResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
