//! # Framework Detection Module / 框架检测模块
//!
//! Default implementation of the detector seam: scans a directory for
//! well-known framework config files, then manifest dependency mentions,
//! then weaker signals, recording evidence for every check. Callers that
//! requested "auto" turn a `None` verdict into `DetectionFailed` carrying
//! that evidence.
//!
//! 检测器接口的默认实现：扫描目录中众所周知的框架配置文件，
//! 然后是清单中的依赖提及，再到更弱的信号，并为每次检查记录证据。
//! 请求了 "auto" 的调用方会把 `None` 判定转化为携带该证据的
//! `DetectionFailed`。

use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;

use crate::core::framework::{Confidence, DetectFramework, Detection, Framework};

/// Config files that pin a framework outright, in priority order. Vitest
/// is checked before Jest: Vite projects frequently keep a leftover Jest
/// config around after migrating.
///
/// 能直接确定框架的配置文件，按优先级排序。Vitest 排在 Jest 之前：
/// Vite 项目迁移后经常还残留着 Jest 配置。
static CONFIG_MARKERS: Lazy<Vec<(Framework, &'static [&'static str])>> = Lazy::new(|| {
    vec![
        (
            Framework::Vitest,
            &[
                "vitest.config.ts",
                "vitest.config.js",
                "vitest.config.mts",
                "vitest.config.mjs",
            ][..],
        ),
        (
            Framework::Jest,
            &[
                "jest.config.js",
                "jest.config.ts",
                "jest.config.cjs",
                "jest.config.mjs",
                "jest.config.json",
            ][..],
        ),
        (
            Framework::Mocha,
            &[
                ".mocharc.js",
                ".mocharc.cjs",
                ".mocharc.json",
                ".mocharc.yml",
                ".mocharc.yaml",
            ][..],
        ),
        (Framework::Pytest, &["pytest.ini", "conftest.py"][..]),
        (Framework::Cargo, &["Cargo.toml"][..]),
    ]
});

/// Dependency mentions in `package.json` that suggest a framework when no
/// config file exists.
/// 当不存在配置文件时，`package.json` 中暗示框架的依赖提及。
const PACKAGE_JSON_MARKERS: [(Framework, &str); 3] = [
    (Framework::Vitest, "\"vitest\""),
    (Framework::Jest, "\"jest\""),
    (Framework::Mocha, "\"mocha\""),
];

/// Scans config and manifest files to guess the framework a directory uses.
/// 扫描配置和清单文件来猜测目录使用的框架。
pub struct ConfigScanDetector;

impl DetectFramework for ConfigScanDetector {
    fn detect(&self, directory: &Path) -> Detection {
        let mut evidence = Vec::new();

        // Strongest signal: a framework's own config file.
        for (framework, files) in CONFIG_MARKERS.iter() {
            for name in *files {
                if directory.join(name).is_file() {
                    evidence.push(format!("found {}", name));
                    return Detection {
                        framework: Some(*framework),
                        confidence: Confidence::High,
                        evidence,
                    };
                }
            }
        }
        evidence.push("no framework config file present".to_string());

        // Next: dependency mentions in package.json.
        match fs::read_to_string(directory.join("package.json")) {
            Ok(package_json) => {
                for (framework, needle) in PACKAGE_JSON_MARKERS {
                    if package_json.contains(needle) {
                        evidence.push(format!("package.json mentions {}", framework));
                        return Detection {
                            framework: Some(framework),
                            confidence: Confidence::Medium,
                            evidence,
                        };
                    }
                }
                evidence.push("package.json has no known test framework dependency".to_string());
            }
            Err(_) => evidence.push("package.json not present".to_string()),
        }

        // pyproject.toml can configure pytest without a pytest.ini.
        match fs::read_to_string(directory.join("pyproject.toml")) {
            Ok(pyproject) => {
                if pyproject.contains("[tool.pytest") {
                    evidence.push("pyproject.toml configures pytest".to_string());
                    return Detection {
                        framework: Some(Framework::Pytest),
                        confidence: Confidence::Medium,
                        evidence,
                    };
                }
                evidence.push("pyproject.toml does not configure pytest".to_string());
            }
            Err(_) => evidence.push("pyproject.toml not present".to_string()),
        }

        // Weakest signal: a tests/ directory containing Python files.
        if has_python_tests(&directory.join("tests")) {
            evidence.push("tests/ directory contains Python files".to_string());
            return Detection {
                framework: Some(Framework::Pytest),
                confidence: Confidence::Low,
                evidence,
            };
        }
        evidence.push("no recognizable test layout found".to_string());

        Detection {
            framework: None,
            confidence: Confidence::Low,
            evidence,
        }
    }
}

fn has_python_tests(tests_dir: &Path) -> bool {
    let Ok(entries) = fs::read_dir(tests_dir) else {
        return false;
    };
    entries
        .flatten()
        .any(|entry| entry.path().extension().is_some_and(|ext| ext == "py"))
}
