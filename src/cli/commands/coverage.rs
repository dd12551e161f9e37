// src/cli/commands/coverage.rs

use anyhow::Result;
use std::path::PathBuf;

use crate::{
    core::{
        config::RunnerConfig,
        coverage,
        framework::{DetectFramework, Framework, FrameworkChoice},
        models::EngineError,
    },
    infra::{detect::ConfigScanDetector, fs, t},
    reporting::console,
};

pub async fn execute(
    project_dir: PathBuf,
    framework_arg: String,
    timeout_ms: Option<u64>,
    config_path: PathBuf,
    json: bool,
    language: &str,
) -> Result<()> {
    let config = RunnerConfig::load_or_default(&config_path)?;
    let locale = config
        .language
        .clone()
        .unwrap_or_else(|| language.to_string());
    rust_i18n::set_locale(&locale);

    let choice: FrameworkChoice = framework_arg.parse()?;
    let project_root = fs::absolute_path(&project_dir)?;

    // The coverage query wants a concrete framework; resolve "auto" up
    // front, failing with the detector's evidence when nothing matches.
    let framework: Framework = match choice {
        FrameworkChoice::Explicit(framework) => framework,
        FrameworkChoice::Auto => {
            let detection = ConfigScanDetector.detect(&project_root);
            detection
                .framework
                .ok_or(EngineError::DetectionFailed(detection.evidence))?
        }
    };

    if !json {
        println!(
            "{}",
            t!(
                "coverage.starting",
                locale = &locale,
                framework = framework,
                path = project_root.display()
            )
        );
    }

    let timeout_ms = timeout_ms.unwrap_or(config.default_timeout_ms);
    let report = coverage::collect(&project_root, framework, timeout_ms).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        console::print_coverage_report(&report, &locale);
    }
    Ok(())
}
