// src/cli/commands/run.rs

use anyhow::Result;
use colored::*;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_stream::{wrappers::IntervalStream, StreamExt};

use crate::{
    core::{
        config::RunnerConfig,
        coverage,
        execution::{ExecutionEngine, RunRequest},
        framework::FrameworkChoice,
        models::RunStatus,
        registry::RunRegistry,
        status::{StatusApi, StatusSnapshot},
    },
    infra::{fs, t},
    reporting::console,
};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    project_dir: PathBuf,
    file: Option<PathBuf>,
    framework_arg: String,
    pattern: Option<String>,
    coverage_requested: bool,
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

    let framework_choice: FrameworkChoice = framework_arg.parse()?;
    let timeout_ms = timeout_ms.unwrap_or(config.default_timeout_ms);
    let project_root = fs::absolute_path(&project_dir)?;

    let registry = Arc::new(RunRegistry::new(chrono::Duration::seconds(
        config.retention_secs as i64,
    )));
    let engine = ExecutionEngine::new(Arc::clone(&registry), config);
    setup_signal_handler(&engine, &locale);

    // Pre-spawn validation happens inside the engine; a detection or
    // file-existence failure surfaces here, before any run exists.
    let run = match &file {
        Some(file) => {
            println!(
                "{}",
                t!("run.single_file", locale = &locale, path = file.display()).blue()
            );
            engine.submit_single_file(file, framework_choice, coverage_requested, timeout_ms)?
        }
        None => engine.submit(RunRequest {
            directory: project_root.clone(),
            test_pattern: pattern,
            framework: framework_choice,
            coverage: coverage_requested,
            timeout_ms,
        })?,
    };

    if !json {
        println!(
            "{}",
            t!(
                "run.starting",
                locale = &locale,
                framework = run.framework.to_string().yellow(),
                path = run.directory.display()
            )
        );
        println!("{}", t!("run.submitted", locale = &locale, id = run.run_id));
    }

    // The run executes in the background; observe it purely through the
    // status API, the same way an external poller would.
    let status_api = StatusApi::new(Arc::clone(&registry));
    let snapshot = poll_to_terminal(&status_api, &run.run_id, &locale, json).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        console::print_run_summary(&snapshot, &locale);
    }

    // Coverage is parsed post-hoc from the retained raw output.
    if coverage_requested {
        if let Some(results) = &snapshot.results {
            let report = coverage::locate_report(&run.directory, run.framework, &results.raw);
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                console::print_coverage_report(&report, &locale);
            }
        }
    }

    match snapshot.status {
        RunStatus::Completed => {
            if snapshot.results.as_ref().is_some_and(|r| r.failed > 0) {
                anyhow::bail!(t!("run.finished_with_failures", locale = &locale));
            }
            Ok(())
        }
        status => anyhow::bail!(t!(
            "run.not_completed",
            locale = &locale,
            status = status.label(&locale)
        )),
    }
}

/// Polls the status API on a fixed interval until the run is terminal,
/// rendering the progress estimate in place.
async fn poll_to_terminal(
    status_api: &StatusApi,
    run_id: &str,
    locale: &str,
    quiet: bool,
) -> Result<StatusSnapshot> {
    let mut ticks = IntervalStream::new(tokio::time::interval(Duration::from_millis(100)));
    loop {
        ticks.next().await;
        let snapshot = status_api.status(run_id)?;
        if !quiet {
            print!(
                "\r  {}",
                t!("report.progress", locale = locale, percent = snapshot.progress)
            );
            let _ = std::io::stdout().flush();
        }
        if snapshot.status.is_terminal() {
            if !quiet {
                println!();
            }
            return Ok(snapshot);
        }
    }
}

fn setup_signal_handler(engine: &ExecutionEngine, locale: &str) {
    let token = engine.cancellation_token();
    let locale = locale.to_string();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("shutdown_signal", locale = &locale).yellow());
            token.cancel();
        }
    });
}
