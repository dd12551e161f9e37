// src/cli.rs
use anyhow::Result;
use clap::{Arg, ArgAction, Command};
use std::{env, path::PathBuf};

use crate::infra::t;

pub mod commands;

/// Pre-parses the command line arguments to find the language setting.
/// This allows i18n to be initialized before the full CLI is built.
/// It looks for a `--lang <VALUE>` argument.
fn pre_parse_language() -> String {
    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|arg| arg == "--lang") {
        if let Some(lang) = args.get(pos + 1) {
            return lang.clone();
        }
    }
    // Fallback to system language detection
    sys_locale::get_locale().unwrap_or_else(|| "en".to_string())
}

fn build_cli(locale: &str) -> Command {
    Command::new("poly-runner")
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .about(t!("cli_about", locale = locale).to_string())
        .arg(
            Arg::new("lang")
                .long("lang")
                .help(t!("cli_lang", locale = locale).to_string())
                .value_name("LANGUAGE")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(
            Command::new("run")
                .about(t!("cmd_run_about", locale = locale).to_string())
                .arg(
                    Arg::new("project-dir")
                        .long("project-dir")
                        .help(t!("arg_project_dir", locale = locale).to_string())
                        .value_name("PROJECT_DIR")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("framework")
                        .short('f')
                        .long("framework")
                        .help(t!("arg_framework", locale = locale).to_string())
                        .value_name("FRAMEWORK")
                        .default_value("auto")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("pattern")
                        .short('p')
                        .long("pattern")
                        .help(t!("arg_pattern", locale = locale).to_string())
                        .value_name("PATTERN")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("file")
                        .long("file")
                        .help(t!("arg_file", locale = locale).to_string())
                        .value_name("FILE")
                        .value_parser(clap::value_parser!(PathBuf))
                        .conflicts_with("pattern")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("coverage")
                        .long("coverage")
                        .help(t!("arg_coverage", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("timeout-ms")
                        .long("timeout-ms")
                        .help(t!("arg_timeout_ms", locale = locale).to_string())
                        .value_name("TIMEOUT_MS")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help(t!("arg_config", locale = locale).to_string())
                        .value_name("CONFIG")
                        .default_value("PolyRunner.toml")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help(t!("arg_json", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("coverage")
                .about(t!("cmd_coverage_about", locale = locale).to_string())
                .arg(
                    Arg::new("project-dir")
                        .long("project-dir")
                        .help(t!("arg_project_dir", locale = locale).to_string())
                        .value_name("PROJECT_DIR")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("framework")
                        .short('f')
                        .long("framework")
                        .help(t!("arg_framework", locale = locale).to_string())
                        .value_name("FRAMEWORK")
                        .default_value("auto")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("timeout-ms")
                        .long("timeout-ms")
                        .help(t!("arg_timeout_ms", locale = locale).to_string())
                        .value_name("TIMEOUT_MS")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help(t!("arg_config", locale = locale).to_string())
                        .value_name("CONFIG")
                        .default_value("PolyRunner.toml")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help(t!("arg_json", locale = locale).to_string())
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("detect")
                .about(t!("cmd_detect_about", locale = locale).to_string())
                .arg(
                    Arg::new("project-dir")
                        .long("project-dir")
                        .help(t!("arg_project_dir", locale = locale).to_string())
                        .value_name("PROJECT_DIR")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .action(ArgAction::Set),
                ),
        )
        .subcommand(
            Command::new("init")
                .about(t!("cmd_init_about", locale = locale).to_string())
                .arg(
                    Arg::new("non-interactive")
                        .long("non-interactive")
                        .help("Create a default config file without launching the interactive wizard.")
                        .action(ArgAction::SetTrue),
                ),
        )
}

pub async fn run() -> Result<()> {
    // Pre-parse language and initialize i18n first.
    let language = pre_parse_language();
    rust_i18n::set_locale(&language);

    let matches = build_cli(&language).get_matches();

    match matches.subcommand() {
        Some(("run", run_matches)) => {
            let project_dir = run_matches
                .get_one::<PathBuf>("project-dir")
                .unwrap() // Has default
                .clone();
            let framework = run_matches
                .get_one::<String>("framework")
                .unwrap() // Has default
                .clone();
            let pattern = run_matches.get_one::<String>("pattern").cloned();
            let file = run_matches.get_one::<PathBuf>("file").cloned();
            let coverage = run_matches.get_flag("coverage");
            let timeout_ms = run_matches.get_one::<u64>("timeout-ms").copied();
            let config = run_matches
                .get_one::<PathBuf>("config")
                .unwrap() // Has default
                .clone();
            let json = run_matches.get_flag("json");

            commands::run::execute(
                project_dir,
                file,
                framework,
                pattern,
                coverage,
                timeout_ms,
                config,
                json,
                &language,
            )
            .await?;
        }
        Some(("coverage", coverage_matches)) => {
            let project_dir = coverage_matches
                .get_one::<PathBuf>("project-dir")
                .unwrap() // Has default
                .clone();
            let framework = coverage_matches
                .get_one::<String>("framework")
                .unwrap() // Has default
                .clone();
            let timeout_ms = coverage_matches.get_one::<u64>("timeout-ms").copied();
            let config = coverage_matches
                .get_one::<PathBuf>("config")
                .unwrap() // Has default
                .clone();
            let json = coverage_matches.get_flag("json");

            commands::coverage::execute(project_dir, framework, timeout_ms, config, json, &language)
                .await?;
        }
        Some(("detect", detect_matches)) => {
            let project_dir = detect_matches
                .get_one::<PathBuf>("project-dir")
                .unwrap() // Has default
                .clone();
            commands::detect::execute(project_dir, &language)?;
        }
        Some(("init", init_matches)) => {
            let non_interactive = init_matches.get_flag("non-interactive");

            // Show language detection message if it was auto-detected
            if env::args().all(|arg| arg != "--lang") {
                println!(
                    "{}",
                    t!("system_language_detected", locale = &language, lang = &language)
                );
            }
            commands::init::run_init_wizard(&language, non_interactive)?;
        }
        _ => {
            // This case handles when no subcommand is given.
            // Clap will have already printed help info.
        }
    }
    Ok(())
}
