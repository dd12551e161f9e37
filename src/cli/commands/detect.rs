// src/cli/commands/detect.rs

use anyhow::Result;
use std::path::PathBuf;

use crate::{
    core::framework::DetectFramework,
    infra::{detect::ConfigScanDetector, fs},
    reporting::console,
};

pub fn execute(project_dir: PathBuf, language: &str) -> Result<()> {
    let project_root = fs::absolute_path(&project_dir)?;
    let detection = ConfigScanDetector.detect(&project_root);
    console::print_detection(&project_root, &detection, language);
    Ok(())
}
