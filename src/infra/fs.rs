//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides the narrow file system accessor the engine relies
//! on: existence checks, directory checks and path resolution.
//!
//! 此模块提供引擎所依赖的窄文件系统访问器：
//! 存在性检查、目录检查和路径解析。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Checks if a path exists and is a regular file.
///
/// # Arguments
/// * `path` - Path to check
///
/// # Returns
/// `true` if the path exists and is a file, `false` otherwise
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

/// Checks if a path exists and is a directory.
///
/// # Arguments
/// * `path` - Path to check
///
/// # Returns
/// `true` if the path exists and is a directory, `false` otherwise
pub fn is_directory(path: &Path) -> bool {
    path.exists() && path.is_dir()
}

/// Gets the absolute path from a potentially relative path.
///
/// # Arguments
/// * `path` - Path to canonicalize
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).with_context(|| format!("Failed to resolve path: {}", path.display()))
}

/// Reads a file to a string with path context on failure.
///
/// # Arguments
/// * `path` - Path to read
///
/// # Returns
/// The file contents, or an error naming the path
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}
