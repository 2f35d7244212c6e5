use std::path::PathBuf;

use anyhow::{Context, Result};

pub fn planboard_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".planboard"))
}

/// The data directory to use: an explicit `--data-dir` wins, otherwise
/// `~/.planboard`.
pub fn resolve_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    match flag {
        Some(dir) => Ok(dir),
        None => planboard_home(),
    }
}
