use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub fn data_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    let base = dirs::data_dir().context("unable to resolve data directory")?;
    Ok(base.join("reelwatch"))
}

pub fn database_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join("reelwatch.db")
}

pub fn log_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("logs")
}
