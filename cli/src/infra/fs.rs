//! Filesystem infrastructure — working-directory checks and plan files.

use std::path::Path;

use anyhow::{Context, Result};

use crate::domain::operation::PlanFile;

const CONFIG_SUFFIXES: &[&str] = &[".tf", ".tofu", ".tf.json", ".tofu.json"];

/// Whether `dir` holds configuration files at its top level.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed.
pub fn has_config(dir: &Path) -> Result<bool> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("cannot list {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("cannot list {}", dir.display()))?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        if CONFIG_SUFFIXES.iter().any(|s| name.ends_with(s)) && entry.path().is_file() {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Read and classify the plan file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is an unusable bookmark.
pub fn read_plan_file(path: &Path) -> Result<PlanFile> {
    let contents =
        std::fs::read(path).with_context(|| format!("cannot read plan file {}", path.display()))?;
    PlanFile::from_contents(path.to_path_buf(), &contents)
        .with_context(|| format!("invalid plan file {}", path.display()))
}
