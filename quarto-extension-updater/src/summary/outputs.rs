//! GitHub Actions step outputs.

use crate::summary::RunSummary;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable naming the step output file.
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

/// Returns the step output file, if running under GitHub Actions.
#[must_use]
pub fn github_output_path() -> Option<PathBuf> {
    std::env::var_os(GITHUB_OUTPUT_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Appends the summary's outputs to `path` as `key=value` lines.
///
/// # Errors
///
/// Returns an error if the file can't be opened or written.
pub fn write_github_output(path: &Path, summary: &RunSummary) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    for (key, value) in summary.github_outputs() {
        writeln!(file, "{key}={value}")?;
    }
    Ok(())
}
