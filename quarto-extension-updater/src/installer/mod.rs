//! Extension installation through the Quarto CLI.

mod error;

pub use error::InstallError;

use async_trait::async_trait;
use semver::Version;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Installs extensions into a working tree.
#[async_trait]
pub trait ExtensionInstaller: Send + Sync {
    /// Installs `source` (`owner/repo@tag`) into `workdir`, returning the
    /// installer's standard output.
    async fn install(&self, source: &str, workdir: &Path) -> Result<String, InstallError>;

    /// Version of the host tool the extensions run under, if known.
    async fn host_version(&self) -> Option<Version>;
}

/// Runs `quarto add <source> --no-prompt`.
#[derive(Debug, Clone)]
pub struct QuartoInstaller {
    program: String,
}

impl QuartoInstaller {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for QuartoInstaller {
    fn default() -> Self {
        Self::new("quarto")
    }
}

#[async_trait]
impl ExtensionInstaller for QuartoInstaller {
    async fn install(&self, source: &str, workdir: &Path) -> Result<String, InstallError> {
        debug!(program = %self.program, source, "Installing extension");

        let output = Command::new(&self.program)
            .args(["add", source, "--no-prompt"])
            .current_dir(workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| InstallError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(InstallError::Failed {
                message: format!("{} add {source} failed ({})", self.program, output.status),
                stderr: Some(stderr).filter(|s| !s.trim().is_empty()),
                stdout: Some(stdout).filter(|s| !s.trim().is_empty()),
            });
        }

        Ok(stdout)
    }

    async fn host_version(&self) -> Option<Version> {
        let output = Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;

        match output {
            Ok(output) if output.status.success() => {
                let raw = String::from_utf8_lossy(&output.stdout);
                let version = parse_host_version(&raw);
                if version.is_none() {
                    warn!(output = %raw.trim(), "Unrecognised {} version output", self.program);
                }
                version
            }
            Ok(output) => {
                warn!(status = %output.status, "{} --version failed", self.program);
                None
            }
            Err(e) => {
                warn!(error = %e, "Failed to execute {} --version", self.program);
                None
            }
        }
    }
}

/// Parses the first line of `quarto --version` output.
///
/// Four-part development builds such as `1.5.3.1` keep their first three
/// components.
#[must_use]
pub fn parse_host_version(output: &str) -> Option<Version> {
    let line = output.lines().map(str::trim).find(|line| !line.is_empty())?;
    let line = line.strip_prefix('v').unwrap_or(line);
    if let Ok(version) = Version::parse(line) {
        return Some(version);
    }

    let numbers: Vec<u64> = line
        .split(['.', '-'])
        .take(3)
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    match numbers.as_slice() {
        [major, minor, patch] => Some(Version::new(*major, *minor, *patch)),
        [major, minor] => Some(Version::new(*major, *minor, 0)),
        _ => None,
    }
}
