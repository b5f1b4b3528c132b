//! Installer error types.

use thiserror::Error;

/// Errors that can occur while running the extension installer.
#[derive(Debug, Error)]
pub enum InstallError {
    /// The installer program could not be started.
    #[error("Failed to execute {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The installer ran and reported a failure.
    #[error("{message}")]
    Failed {
        message: String,
        stderr: Option<String>,
        stdout: Option<String>,
    },
}

impl InstallError {
    /// Returns the most useful description of the failure: the tool's
    /// diagnostic output when there is any, otherwise the error message.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            Self::Failed {
                stderr: Some(stderr),
                ..
            } if !stderr.trim().is_empty() => stderr.trim().to_string(),
            _ => self.to_string(),
        }
    }
}
