//! Workspace error types.

use crate::extensions::ExtensionError;
use thiserror::Error;

/// Errors that can occur while inspecting or reverting the working tree.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Git could not be started.
    #[error("Failed to execute git {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Git exited with an error.
    #[error("git {command} failed: {stderr}")]
    Git { command: String, stderr: String },

    /// A changed file could not be read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An installed manifest could not be read.
    #[error(transparent)]
    Manifest(#[from] ExtensionError),
}
