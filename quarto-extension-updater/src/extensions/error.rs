//! Extension scanning error types.

use thiserror::Error;

/// Errors that can occur while scanning or reading extension manifests.
#[derive(Debug, Error)]
pub enum ExtensionError {
    /// Failed to read a file.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a manifest.
    #[error("Failed to parse extension manifest '{path}': {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Failed to walk the extensions directory.
    #[error("Failed to scan '{path}': {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },
}
