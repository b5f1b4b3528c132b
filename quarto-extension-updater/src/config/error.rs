//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
///
/// All of these are raised before any extension is installed or any branch is
/// touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML content.
    #[error("Failed to parse configuration '{path}': {source}")]
    TomlError {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// A setting holds a value outside of its accepted set.
    #[error("Invalid value '{value}' for {field}: expected {expected}")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Validation error in a setting.
    #[error("Validation error in {field}: {message}")]
    ValidationError { field: &'static str, message: String },
}
