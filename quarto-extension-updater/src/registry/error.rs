//! Registry error types.

use thiserror::Error;

/// Errors that can occur while fetching the extensions registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The request could not be sent or the body could not be read.
    #[error("Failed to fetch registry '{url}': {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request exceeded the configured timeout.
    #[error("Timed out fetching registry '{url}' after {timeout_secs} seconds")]
    Timeout { url: String, timeout_secs: u64 },

    /// The server answered with a non-success status.
    #[error("Registry '{url}' returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// The body is not a registry document.
    #[error("Malformed registry document: {source}")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },
}
