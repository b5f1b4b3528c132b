//! Host error types.

use thiserror::Error;

/// Errors returned by the version-control host.
#[derive(Debug, Error)]
pub enum HostError {
    /// GitHub REST or transport error.
    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),

    /// A GraphQL request returned errors.
    #[error("GraphQL error: {message}")]
    GraphQl { message: String },

    /// The branch already exists.
    #[error("Branch '{branch}' already exists")]
    ReferenceExists { branch: String },

    /// The host answered with something unusable.
    #[error("Unexpected response: {message}")]
    UnexpectedResponse { message: String },
}
