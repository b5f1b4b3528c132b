//! Pull request error types.

use crate::host::HostError;
use crate::templates::TemplateError;
use crate::workspace::WorkspaceError;
use thiserror::Error;

/// Errors that abort processing of an update group.
#[derive(Debug, Error)]
pub enum PrError {
    /// Host API error.
    #[error(transparent)]
    Host(#[from] HostError),

    /// A name, title or body could not be rendered.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The working tree could not be inspected or reverted.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// The rendered branch name is not a valid git reference.
    #[error("Invalid branch name '{branch}': {message}")]
    InvalidBranchName { branch: String, message: String },

    /// The base branch does not exist.
    #[error("Base branch '{branch}' not found")]
    MissingBaseBranch { branch: String },
}
