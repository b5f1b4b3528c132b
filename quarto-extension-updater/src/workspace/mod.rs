//! Working tree inspection.
//!
//! After an install, the orchestrator asks the workspace which files under the
//! extension directory changed, and reverts the directory when an installed
//! extension can't be kept.

mod error;
mod git;

pub use error::WorkspaceError;
pub use git::GitWorkspace;

use crate::extensions::{read_extension_manifest, ExtensionManifest};
use async_trait::async_trait;
use std::path::Path;

/// A modified, added or deleted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileChange {
    /// Path relative to the repository root, `/`-separated.
    pub path: String,

    /// New content, or `None` if the file was deleted.
    pub content: Option<Vec<u8>>,
}

impl FileChange {
    #[must_use]
    pub fn is_deletion(&self) -> bool {
        self.content.is_none()
    }
}

/// The working tree extensions are installed into.
#[async_trait]
pub trait Workspace: Send + Sync {
    /// Directory installers run in.
    fn root(&self) -> &Path;

    /// Lists changed files under `directory` (relative to [`Workspace::root`]).
    async fn changed_files(&self, directory: &Path) -> Result<Vec<FileChange>, WorkspaceError>;

    /// Discards every change under `directory`.
    async fn revert(&self, directory: &Path) -> Result<(), WorkspaceError>;

    /// Reads the manifest installed in `directory`.
    async fn read_manifest(
        &self,
        directory: &Path,
    ) -> Result<Option<ExtensionManifest>, WorkspaceError> {
        Ok(read_extension_manifest(&self.root().join(directory))?)
    }
}
