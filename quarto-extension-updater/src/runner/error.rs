//! Runner error types.

/// Errors that abort a run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// Invalid settings or missing credentials.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// The workspace could not be scanned.
    #[error(transparent)]
    Extension(#[from] crate::extensions::ExtensionError),

    /// The registry could not be fetched.
    #[error(transparent)]
    Registry(#[from] crate::registry::RegistryError),

    /// The host client could not be set up.
    #[error(transparent)]
    Host(#[from] crate::host::HostError),

    /// The workspace is not a usable git checkout.
    #[error(transparent)]
    Workspace(#[from] crate::workspace::WorkspaceError),

    /// A dry-run preview could not be rendered.
    #[error(transparent)]
    Template(#[from] crate::templates::TemplateError),

    /// An update group failed.
    #[error(transparent)]
    PullRequest(#[from] crate::pull_requests::PrError),
}
