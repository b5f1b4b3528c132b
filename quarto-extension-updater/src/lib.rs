#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

pub mod auto_merge;
pub mod config;
pub mod extensions;
pub mod host;
pub mod installer;
pub mod pull_requests;
pub mod registry;
pub mod runner;
pub mod summary;
pub mod templates;
pub mod updates;
pub mod version;
pub mod workspace;

pub use auto_merge::{
    classify_auto_merge_error, enable_auto_merge, group_eligibility, AutoMergeErrorKind,
    AutoMergeOutcome, Eligibility,
};
pub use config::{
    load_config, resolve_config, AutoMergePolicy, ConfigError, GroupingMode, MergeMethod,
    UpdatePolicy, UpdateStrategy, UpdaterConfig,
};
pub use extensions::{scan_installed_extensions, ExtensionError, InstalledExtension};
pub use host::{GitHubHost, HostError, HostService, RepositoryRef};
pub use installer::{ExtensionInstaller, InstallError, QuartoInstaller};
pub use pull_requests::{Orchestrator, PrAction, PrError, PrResult, SkippedUpdate};
pub use registry::{fetch_registry, parse_registry, RegistryEntry, RegistryError};
pub use runner::{Runner, RunnerConfig, RunnerError};
pub use summary::{write_github_output, RunSummary};
pub use templates::{TemplateError, TemplateRenderer};
pub use updates::{
    classify_updates, group_updates, resolve_updates, Update, UpdateClassification, UpdateGroup,
};
pub use version::{compare_versions, UpdateMagnitude, VersionComparison, VersionDiff};
pub use workspace::{FileChange, GitWorkspace, Workspace, WorkspaceError};
