//! CLI for the Quarto Extension Updater.
//!
//! This tool checks the Quarto extensions vendored in a workspace against the
//! extensions registry and opens update pull requests, optionally enabling
//! auto-merge.

use clap::Parser;
use quarto_extension_updater::summary::github_output_path;
use quarto_extension_updater::{
    resolve_config, write_github_output, MergeMethod, RunSummary, Runner, RunnerConfig,
    RunnerError, UpdateStrategy, UpdaterConfig,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Quarto Extension Updater - Open pull requests for outdated Quarto extensions.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Workspace containing the `_extensions` directory.
    #[arg(long, default_value = ".")]
    workspace: PathBuf,

    /// Path to the configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// GitHub token. Required unless running with --dry-run.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Target repository, `owner/name`.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// Preview updates without installing anything or calling GitHub.
    #[arg(long)]
    dry_run: bool,

    /// Largest update to apply: all, minor or patch.
    #[arg(long)]
    update_strategy: Option<UpdateStrategy>,

    /// Put every update in a single pull request.
    #[arg(long)]
    group_updates: bool,

    /// Branch pull requests target. Defaults to the repository's default branch.
    #[arg(long)]
    base_branch: Option<String>,

    /// Enable auto-merge on qualifying pull requests.
    #[arg(long)]
    auto_merge: bool,

    /// Largest update auto-merge applies to: all, minor or patch.
    #[arg(long)]
    auto_merge_strategy: Option<UpdateStrategy>,

    /// Merge method used by auto-merge: merge, squash or rebase.
    #[arg(long)]
    merge_method: Option<MergeMethod>,

    /// Extensions registry URL.
    #[arg(long)]
    registry_url: Option<String>,
}

impl Args {
    /// Applies command-line overrides on top of the loaded settings.
    fn apply_overrides(&self, config: &mut UpdaterConfig) {
        if let Some(strategy) = self.update_strategy {
            config.update_strategy = strategy;
        }
        if self.group_updates {
            config.group_updates = true;
        }
        if let Some(base) = &self.base_branch {
            config.base_branch = Some(base.clone());
        }
        if self.auto_merge {
            config.auto_merge.enabled = true;
        }
        if let Some(strategy) = self.auto_merge_strategy {
            config.auto_merge.strategy = strategy;
        }
        if let Some(method) = self.merge_method {
            config.auto_merge.merge_method = method;
        }
        if let Some(url) = &self.registry_url {
            config.registry_url = url.clone();
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    init_tracing();

    // octocrab and reqwest share rustls; pick one provider for the process
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Parse arguments
    let args = Args::parse();

    // Run the main logic
    match run(args).await {
        Ok(summary) => {
            print_summary(&summary);

            if let Some(path) = github_output_path() {
                if let Err(e) = write_github_output(&path, &summary) {
                    warn!(path = %path.display(), error = %e, "Failed to write step outputs");
                }
            }

            ExitCode::from(0)
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<RunSummary, RunnerError> {
    let mut updater = resolve_config(args.config.as_deref(), &args.workspace)?;
    args.apply_overrides(&mut updater);
    info!(
        workspace = %args.workspace.display(),
        strategy = %updater.update_strategy,
        grouped = updater.group_updates,
        auto_merge = updater.auto_merge.enabled,
        "Starting update run"
    );

    let mut config = RunnerConfig::new(args.workspace, updater, args.dry_run);
    if let Some(token) = args.token.filter(|t| !t.is_empty()) {
        config = config.with_token(token);
    }
    if let Some(repository) = args.repository.filter(|r| !r.is_empty()) {
        config = config.with_repository(repository);
    }

    let runner = Runner::new(config)?;
    runner.run().await
}

/// Prints the final run summary.
fn print_summary(summary: &RunSummary) {
    println!("\nSummary:");
    println!(
        "  Mode: {}",
        if summary.dry_run { "Dry Run" } else { "Live" }
    );
    println!("  Extensions scanned: {}", summary.extensions_scanned);
    println!(
        "  Updates found: {} (major: {}, minor: {}, patch: {})",
        summary.updates_found, summary.major_updates, summary.minor_updates, summary.patch_updates
    );

    if !summary.dry_run {
        println!("  Updates applied: {}", summary.updates_applied);
        println!("  Updates skipped: {}", summary.updates_skipped);
        println!("  PRs created: {}", summary.prs_created);
        println!("  PRs updated: {}", summary.prs_updated);
        println!("  PRs unchanged: {}", summary.prs_unchanged);
        if let Some((number, url)) = &summary.first_pr {
            println!("  First PR: #{number} {url}");
        }
    }

    if summary.has_skipped() {
        println!("\nSkipped:");
        for (extension, reason) in &summary.skipped {
            println!("  {extension}: {reason}");
        }
    }
}
