//! Host-native auto-merge.
//!
//! Enabling auto-merge right after a pull request is created or updated often
//! fails while GitHub is still computing mergeability. [`enable_auto_merge`]
//! waits before the first attempt and retries exactly once when the failure
//! is of that kind. Failures are logged and never propagated.

mod classify;
mod eligibility;

pub use classify::{classify_auto_merge_error, suggests_missing_permission, AutoMergeErrorKind};
pub use eligibility::{group_eligibility, update_eligible, Eligibility};

use crate::config::AutoMergePolicy;
use crate::host::HostService;
use crate::updates::UpdateGroup;
use tracing::{debug, info, warn};

/// Attempts made before giving up.
const MAX_ATTEMPTS: u32 = 2;

/// Result of an auto-merge request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoMergeOutcome {
    /// Auto-merge is switched off.
    Disabled,
    /// The group doesn't qualify.
    Ineligible { reason: String },
    /// Auto-merge was already enabled on the pull request.
    AlreadyEnabled,
    /// Auto-merge was enabled.
    Enabled { attempts: u32 },
    /// Auto-merge could not be enabled.
    Failed { attempts: u32, message: String },
}

/// Enables auto-merge on `pr_number` if the group qualifies.
pub async fn enable_auto_merge(
    host: &dyn HostService,
    pr_number: u64,
    group: &UpdateGroup,
    policy: &AutoMergePolicy,
) -> AutoMergeOutcome {
    match group_eligibility(group, policy) {
        Eligibility::Eligible => {}
        Eligibility::Disabled => return AutoMergeOutcome::Disabled,
        Eligibility::NotQualified { reason } => {
            info!(pr_number, %reason, "Auto-merge not enabled");
            return AutoMergeOutcome::Ineligible { reason };
        }
    }

    let node_id = match host.pull_request_node_id(pr_number).await {
        Ok(id) => id,
        Err(e) => {
            let message = e.to_string();
            warn!(pr_number, error = %message, "Failed to resolve pull request id for auto-merge");
            return AutoMergeOutcome::Failed {
                attempts: 0,
                message,
            };
        }
    };

    match host.auto_merge_status(pr_number).await {
        Ok(Some(status)) => {
            info!(pr_number, enabled_at = ?status.enabled_at, "Auto-merge already enabled");
            return AutoMergeOutcome::AlreadyEnabled;
        }
        Ok(None) => {}
        Err(e) => warn!(pr_number, error = %e, "Failed to query auto-merge status"),
    }

    debug!(
        pr_number,
        delay_secs = policy.initial_delay_secs,
        "Waiting before enabling auto-merge"
    );
    tokio::time::sleep(policy.initial_delay()).await;

    let mut attempts = 0;
    loop {
        attempts += 1;
        let message = match host.enable_auto_merge(&node_id, policy.merge_method).await {
            Ok(()) => {
                info!(pr_number, merge_method = %policy.merge_method, attempts, "Auto-merge enabled");
                return AutoMergeOutcome::Enabled { attempts };
            }
            Err(e) => e.to_string(),
        };

        let kind = classify_auto_merge_error(&message);
        if kind == AutoMergeErrorKind::Transient && attempts < MAX_ATTEMPTS {
            info!(
                pr_number,
                delay_secs = policy.retry_delay_secs,
                "Pull request not yet mergeable, retrying auto-merge"
            );
            tokio::time::sleep(policy.retry_delay()).await;
            continue;
        }

        warn!(pr_number, attempts, error = %message, "Failed to enable auto-merge");
        if suggests_missing_permission(&message) {
            warn!(
                pr_number,
                "Enabling auto-merge requires a token with 'pull-requests: write' permission"
            );
        }
        return AutoMergeOutcome::Failed { attempts, message };
    }
}
