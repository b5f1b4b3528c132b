//! Auto-merge eligibility.

use crate::config::AutoMergePolicy;
use crate::updates::{Update, UpdateGroup};

/// Whether a group may be merged automatically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// Auto-merge is switched off.
    Disabled,
    /// At least one update is larger than the auto-merge strategy allows.
    NotQualified { reason: String },
}

impl Eligibility {
    #[must_use]
    pub fn is_eligible(&self) -> bool {
        matches!(self, Self::Eligible)
    }
}

/// Returns true if a single update may be merged automatically.
///
/// Updates with unparseable versions never qualify.
#[must_use]
pub fn update_eligible(update: &Update, policy: &AutoMergePolicy) -> bool {
    policy.enabled
        && update
            .magnitude()
            .is_some_and(|magnitude| policy.strategy.permits(magnitude))
}

/// Decides eligibility for a whole group: every member has to qualify.
#[must_use]
pub fn group_eligibility(group: &UpdateGroup, policy: &AutoMergePolicy) -> Eligibility {
    if !policy.enabled {
        return Eligibility::Disabled;
    }

    if let Some(update) = group
        .updates()
        .iter()
        .find(|update| !update_eligible(update, policy))
    {
        let reason = if group.is_single() {
            format!(
                "{} update of {} exceeds auto-merge strategy ({})",
                update.magnitude().map_or("unknown", |m| m.as_str()),
                update.extension_id(),
                policy.strategy
            )
        } else {
            format!(
                "not all updates qualify for auto-merge (strategy: {})",
                policy.strategy
            )
        };
        return Eligibility::NotQualified { reason };
    }

    Eligibility::Eligible
}
