//! Auto-merge error classification.

/// Substring GitHub reports while mergeability is still being computed.
const TRANSIENT_MARKER: &str = "clean status";

const PERMISSION_MARKERS: [&str; 4] = [
    "resource not accessible",
    "permission",
    "forbidden",
    "403",
];

/// How an auto-merge failure should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoMergeErrorKind {
    /// The pull request isn't mergeable yet; worth one retry.
    Transient,
    /// Anything else; not retried.
    Other,
}

/// Classifies the text of an auto-merge failure.
#[must_use]
pub fn classify_auto_merge_error(message: &str) -> AutoMergeErrorKind {
    if message.to_ascii_lowercase().contains(TRANSIENT_MARKER) {
        AutoMergeErrorKind::Transient
    } else {
        AutoMergeErrorKind::Other
    }
}

/// Returns true if the failure looks like a missing token permission.
#[must_use]
pub fn suggests_missing_permission(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    PERMISSION_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_transient_errors() {
        assert_eq!(
            classify_auto_merge_error("GraphQL error: Pull request Pull request is in clean status"),
            AutoMergeErrorKind::Transient
        );
        assert_eq!(
            classify_auto_merge_error("Auto merge is not allowed for this repository"),
            AutoMergeErrorKind::Other
        );
    }

    #[test]
    fn detects_permission_errors() {
        assert!(suggests_missing_permission(
            "Resource not accessible by integration"
        ));
        assert!(!suggests_missing_permission("Pull request is in clean status"));
    }
}
