//! Pull request action types.

use serde::Serialize;

/// What happened to the pull request of an update group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrAction {
    /// A new pull request was opened.
    Created,

    /// An open pull request on the branch was refreshed.
    Updated,

    /// An open pull request with the same title already exists; nothing was touched.
    Unchanged,

    /// Nothing changed on disk, so no pull request was opened.
    NotCreated,
}

impl PrAction {
    /// Returns the action as a string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Unchanged => "unchanged",
            Self::NotCreated => "not_created",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialises_as_snake_case() {
        assert_eq!(
            serde_json::to_string(&PrAction::NotCreated).unwrap(),
            "\"not_created\""
        );
        assert_eq!(PrAction::Updated.as_str(), "updated");
    }
}
