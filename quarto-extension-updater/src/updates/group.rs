//! Grouping updates into pull requests.

use crate::config::GroupingMode;
use crate::updates::Update;

/// A non-empty, ordered set of updates applied by one pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateGroup {
    updates: Vec<Update>,
}

impl UpdateGroup {
    /// Creates a group, or `None` if `updates` is empty.
    #[must_use]
    pub fn new(updates: Vec<Update>) -> Option<Self> {
        if updates.is_empty() {
            None
        } else {
            Some(Self { updates })
        }
    }

    /// Creates a group holding a single update.
    #[must_use]
    pub fn single(update: Update) -> Self {
        Self {
            updates: vec![update],
        }
    }

    #[must_use]
    pub fn updates(&self) -> &[Update] {
        &self.updates
    }

    /// First update of the group.
    #[must_use]
    pub fn first(&self) -> &Update {
        &self.updates[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    /// Groups are never empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns true if the group contains exactly one update.
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.updates.len() == 1
    }

    /// Returns the `owner/name` of every extension in the group.
    #[must_use]
    pub fn extension_ids(&self) -> Vec<String> {
        self.updates.iter().map(Update::extension_id).collect()
    }
}

/// Splits updates into pull-request groups.
#[must_use]
pub fn group_updates(updates: Vec<Update>, mode: GroupingMode) -> Vec<UpdateGroup> {
    match mode {
        GroupingMode::PerExtension => updates.into_iter().map(UpdateGroup::single).collect(),
        GroupingMode::Single => UpdateGroup::new(updates).into_iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::updates::update::sample_update;

    fn updates() -> Vec<Update> {
        vec![
            sample_update("a", "one", "1.0.0", "1.0.1"),
            sample_update("b", "two", "1.0.0", "2.0.0"),
        ]
    }

    #[test]
    fn one_group_per_extension() {
        let groups = group_updates(updates(), GroupingMode::PerExtension);
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(UpdateGroup::is_single));
        assert_eq!(groups[1].first().name, "two");
    }

    #[test]
    fn single_group_keeps_order() {
        let groups = group_updates(updates(), GroupingMode::Single);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].extension_ids(), ["a/one", "b/two"]);
    }

    #[test]
    fn no_updates_no_groups() {
        assert!(group_updates(Vec::new(), GroupingMode::Single).is_empty());
        assert!(UpdateGroup::new(Vec::new()).is_none());
    }
}
