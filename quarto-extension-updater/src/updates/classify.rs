//! Update classification by magnitude.

use crate::updates::Update;
use crate::version::UpdateMagnitude;
use serde::Serialize;

/// Updates partitioned by magnitude.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateClassification {
    pub major: Vec<Update>,
    pub minor: Vec<Update>,
    pub patch: Vec<Update>,
}

impl UpdateClassification {
    /// Number of classified updates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.major.len() + self.minor.len() + self.patch.len()
    }

    /// Returns true if no update was classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Splits updates into major, minor and patch buckets.
///
/// Updates whose versions can't be parsed are dropped. Identical versions
/// count as patch.
#[must_use]
pub fn classify_updates(updates: &[Update]) -> UpdateClassification {
    let mut classification = UpdateClassification::default();

    for update in updates {
        let bucket = match update.magnitude() {
            Some(UpdateMagnitude::Major) => &mut classification.major,
            Some(UpdateMagnitude::Minor) => &mut classification.minor,
            Some(UpdateMagnitude::Patch) => &mut classification.patch,
            None => continue,
        };
        bucket.push(update.clone());
    }

    classification
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::updates::update::sample_update;

    #[test]
    fn partitions_by_magnitude() {
        let updates = [
            sample_update("a", "major", "1.0.0", "2.0.0"),
            sample_update("a", "minor", "v1.0.0", "v1.1.0"),
            sample_update("a", "patch", "1.0.0", "1.0.1"),
            sample_update("a", "premajor", "1.0.0", "2.0.0-rc.1"),
            sample_update("a", "prerelease", "1.0.0-rc.1", "1.0.0-rc.2"),
            sample_update("a", "same", "1.0.0", "1.0.0"),
            sample_update("a", "broken", "one", "1.0.0"),
        ];

        let classification = classify_updates(&updates);

        let names = |bucket: &[Update]| bucket.iter().map(|u| u.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&classification.major), ["major", "premajor"]);
        assert_eq!(names(&classification.minor), ["minor"]);
        assert_eq!(names(&classification.patch), ["patch", "prerelease", "same"]);
        assert_eq!(classification.len(), updates.len() - 1);
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(classify_updates(&[]).is_empty());
    }
}
