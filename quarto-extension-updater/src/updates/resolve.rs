//! Update resolution.

use crate::config::UpdatePolicy;
use crate::extensions::InstalledExtension;
use crate::registry::{find_entry, RegistryEntry};
use crate::updates::Update;
use crate::version::{compare_versions, VersionComparison};
use tracing::debug;

/// Version recorded by Quarto when an extension has no release.
const NO_VERSION: &str = "none";

/// Pairs installed extensions with newer registry releases.
///
/// Extensions without a recorded source or version, filtered out by the
/// include/exclude lists, unknown to the registry, already up to date, or
/// whose update is larger than the strategy allows produce nothing. The output
/// keeps the order of `installed`.
#[must_use]
pub fn resolve_updates(
    installed: &[InstalledExtension],
    registry: &[RegistryEntry],
    policy: &UpdatePolicy,
) -> Vec<Update> {
    installed
        .iter()
        .filter_map(|extension| resolve_one(extension, registry, policy))
        .collect()
}

fn resolve_one(
    extension: &InstalledExtension,
    registry: &[RegistryEntry],
    policy: &UpdatePolicy,
) -> Option<Update> {
    let id = extension.name_with_owner();

    let (Some(current), Some(_source)) = (&extension.version, &extension.source) else {
        debug!(extension = %id, "No recorded version or source, skipping");
        return None;
    };
    if current == NO_VERSION {
        debug!(extension = %id, "Installed without a release, skipping");
        return None;
    }

    if !policy.allows(&id) {
        debug!(extension = %id, "Filtered out by include/exclude lists");
        return None;
    }

    let entry = find_entry(registry, &id).or_else(|| {
        extension
            .declared_repository()
            .and_then(|repository| find_entry(registry, &repository))
    });
    let Some(entry) = entry else {
        debug!(extension = %id, "Not found in registry");
        return None;
    };

    let diff = match compare_versions(current, &entry.latest_version) {
        VersionComparison::Outdated(diff) => diff,
        VersionComparison::UpToDate => {
            debug!(extension = %id, version = %current, "Up to date");
            return None;
        }
        VersionComparison::Invalid => {
            debug!(
                extension = %id,
                current = %current,
                latest = %entry.latest_version,
                "Unparseable version, skipping"
            );
            return None;
        }
    };

    if !policy.update_strategy.permits(diff.magnitude()) {
        debug!(
            extension = %id,
            diff = %diff,
            strategy = %policy.update_strategy,
            "Update exceeds strategy, skipping"
        );
        return None;
    }

    Some(Update {
        owner: extension.owner.clone(),
        name: extension.name.clone(),
        name_with_owner: entry.owner_repo.clone(),
        install_source_ref: format!("{}@{}", entry.owner_repo, entry.latest_version_tag),
        current_version: current.clone(),
        latest_version: entry.latest_version.clone(),
        manifest_path: extension.manifest_path.clone(),
        homepage_url: entry.homepage_url.clone(),
        release_url: entry.release_notes_url.clone(),
        description: entry.description.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UpdateStrategy;
    use std::path::PathBuf;

    fn installed(owner: &str, name: &str, version: &str, source: &str) -> InstalledExtension {
        InstalledExtension {
            owner: owner.to_string(),
            name: name.to_string(),
            manifest_path: PathBuf::from(format!("_extensions/{owner}/{name}/_extension.yml")),
            version: Some(version.to_string()),
            source: Some(source.to_string()),
        }
    }

    fn entry(owner_repo: &str, latest: &str) -> RegistryEntry {
        RegistryEntry {
            owner_repo: owner_repo.to_string(),
            latest_version: latest.to_string(),
            latest_version_tag: latest.to_string(),
            release_notes_url: None,
            description: None,
            homepage_url: None,
        }
    }

    fn policy(strategy: UpdateStrategy) -> UpdatePolicy {
        UpdatePolicy {
            update_strategy: strategy,
            ..UpdatePolicy::default()
        }
    }

    #[test]
    fn patch_strategy_accepts_patch_only() {
        let ext = [installed("a", "b", "1.0.0", "a/b@1.0.0")];

        let updates = resolve_updates(&ext, &[entry("a/b", "1.0.1")], &policy(UpdateStrategy::Patch));
        assert_eq!(updates.len(), 1);

        let updates = resolve_updates(&ext, &[entry("a/b", "1.1.0")], &policy(UpdateStrategy::Patch));
        assert!(updates.is_empty());
    }

    #[test]
    fn strategies_are_nested() {
        let ext = [installed("a", "b", "1.0.0", "a/b@1.0.0")];
        let cases = [
            ("1.0.1", [true, true, true]),
            ("1.1.0", [false, true, true]),
            ("2.0.0", [false, false, true]),
            ("1.1.0-beta.1", [false, true, true]),
        ];

        for (latest, expected) in cases {
            let registry = [entry("a/b", latest)];
            for (strategy, expected) in [UpdateStrategy::Patch, UpdateStrategy::Minor, UpdateStrategy::All]
                .into_iter()
                .zip(expected)
            {
                let found = !resolve_updates(&ext, &registry, &policy(strategy)).is_empty();
                assert_eq!(found, expected, "{latest} with {strategy}");
            }
        }
    }

    #[test]
    fn exclude_wins_over_include() {
        let ext = [installed("a", "b", "1.0.0", "a/b@1.0.0")];
        let registry = [entry("a/b", "1.0.1")];
        let policy = UpdatePolicy {
            update_strategy: UpdateStrategy::All,
            include: vec!["a/b".to_string()],
            exclude: vec!["a/b".to_string()],
        };

        assert!(resolve_updates(&ext, &registry, &policy).is_empty());
    }

    #[test]
    fn include_limits_candidates() {
        let ext = [
            installed("a", "b", "1.0.0", "a/b@1.0.0"),
            installed("c", "d", "1.0.0", "c/d@1.0.0"),
        ];
        let registry = [entry("a/b", "1.0.1"), entry("c/d", "1.0.1")];
        let policy = UpdatePolicy {
            include: vec!["c/d".to_string()],
            ..UpdatePolicy::default()
        };

        let updates = resolve_updates(&ext, &registry, &policy);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].owner, "c");
    }

    #[test]
    fn falls_back_to_declared_repository() {
        let ext = [installed(
            "mcanouil",
            "iconify",
            "v1.0.0",
            "mcanouil/quarto-iconify@v1.0.0",
        )];
        let mut release = entry("mcanouil/quarto-iconify", "v1.2.0");
        release.release_notes_url = Some("https://example.com/notes".to_string());

        let updates = resolve_updates(&ext, &[release], &policy(UpdateStrategy::All));

        assert_eq!(updates.len(), 1);
        let update = &updates[0];
        assert_eq!(update.name_with_owner, "mcanouil/quarto-iconify");
        assert_eq!(update.install_source_ref, "mcanouil/quarto-iconify@v1.2.0");
        assert_eq!(update.current_version, "v1.0.0");
        assert_eq!(update.latest_version, "v1.2.0");
        assert_eq!(update.release_url.as_deref(), Some("https://example.com/notes"));
    }

    #[test]
    fn skips_incomplete_and_current_extensions() {
        let mut no_source = installed("a", "b", "1.0.0", "a/b@1.0.0");
        no_source.source = None;
        let ext = [
            no_source,
            installed("c", "d", "none", "c/d"),
            installed("e", "f", "2.0.0", "e/f@2.0.0"),
            installed("g", "h", "not-a-version", "g/h@x"),
            installed("i", "j", "1.0.0", "i/j@1.0.0"),
        ];
        let registry = [
            entry("a/b", "1.0.1"),
            entry("c/d", "1.0.1"),
            entry("e/f", "2.0.0"),
            entry("g/h", "1.0.0"),
        ];

        assert!(resolve_updates(&ext, &registry, &policy(UpdateStrategy::All)).is_empty());
    }

    #[test]
    fn preserves_scan_order() {
        let ext = [
            installed("z", "last", "1.0.0", "z/last@1.0.0"),
            installed("a", "first", "1.0.0", "a/first@1.0.0"),
        ];
        let registry = [entry("a/first", "1.0.1"), entry("z/last", "1.0.1")];

        let updates = resolve_updates(&ext, &registry, &policy(UpdateStrategy::All));
        let names: Vec<_> = updates.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, ["last", "first"]);
    }
}
