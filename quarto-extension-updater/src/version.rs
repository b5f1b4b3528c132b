//! Semantic version comparison.
//!
//! Parsing is delegated to [`semver`]. This module adds the leading-`v`
//! normalisation used by extension release tags and the bump classification
//! (`major`, `preminor`, `patch`, ...) that update policies are expressed in.

use semver::Version;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Kind of change between two versions.
///
/// Mirrors the categories reported by npm's `semver.diff`, which is what
/// registry maintainers reason in when tagging releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionDiff {
    /// Major bump.
    Major,
    /// Major bump to a pre-release.
    PreMajor,
    /// Minor bump.
    Minor,
    /// Minor bump to a pre-release.
    PreMinor,
    /// Patch bump.
    Patch,
    /// Patch bump to a pre-release.
    PrePatch,
    /// Change in the pre-release identifier only.
    PreRelease,
}

impl VersionDiff {
    /// Folds pre-release variants into the magnitude they belong to.
    #[must_use]
    pub fn magnitude(self) -> UpdateMagnitude {
        match self {
            Self::Major | Self::PreMajor => UpdateMagnitude::Major,
            Self::Minor | Self::PreMinor => UpdateMagnitude::Minor,
            Self::Patch | Self::PrePatch | Self::PreRelease => UpdateMagnitude::Patch,
        }
    }

    /// Returns the diff name as used by npm's `semver.diff`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::PreMajor => "premajor",
            Self::Minor => "minor",
            Self::PreMinor => "preminor",
            Self::Patch => "patch",
            Self::PrePatch => "prepatch",
            Self::PreRelease => "prerelease",
        }
    }
}

impl fmt::Display for VersionDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Size of an update. Ordered from smallest to largest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMagnitude {
    /// Patch-level (or pre-release only) update.
    Patch,
    /// Minor update.
    Minor,
    /// Major update.
    Major,
}

impl UpdateMagnitude {
    /// Returns the magnitude as a lowercase string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Patch => "patch",
            Self::Minor => "minor",
            Self::Major => "major",
        }
    }
}

impl fmt::Display for UpdateMagnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of comparing an installed version against the latest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComparison {
    /// The installed version is older; carries the kind of bump.
    Outdated(VersionDiff),
    /// The installed version is equal to or newer than the latest one.
    UpToDate,
    /// At least one side is not a valid semantic version.
    Invalid,
}

/// Strips surrounding whitespace and a single leading `v`.
#[must_use]
pub fn normalise_version(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed.strip_prefix('v').unwrap_or(trimmed)
}

/// Parses a possibly `v`-prefixed version string.
#[must_use]
pub fn parse_version(raw: &str) -> Option<Version> {
    Version::parse(normalise_version(raw)).ok()
}

/// Compares by semver precedence. Build metadata is ignored.
#[must_use]
pub fn precedence(a: &Version, b: &Version) -> Ordering {
    a.major
        .cmp(&b.major)
        .then(a.minor.cmp(&b.minor))
        .then(a.patch.cmp(&b.patch))
        .then_with(|| a.pre.cmp(&b.pre))
}

/// Returns the kind of change between two versions, or `None` when they have
/// the same precedence. The result does not depend on argument order.
#[must_use]
pub fn diff(a: &Version, b: &Version) -> Option<VersionDiff> {
    let ordering = precedence(a, b);
    if ordering == Ordering::Equal {
        return None;
    }

    let (high, low) = if ordering == Ordering::Greater {
        (a, b)
    } else {
        (b, a)
    };
    let high_has_pre = !high.pre.is_empty();
    let low_has_pre = !low.pre.is_empty();

    // Leaving a pre-release for its own release is sized by where the
    // pre-release sat, not by the numeric fields that are already equal.
    if low_has_pre && !high_has_pre {
        if low.patch == 0 && low.minor == 0 {
            return Some(VersionDiff::Major);
        }
        if (low.major, low.minor, low.patch) == (high.major, high.minor, high.patch) {
            if low.minor != 0 && low.patch == 0 {
                return Some(VersionDiff::Minor);
            }
            return Some(VersionDiff::Patch);
        }
    }

    let diff = if a.major != b.major {
        if high_has_pre {
            VersionDiff::PreMajor
        } else {
            VersionDiff::Major
        }
    } else if a.minor != b.minor {
        if high_has_pre {
            VersionDiff::PreMinor
        } else {
            VersionDiff::Minor
        }
    } else if a.patch != b.patch {
        if high_has_pre {
            VersionDiff::PrePatch
        } else {
            VersionDiff::Patch
        }
    } else {
        VersionDiff::PreRelease
    };
    Some(diff)
}

/// Compares an installed version against the latest available one.
#[must_use]
pub fn compare_versions(current: &str, latest: &str) -> VersionComparison {
    let (Some(current), Some(latest)) = (parse_version(current), parse_version(latest)) else {
        return VersionComparison::Invalid;
    };

    if precedence(&current, &latest) != Ordering::Less {
        return VersionComparison::UpToDate;
    }

    match diff(&current, &latest) {
        Some(kind) => VersionComparison::Outdated(kind),
        None => VersionComparison::UpToDate,
    }
}
