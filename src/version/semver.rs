use std::cmp::Ordering;

use semver::Version;

use crate::version::range::VersionSpec;

/// Highest counter a ranged pre-release may expand to
const MAX_PRE_RELEASE_COUNTER: u64 = 999;

/// Highest minor/patch a caret or tilde range may expand to
const MAX_COMPONENT: u64 = 999;

/// Parse a version string into a semver::Version, normalizing partial versions.
///
/// Handles partial versions like "1" or "1.2" by padding with zeros.
///
/// Examples:
/// - "1" -> Version(1, 0, 0)
/// - "1.2" -> Version(1, 2, 0)
/// - "1.2.3-beta.4" -> Version(1, 2, 3, pre: beta.4)
pub fn parse_version(version: &str) -> Option<Version> {
    let version = version.trim();
    let (core, pre) = match version.split_once('-') {
        Some((core, pre)) => (core, Some(pre)),
        None => (version, None),
    };
    let parts: Vec<&str> = core.split('.').collect();
    let core = match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => core.to_string(),
    };
    let normalized = match pre {
        Some(pre) => format!("{core}-{pre}"),
        None => core,
    };
    Version::parse(&normalized).ok()
}

/// Strip everything from the first pre-release delimiter onward.
///
/// `"1.0.0-beta.3"` -> `"1.0.0"`, `"1.0.0-SNAPSHOT"` -> `"1.0.0"`.
pub fn trim_version(version: &str) -> &str {
    match version.find('-') {
        Some(index) => &version[..index],
        None => version,
    }
}

/// Returns true when the version carries a pre-release marker.
///
/// The Docker tag `latest` counts as a pre-release.
pub fn is_pre_release(version: &str) -> bool {
    version == "latest" || version.contains('-')
}

/// Compute the highest version a range expression permits.
///
/// - `^1.2.3` -> `1.999.999`
/// - `~1.2.3` -> `1.2.999`
/// - `^1.2.3-beta.1` -> `1.2.3-beta.999` (a pre-release only expands its counter)
/// - `1.2.3` -> `1.2.3`
pub fn expand_range_to_maximum(range: &str) -> String {
    let range = range.trim();
    let (marker, version) = match range.chars().next() {
        Some(c @ ('^' | '~')) => (Some(c), range[1..].trim()),
        _ => (None, range),
    };

    if version.contains('-') {
        return format!("{}-beta.{}", trim_version(version), MAX_PRE_RELEASE_COUNTER);
    }

    let mut parts = version.split('.');
    let major = parts.next().unwrap_or("0");
    let minor = parts.next().unwrap_or("0");

    match marker {
        Some('^') => format!("{major}.{MAX_COMPONENT}.{MAX_COMPONENT}"),
        Some('~') => format!("{major}.{minor}.{MAX_COMPONENT}"),
        _ => version.to_string(),
    }
}

/// Check whether a candidate version satisfies an npm-style range.
///
/// Pre-release candidates are excluded from ordinary matching unless
/// `include_pre_release` is set or the range itself names a pre-release of the
/// same `major.minor.patch`.
pub fn satisfies_range(candidate: &str, range: &str, include_pre_release: bool) -> bool {
    let Some(spec) = VersionSpec::parse(range) else {
        return false;
    };
    let Some(version) = parse_version(candidate) else {
        return false;
    };

    if !version.pre.is_empty() && !include_pre_release && !spec.allows_pre_release_of(&version) {
        return false;
    }

    spec.satisfies(&version)
}

/// Compare two version strings by semver precedence.
///
/// Pre-releases sort below their release (`1.0.0-beta < 1.0.0`) and numeric
/// pre-release counters compare numerically (`beta.9 < beta.10`).
/// Returns None when either side does not parse.
pub fn compare_versions(left: &str, right: &str) -> Option<Ordering> {
    let left = parse_version(left)?;
    let right = parse_version(right)?;
    Some(left.cmp(&right))
}
