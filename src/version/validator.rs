//! Version checks against registry history
//!
//! Nothing here changes a project's version; the checks only accept or reject.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::project::types::{BuildToolInfo, LatestNexusVersions, VersionType};
use crate::version::semver::{compare_versions, trim_version};
use crate::version::types::NexusSearchResult;

/// Stand-in for a category the registry has no version of
const NO_VERSION: &str = "0.0.0";

/// Docker tag that is exempt from monotonicity checks
const LATEST_TAG: &str = "latest";

/// Outcome of checking the running tool against its own published releases
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolVersionStatus {
    /// No published version outranks the running tool
    UpToDate,
    /// A release at or above the running version exists; the run must stop
    Outdated { latest: String },
    /// The running pre-release is behind; the user decides whether to go on
    OutdatedPreRelease { latest: String },
}

fn compare_trimmed(version: &str, other: &str) -> Result<Ordering, PipelineError> {
    compare_versions(trim_version(version), trim_version(other)).ok_or_else(|| {
        PipelineError::Configuration(format!("Cannot compare versions {version} and {other}"))
    })
}

/// Reject a project version that does not move past registry history.
///
/// The version must be strictly above the latest release and, for a
/// pre-release, at least the latest pre-release. Pre-release suffixes are
/// trimmed before comparing.
pub fn validate_project_version(
    version: &str,
    version_type: VersionType,
    latest: &LatestNexusVersions,
) -> Result<(), PipelineError> {
    if version == LATEST_TAG {
        debug!("Skipping version validation for {}", LATEST_TAG);
        return Ok(());
    }

    let latest_release = latest.latest_release_version.as_deref().unwrap_or(NO_VERSION);
    if compare_trimmed(version, latest_release)? != Ordering::Greater {
        return Err(PipelineError::VersionConflict(format!(
            "Project version is not higher than versions in Nexus: {version} <= release {latest_release}"
        )));
    }

    if version_type == VersionType::PreRelease {
        let latest_pre_release = latest
            .latest_pre_release_version
            .as_deref()
            .unwrap_or(NO_VERSION);
        if compare_trimmed(version, latest_pre_release)? == Ordering::Less {
            return Err(PipelineError::VersionConflict(format!(
                "Project version is not higher than versions in Nexus: {version} < pre-release {latest_pre_release}"
            )));
        }
    }

    Ok(())
}

/// Reject a release version that is already published
pub fn check_version_uniqueness(
    version: &str,
    published: &NexusSearchResult,
) -> Result<(), PipelineError> {
    if published.items.iter().any(|item| item.version == version) {
        return Err(PipelineError::VersionConflict(format!(
            "Version {version} is already published in Nexus"
        )));
    }
    Ok(())
}

/// A published version that ranks at or above the running tool.
///
/// With `allow_equal` unset only strictly newer versions count.
fn outranking<'a>(
    tool: &BuildToolInfo,
    candidate: Option<&'a str>,
    allow_equal: bool,
) -> Option<&'a str> {
    candidate.filter(|candidate| match compare_versions(candidate, &tool.version) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Equal) => allow_equal,
        Some(Ordering::Less) => false,
        None => {
            warn!("Ignoring unparseable {} version {}", tool.name, candidate);
            false
        }
    })
}

/// Compare the running tool with the newest published versions of itself.
///
/// A release tool is outdated once any release at or above its own version
/// is published. A pre-release tool is only behind strictly newer versions.
pub fn tool_version_status(
    tool: &BuildToolInfo,
    latest_release: Option<&str>,
    latest_pre_release: Option<&str>,
) -> ToolVersionStatus {
    match tool.version_type {
        VersionType::Release => match outranking(tool, latest_release, true) {
            Some(latest) => ToolVersionStatus::Outdated {
                latest: latest.to_string(),
            },
            None => ToolVersionStatus::UpToDate,
        },
        VersionType::PreRelease => match outranking(tool, latest_release, false)
            .or_else(|| outranking(tool, latest_pre_release, false))
        {
            Some(latest) => ToolVersionStatus::OutdatedPreRelease {
                latest: latest.to_string(),
            },
            None => ToolVersionStatus::UpToDate,
        },
    }
}
