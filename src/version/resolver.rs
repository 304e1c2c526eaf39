//! Pre-release version resolution
//!
//! Computes the version a pre-release build should carry by reconciling the
//! manifest version with either the local Maven metadata or the registry.
//!
//! | ecosystem      | mode       | case                                  |
//! |----------------|------------|---------------------------------------|
//! | Maven / Gradle | full build | local snapshot metadata               |
//! | Maven / Gradle | other      | registry snapshot lookup              |
//! | npm            | any        | registry beta lookup, `version`       |
//! | Docker         | any        | registry beta lookup, docker tag      |

use std::path::Path;

use regex::Regex;
use tracing::{debug, info};

use crate::config::RepositoriesConfig;
use crate::error::PipelineError;
use crate::project::types::{BuildContext, CommandType, ProjectInfo, ProjectType};
use crate::version::metadata::read_snapshot_version;
use crate::version::registry::{Ecosystem, Registry};

/// Maven manifest pre-release marker
const SNAPSHOT_MARKER: &str = "SNAPSHOT";

/// Docker tag that is never searched or bumped
const LATEST_TAG: &str = "latest";

/// Which field a beta lookup writes back onto the context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BetaTarget {
    /// `projectInfo.version`
    Npm,
    /// `projectInfo.dockerPreReleaseVersion`
    Docker,
}

/// How a pre-release version is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionCase {
    /// Read the snapshot identifier the local build tool just deployed
    LocalSnapshotMetadata,
    /// Look up a snapshot identifier already published to the registry
    RegistrySnapshot,
    /// Look up (and possibly bump) a beta in the registry
    RegistryBeta(BetaTarget),
}

/// Decision table mapping ecosystem and mode onto a resolution case.
///
/// Returns None for ecosystems without pre-release resolution (Helm, Unknown).
pub fn resolution_case(project_type: ProjectType, command_type: CommandType) -> Option<ResolutionCase> {
    match (project_type.ecosystem()?, command_type) {
        (Ecosystem::Maven, CommandType::FullBuild) => Some(ResolutionCase::LocalSnapshotMetadata),
        (Ecosystem::Maven, _) => Some(ResolutionCase::RegistrySnapshot),
        (Ecosystem::Npm, _) => Some(ResolutionCase::RegistryBeta(BetaTarget::Npm)),
        (Ecosystem::Docker, _) => Some(ResolutionCase::RegistryBeta(BetaTarget::Docker)),
        (Ecosystem::Helm, _) => None,
    }
}

/// Whether a found beta is incremented (true) or adopted as-is (false)
pub fn is_bump_eligible(target: BetaTarget, command_type: CommandType) -> bool {
    match (target, command_type) {
        (BetaTarget::Npm, CommandType::FullBuild) => true,
        (BetaTarget::Npm, _) => false,
        (BetaTarget::Docker, CommandType::FullBuild | CommandType::DockerOnly) => true,
        (BetaTarget::Docker, _) => false,
    }
}

/// Strip a trailing numeric beta counter: `1.0.0-beta.3` -> `1.0.0-beta`
pub fn pre_release_base(version: &str) -> &str {
    match version.rsplit_once('.') {
        Some((head, counter))
            if head.contains('-')
                && !counter.is_empty()
                && counter.chars().all(|c| c.is_ascii_digit()) =>
        {
            head
        }
        _ => version,
    }
}

/// Registry search pattern for a Maven snapshot: `1.1.0-SNAPSHOT` -> (`1.1.0-`, `1.1.0-*`)
fn snapshot_search(version: &str) -> (&str, String) {
    let prefix = version.strip_suffix(SNAPSHOT_MARKER).unwrap_or(version);
    (prefix, format!("{prefix}*"))
}

pub struct VersionResolver<'a> {
    registry: &'a dyn Registry,
    repositories: &'a RepositoriesConfig,
    maven_repository: &'a Path,
    beta_re: Regex,
}

impl<'a> VersionResolver<'a> {
    pub fn new(
        registry: &'a dyn Registry,
        repositories: &'a RepositoriesConfig,
        maven_repository: &'a Path,
    ) -> Self {
        Self {
            registry,
            repositories,
            maven_repository,
            beta_re: Regex::new(r"^(?P<base>.+-beta)(?:\.(?P<counter>\d+))?$").expect("valid regex"),
        }
    }

    /// Produce a context whose pre-release version is the one to build and publish
    pub async fn resolve_pre_release_version(
        &self,
        context: BuildContext,
    ) -> Result<BuildContext, PipelineError> {
        let case = resolution_case(context.project_type, context.command_type).ok_or_else(|| {
            PipelineError::Configuration(format!(
                "{} projects have no pre-release version resolution",
                context.project_type.as_str()
            ))
        })?;
        debug!(
            "Resolving pre-release version of {} via {:?}",
            context.project_info.name, case
        );

        let info = context.project_info.clone();
        let resolved = match case {
            ResolutionCase::LocalSnapshotMetadata => self.resolve_from_local_metadata(info)?,
            ResolutionCase::RegistrySnapshot => self.resolve_registry_snapshot(info).await?,
            ResolutionCase::RegistryBeta(target) => {
                self.resolve_registry_beta(info, target, context.command_type)
                    .await?
            }
        };

        info!(
            "Resolved pre-release version of {}: {}",
            resolved.name,
            match case {
                ResolutionCase::RegistryBeta(BetaTarget::Docker) => resolved.docker_tag(),
                _ => resolved.version.as_str(),
            }
        );
        Ok(context.with_project_info(resolved))
    }

    fn resolve_from_local_metadata(&self, info: ProjectInfo) -> Result<ProjectInfo, PipelineError> {
        let version = self.local_snapshot(&info)?;

        let children = info
            .monorepo_children
            .iter()
            .map(|child| {
                let version = self.local_snapshot(child)?;
                Ok(child.clone().with_version(&version))
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;

        Ok(ProjectInfo {
            monorepo_children: children,
            ..info.with_version(&version)
        })
    }

    fn local_snapshot(&self, info: &ProjectInfo) -> Result<String, PipelineError> {
        let group = info.group.as_deref().ok_or_else(|| {
            PipelineError::Configuration(format!("{} has no group id", info.name))
        })?;

        read_snapshot_version(self.maven_repository, group, &info.name, &info.version).map_err(
            |e| {
                PipelineError::VersionResolution(format!(
                    "could not find pre-release version in local metadata: {e}"
                ))
            },
        )
    }

    async fn resolve_registry_snapshot(&self, info: ProjectInfo) -> Result<ProjectInfo, PipelineError> {
        let (prefix, pattern) = snapshot_search(&info.version);
        let query = Ecosystem::Maven
            .pre_release_query(self.repositories, info.group.as_deref(), &info.name)
            .matching_version(&pattern);

        let result = self.registry.search(&query).await?;
        let found = result.first_version_starting_with(prefix).ok_or_else(|| {
            PipelineError::VersionResolution(format!(
                "no matching pre-release version in registry for {} {}",
                info.name, info.version
            ))
        })?;

        let found = found.to_string();
        Ok(info.with_version(&found))
    }

    async fn resolve_registry_beta(
        &self,
        info: ProjectInfo,
        target: BetaTarget,
        command_type: CommandType,
    ) -> Result<ProjectInfo, PipelineError> {
        if target == BetaTarget::Docker && info.version == LATEST_TAG {
            debug!("Docker tag {} is used as-is", LATEST_TAG);
            return Ok(ProjectInfo {
                docker_pre_release_version: Some(LATEST_TAG.to_string()),
                ..info
            });
        }

        let ecosystem = match target {
            BetaTarget::Npm => Ecosystem::Npm,
            BetaTarget::Docker => Ecosystem::Docker,
        };
        let base = pre_release_base(&info.version);
        let query = ecosystem
            .pre_release_query(self.repositories, info.group.as_deref(), &info.name)
            .matching_version(&format!("{}*", info.version));

        let result = self.registry.search(&query).await?;
        let found = result.first_version_starting_with(base);

        let resolved = match (is_bump_eligible(target, command_type), found) {
            (true, Some(found)) => self.bump_beta(found)?,
            (true, None) => format!("{}.1", info.version),
            (false, Some(found)) => found.to_string(),
            (false, None) => {
                return Err(PipelineError::VersionResolution(format!(
                    "no matching pre-release version in registry for {} {}",
                    info.name, info.version
                )));
            }
        };

        Ok(match target {
            BetaTarget::Npm => info.with_version(&resolved),
            BetaTarget::Docker => ProjectInfo {
                docker_pre_release_version: Some(resolved),
                ..info
            },
        })
    }

    /// `<base>-beta.<N>` -> `<base>-beta.<N+1>`; a bare `<base>-beta` counts as 0
    fn bump_beta(&self, found: &str) -> Result<String, PipelineError> {
        let captures = self.beta_re.captures(found).ok_or_else(|| {
            PipelineError::VersionResolution(format!("registry version {found} is not a beta version"))
        })?;

        let counter = match captures.name("counter") {
            Some(counter) => counter.as_str().parse::<u64>().map_err(|e| {
                PipelineError::VersionResolution(format!("invalid beta counter in {found}: {e}"))
            })?,
            None => 0,
        };

        Ok(format!("{}.{}", &captures["base"], counter + 1))
    }
}
