//! Stages comparing the project's version with registry history

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::PipelineError;
use crate::pipeline::predicates::{
    has_pre_release_resolution, is_full_build, is_maven, is_npm, is_pre_release, is_release,
    is_terraform_only,
};
use crate::pipeline::stage::{Services, Stage};
use crate::project::manifest::split_npm_name;
use crate::project::types::{BuildContext, LatestNexusVersions, ProjectInfo};
use crate::version::registry::{Ecosystem, SearchQuery};
use crate::version::semver::{expand_range_to_maximum, is_pre_release as is_pre_release_version, satisfies_range};
use crate::version::validator::{check_version_uniqueness, validate_project_version};

fn ecosystem_of(context: &BuildContext) -> Result<Ecosystem, PipelineError> {
    context.project_type.ecosystem().ok_or_else(|| {
        PipelineError::Configuration(format!(
            "{} projects are not published to Nexus",
            context.project_type.as_str()
        ))
    })
}

pub struct FetchLatestNexusVersions;

#[async_trait]
impl Stage for FetchLatestNexusVersions {
    fn name(&self) -> &'static str {
        "fetch-latest-nexus-versions"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        !is_terraform_only(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        let ecosystem = ecosystem_of(&context)?;
        let repositories = &services.config.repositories;
        let info = &context.project_info;
        let group = info.group.as_deref();

        let releases = services
            .registry
            .search(&ecosystem.release_query(repositories, group, &info.name))
            .await?;
        let pre_releases = services
            .registry
            .search(&ecosystem.pre_release_query(repositories, group, &info.name))
            .await?;

        let latest = LatestNexusVersions {
            latest_release_version: releases.latest_version().map(str::to_string),
            latest_pre_release_version: pre_releases.latest_version().map(str::to_string),
        };
        info!(
            "Latest in Nexus for {}: release {}, pre-release {}",
            info.name,
            latest.latest_release_version.as_deref().unwrap_or("none"),
            latest.latest_pre_release_version.as_deref().unwrap_or("none")
        );

        let info = ProjectInfo {
            latest_nexus_versions: Some(latest),
            ..context.project_info.clone()
        };
        Ok(context.with_project_info(info))
    }
}

pub struct ValidateProjectVersion;

#[async_trait]
impl Stage for ValidateProjectVersion {
    fn name(&self) -> &'static str {
        "validate-project-version"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        is_full_build(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        _services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        let info = &context.project_info;
        let latest = info.latest_nexus_versions.clone().unwrap_or_default();
        validate_project_version(&info.version, info.version_type, &latest)?;
        Ok(context)
    }
}

pub struct CheckVersionUniqueness;

#[async_trait]
impl Stage for CheckVersionUniqueness {
    fn name(&self) -> &'static str {
        "check-version-uniqueness"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        is_full_build(context) && is_release(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        let ecosystem = ecosystem_of(&context)?;
        let info = &context.project_info;
        let query = ecosystem
            .release_query(&services.config.repositories, info.group.as_deref(), &info.name)
            .matching_version(&info.version);

        let published = services.registry.search(&query).await?;
        check_version_uniqueness(&info.version, &published)?;
        Ok(context)
    }
}

/// Resolves pre-release versions from the registry before anything is built.
///
/// Maven and Gradle full builds resolve later, from the metadata their own
/// deploy writes; see `ResolvePublishedSnapshotVersion`.
pub struct ResolvePreReleaseVersion;

#[async_trait]
impl Stage for ResolvePreReleaseVersion {
    fn name(&self) -> &'static str {
        "resolve-pre-release-version"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        is_pre_release(context)
            && !is_terraform_only(context)
            && has_pre_release_resolution(context)
            && !(is_maven(context) && is_full_build(context))
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        services
            .version_resolver()
            .resolve_pre_release_version(context)
            .await
    }
}

pub struct ResolvePublishedSnapshotVersion;

#[async_trait]
impl Stage for ResolvePublishedSnapshotVersion {
    fn name(&self) -> &'static str {
        "resolve-published-snapshot-version"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        is_pre_release(context) && is_full_build(context) && is_maven(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        services
            .version_resolver()
            .resolve_pre_release_version(context)
            .await
    }
}

/// Keeps pre-release dependencies out of release builds and makes sure
/// internal dependencies are actually published.
pub struct CheckDependencies;

#[async_trait]
impl Stage for CheckDependencies {
    fn name(&self) -> &'static str {
        "check-dependencies"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        is_full_build(context) && is_npm(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        let info = &context.project_info;
        let siblings: Vec<&str> = info
            .monorepo_children
            .iter()
            .map(|child| child.name.as_str())
            .collect();

        for project in std::iter::once(info).chain(info.monorepo_children.iter()) {
            for (dependency, range) in &project.dependencies {
                // workspace:, file:, git+ and friends are not registry ranges
                if range.contains(':') {
                    continue;
                }

                if !info.is_pre_release() && is_pre_release_version(&expand_range_to_maximum(range)) {
                    return Err(PipelineError::VersionConflict(format!(
                        "{} depends on pre-release {}@{} in a release build",
                        project.name, dependency, range
                    )));
                }

                let (scope, name) = split_npm_name(dependency);
                let is_internal = scope.is_some() && scope == info.group.as_deref();
                if !is_internal || siblings.contains(&name) {
                    continue;
                }

                debug!("Checking internal dependency {}@{}", dependency, range);
                let query = SearchQuery::new(&services.config.repositories.npm, name).with_group(scope);
                let published = services.registry.search(&query).await?;
                let satisfied = published
                    .items
                    .iter()
                    .any(|item| satisfies_range(&item.version, range, info.is_pre_release()));
                if !satisfied {
                    return Err(PipelineError::VersionResolution(format!(
                        "no published version of {dependency} satisfies {range}"
                    )));
                }
            }
        }

        Ok(context)
    }
}
