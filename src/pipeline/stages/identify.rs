//! Stages that establish what is being built and by which tool

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::pipeline::stage::{Services, Stage};
use crate::project::detect_project_type;
use crate::project::types::{BuildContext, CommandType, ProjectType, VersionType};
use crate::version::registry::SearchQuery;
use crate::version::validator::{ToolVersionStatus, tool_version_status};

pub struct ValidateCommand;

#[async_trait]
impl Stage for ValidateCommand {
    fn name(&self) -> &'static str {
        "validate-command"
    }

    fn should_execute(&self, _context: &BuildContext) -> bool {
        true
    }

    async fn execute(
        &self,
        context: BuildContext,
        _services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        match context.command_type {
            CommandType::Unknown => Err(PipelineError::Configuration(
                "no command given; use --full-build, --docker-only, --kubernetes-only or --terraform-only"
                    .to_string(),
            )),
            CommandType::FullBuild
            | CommandType::DockerOnly
            | CommandType::KubernetesOnly
            | CommandType::TerraformOnly => Ok(context),
        }
    }
}

/// Refuses to run an outdated release of the tool; asks before running an
/// outdated pre-release.
pub struct CheckToolVersion {
    enabled: bool,
}

impl CheckToolVersion {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

#[async_trait]
impl Stage for CheckToolVersion {
    fn name(&self) -> &'static str {
        "check-tool-version"
    }

    fn should_execute(&self, _context: &BuildContext) -> bool {
        self.enabled
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        let tool = context.build_tool_info.clone();
        let config = &services.config.tool;
        let query = SearchQuery::new(&config.repository, &config.name).with_group(config.group.as_deref());

        let releases = services.registry.search(&query.clone().pre_releases(false)).await?;
        let pre_releases = match tool.version_type {
            VersionType::PreRelease => Some(services.registry.search(&query.pre_releases(true)).await?),
            VersionType::Release => None,
        };

        let status = tool_version_status(
            &tool,
            releases.latest_version(),
            pre_releases.as_ref().and_then(|r| r.latest_version()),
        );

        match status {
            ToolVersionStatus::UpToDate => {
                info!("{} {} is up to date", tool.name, tool.version);
                Ok(context)
            }
            ToolVersionStatus::Outdated { latest } => Err(PipelineError::VersionConflict(format!(
                "{} {} is outdated; upgrade to {} before running",
                tool.name, tool.version, latest
            ))),
            ToolVersionStatus::OutdatedPreRelease { latest } => {
                warn!("{} {} is behind {}", tool.name, tool.version, latest);
                let question = format!(
                    "You are running {} {}, but {} is available. Continue anyway?",
                    tool.name, tool.version, latest
                );
                if services.prompter.confirm(&question).await? {
                    Ok(context)
                } else {
                    Err(PipelineError::UserAbort(format!(
                        "declined to run outdated {} {}",
                        tool.name, tool.version
                    )))
                }
            }
        }
    }
}

pub struct DetectProjectType;

#[async_trait]
impl Stage for DetectProjectType {
    fn name(&self) -> &'static str {
        "detect-project-type"
    }

    fn should_execute(&self, _context: &BuildContext) -> bool {
        true
    }

    async fn execute(
        &self,
        context: BuildContext,
        _services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        match detect_project_type(&context.working_dir) {
            ProjectType::Unknown => Err(PipelineError::Configuration(format!(
                "could not detect project type in {}",
                context.working_dir.display()
            ))),
            project_type => {
                info!("Detected {} project", project_type.as_str());
                Ok(context.with_project_type(project_type))
            }
        }
    }
}

pub struct ReadProjectInfo;

#[async_trait]
impl Stage for ReadProjectInfo {
    fn name(&self) -> &'static str {
        "read-project-info"
    }

    fn should_execute(&self, _context: &BuildContext) -> bool {
        true
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        let info = services
            .manifests
            .project_info(&context.working_dir, context.project_type)?;
        info!(
            "Project {} {} ({} child project(s))",
            info.name,
            info.version,
            info.monorepo_children.len()
        );
        Ok(context.with_project_info(info))
    }
}
