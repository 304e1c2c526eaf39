use async_trait::async_trait;
use tracing::info;

use crate::config::DockerConfig;
use crate::error::PipelineError;
use crate::pipeline::predicates::{is_application, is_docker, is_docker_command};
use crate::pipeline::stage::{Services, Stage};
use crate::project::types::{BuildContext, ProjectInfo};
use crate::shell::ShellCommand;

/// `{registry}/{image}:{tag}`, tagged with the Docker pre-release if resolved
pub fn image_reference(config: &DockerConfig, info: &ProjectInfo) -> String {
    format!(
        "{}/{}:{}",
        config.registry.trim_end_matches('/'),
        info.docker_image_name(),
        info.docker_tag()
    )
}

fn builds_image(context: &BuildContext) -> bool {
    is_docker_command(context) && (is_application(context) || is_docker(context))
}

pub struct BuildDockerImage;

#[async_trait]
impl Stage for BuildDockerImage {
    fn name(&self) -> &'static str {
        "build-docker-image"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        builds_image(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        let image = image_reference(&services.config.docker, &context.project_info);
        let version_arg = format!("VERSION={}", context.project_info.version);
        let command = ShellCommand::new(
            "docker",
            ["build", "-t", image.as_str(), "--build-arg", version_arg.as_str(), "."],
        )
        .in_dir(&context.working_dir);

        services.runner.run(&command).await?;
        info!("Built image {}", image);
        Ok(context)
    }
}

pub struct PushDockerImage;

#[async_trait]
impl Stage for PushDockerImage {
    fn name(&self) -> &'static str {
        "push-docker-image"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        builds_image(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        let image = image_reference(&services.config.docker, &context.project_info);
        services
            .runner
            .run(&ShellCommand::new("docker", ["push", image.as_str()]))
            .await?;
        info!("Pushed image {}", image);
        Ok(context)
    }
}
