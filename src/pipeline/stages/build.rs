//! Build and publish through the project's own build tool

use async_trait::async_trait;
use tracing::info;

use crate::error::PipelineError;
use crate::pipeline::predicates::{is_buildable, is_full_build};
use crate::pipeline::stage::{Services, Stage};
use crate::project::types::{BuildContext, ProjectType};
use crate::shell::ShellCommand;

/// npm dist-tag pre-releases are published under
const NPM_PRE_RELEASE_TAG: &str = "beta";

fn gradle(context: &BuildContext, args: &[&str]) -> ShellCommand {
    let wrapper = context.working_dir.join("gradlew");
    let program = if wrapper.is_file() {
        wrapper.to_string_lossy().into_owned()
    } else {
        "gradle".to_string()
    };
    ShellCommand::new(&program, args.iter().copied()).in_dir(&context.working_dir)
}

fn tool(context: &BuildContext, program: &str, args: &[&str]) -> ShellCommand {
    ShellCommand::new(program, args.iter().copied()).in_dir(&context.working_dir)
}

/// Commands that build the project, in order
pub fn build_commands(context: &BuildContext) -> Vec<ShellCommand> {
    let version = context.project_info.version.as_str();
    match context.project_type {
        ProjectType::NpmLibrary | ProjectType::NpmApplication => vec![
            // the resolved beta must be in package.json before build and publish
            tool(
                context,
                "npm",
                &["version", version, "--no-git-tag-version", "--allow-same-version"],
            ),
            tool(context, "npm", &["ci"]),
            tool(context, "npm", &["run", "build", "--if-present"]),
        ],
        ProjectType::MavenLibrary | ProjectType::MavenApplication => {
            vec![tool(context, "mvn", &["-B", "clean", "install"])]
        }
        ProjectType::GradleLibrary | ProjectType::GradleApplication => {
            vec![gradle(context, &["build"])]
        }
        ProjectType::DockerImage
        | ProjectType::DockerApplication
        | ProjectType::HelmLibrary
        | ProjectType::HelmApplication
        | ProjectType::Unknown => Vec::new(),
    }
}

/// Commands that publish the built artifact, in order
pub fn publish_commands(context: &BuildContext) -> Vec<ShellCommand> {
    match context.project_type {
        ProjectType::NpmLibrary | ProjectType::NpmApplication => {
            if context.project_info.is_pre_release() {
                vec![tool(context, "npm", &["publish", "--tag", NPM_PRE_RELEASE_TAG])]
            } else {
                vec![tool(context, "npm", &["publish"])]
            }
        }
        ProjectType::MavenLibrary | ProjectType::MavenApplication => {
            vec![tool(context, "mvn", &["-B", "deploy", "-DskipTests"])]
        }
        ProjectType::GradleLibrary | ProjectType::GradleApplication => {
            vec![gradle(context, &["publish"])]
        }
        ProjectType::DockerImage
        | ProjectType::DockerApplication
        | ProjectType::HelmLibrary
        | ProjectType::HelmApplication
        | ProjectType::Unknown => Vec::new(),
    }
}

pub struct BuildProject;

#[async_trait]
impl Stage for BuildProject {
    fn name(&self) -> &'static str {
        "build-project"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        is_full_build(context) && is_buildable(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        for command in build_commands(&context) {
            services.runner.run(&command).await?;
        }
        info!(
            "Built {} {}",
            context.project_info.name, context.project_info.version
        );
        Ok(context)
    }
}

pub struct PublishArtifact;

#[async_trait]
impl Stage for PublishArtifact {
    fn name(&self) -> &'static str {
        "publish-artifact"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        is_full_build(context) && is_buildable(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        for command in publish_commands(&context) {
            services.runner.run(&command).await?;
        }
        info!(
            "Published {} {}",
            context.project_info.name, context.project_info.version
        );
        Ok(context)
    }
}
