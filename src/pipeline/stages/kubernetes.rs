use async_trait::async_trait;
use tracing::info;

use crate::error::PipelineError;
use crate::pipeline::predicates::{is_application, is_helm, is_kubernetes_command};
use crate::pipeline::stage::{Services, Stage};
use crate::pipeline::stages::docker::image_reference;
use crate::project::detect::DEPLOY_DIR;
use crate::project::types::{BuildContext, ProjectInfo};
use crate::shell::ShellCommand;

fn with_namespace(mut args: Vec<String>, namespace: Option<&str>) -> Vec<String> {
    if let Some(namespace) = namespace {
        args.push("--namespace".to_string());
        args.push(namespace.to_string());
    }
    args
}

/// Commands deploying an application; Helm applications install their chart
pub fn deploy_commands(
    context: &BuildContext,
    image: Option<&str>,
    namespace: Option<&str>,
) -> Vec<ShellCommand> {
    let info = &context.project_info;
    let command = |program: &str, args: Vec<String>| {
        ShellCommand::new(program, with_namespace(args, namespace)).in_dir(&context.working_dir)
    };

    match image {
        None => vec![command(
            "helm",
            vec![
                "upgrade".to_string(),
                "--install".to_string(),
                info.name.clone(),
                ".".to_string(),
                "--version".to_string(),
                info.version.clone(),
            ],
        )],
        Some(image) => vec![
            command(
                "kubectl",
                vec!["apply".to_string(), "-f".to_string(), format!("{DEPLOY_DIR}/")],
            ),
            command(
                "kubectl",
                vec![
                    "set".to_string(),
                    "image".to_string(),
                    format!("deployment/{}", info.name),
                    format!("{}={}", info.name, image),
                ],
            ),
        ],
    }
}

pub struct DeployKubernetes;

#[async_trait]
impl Stage for DeployKubernetes {
    fn name(&self) -> &'static str {
        "deploy-kubernetes"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        is_kubernetes_command(context) && is_application(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        let image = (!is_helm(&context))
            .then(|| image_reference(&services.config.docker, &context.project_info));
        let namespace = services.config.kubernetes.namespace.as_deref();

        for command in deploy_commands(&context, image.as_deref(), namespace) {
            services.runner.run(&command).await?;
        }

        info!(
            "Deployed {} {}",
            context.project_info.name,
            image.as_deref().unwrap_or(&context.project_info.version)
        );
        let info = ProjectInfo {
            kubernetes_docker_image: image,
            ..context.project_info.clone()
        };
        Ok(context.with_project_info(info))
    }
}
