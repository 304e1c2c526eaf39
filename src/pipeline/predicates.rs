//! Primitive stage predicates
//!
//! Each is a pure function of the context. Stages combine a command-mode gate
//! with a project gate using plain `&&`, `||` and `!`.

use crate::project::types::{BuildContext, CommandType};
use crate::version::registry::Ecosystem;
use crate::version::resolver::resolution_case;

pub fn is_command(context: &BuildContext, commands: &[CommandType]) -> bool {
    commands.contains(&context.command_type)
}

pub fn is_full_build(context: &BuildContext) -> bool {
    is_command(context, &[CommandType::FullBuild])
}

pub fn is_terraform_only(context: &BuildContext) -> bool {
    is_command(context, &[CommandType::TerraformOnly])
}

/// Modes that touch Docker artifacts
pub fn is_docker_command(context: &BuildContext) -> bool {
    is_command(context, &[CommandType::FullBuild, CommandType::DockerOnly])
}

/// Modes that deploy to Kubernetes
pub fn is_kubernetes_command(context: &BuildContext) -> bool {
    is_command(context, &[CommandType::FullBuild, CommandType::KubernetesOnly])
}

/// Modes that apply Terraform
pub fn is_terraform_command(context: &BuildContext) -> bool {
    is_command(context, &[CommandType::FullBuild, CommandType::TerraformOnly])
}

pub fn is_ecosystem(context: &BuildContext, ecosystem: Ecosystem) -> bool {
    context.project_type.ecosystem() == Some(ecosystem)
}

pub fn is_npm(context: &BuildContext) -> bool {
    is_ecosystem(context, Ecosystem::Npm)
}

/// Maven and Gradle projects
pub fn is_maven(context: &BuildContext) -> bool {
    is_ecosystem(context, Ecosystem::Maven)
}

pub fn is_docker(context: &BuildContext) -> bool {
    is_ecosystem(context, Ecosystem::Docker)
}

pub fn is_helm(context: &BuildContext) -> bool {
    is_ecosystem(context, Ecosystem::Helm)
}

/// Projects with a build tool of their own
pub fn is_buildable(context: &BuildContext) -> bool {
    is_npm(context) || is_maven(context)
}

pub fn is_application(context: &BuildContext) -> bool {
    context.project_type.is_application()
}

pub fn is_release(context: &BuildContext) -> bool {
    !is_pre_release(context)
}

pub fn is_pre_release(context: &BuildContext) -> bool {
    context.project_info.is_pre_release()
}

pub fn has_terraform(context: &BuildContext) -> bool {
    context.project_info.has_terraform
}

/// Whether the project's ecosystem has pre-release resolution at all
pub fn has_pre_release_resolution(context: &BuildContext) -> bool {
    resolution_case(context.project_type, context.command_type).is_some()
}
