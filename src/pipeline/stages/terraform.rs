use async_trait::async_trait;
use tracing::info;

use crate::error::PipelineError;
use crate::pipeline::predicates::{has_terraform, is_terraform_command};
use crate::pipeline::stage::{Services, Stage};
use crate::project::types::BuildContext;
use crate::shell::ShellCommand;

const TERRAFORM_DIR: &str = "terraform";

/// Saved plan applied after confirmation
const PLAN_FILE: &str = "shipit.tfplan";

/// Plans, asks, then applies exactly the plan that was shown
pub struct ApplyTerraform;

#[async_trait]
impl Stage for ApplyTerraform {
    fn name(&self) -> &'static str {
        "apply-terraform"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        is_terraform_command(context) && has_terraform(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        let dir = context.working_dir.join(TERRAFORM_DIR);
        let terraform = |args: &[&str]| {
            ShellCommand::new("terraform", args.iter().copied()).in_dir(&dir)
        };
        let plan_out = format!("-out={PLAN_FILE}");

        services
            .runner
            .run(&terraform(&["init", "-input=false"]))
            .await?;
        let plan = services
            .runner
            .run(&terraform(&["plan", "-input=false", plan_out.as_str()]))
            .await?;
        info!("Terraform plan:\n{}", plan.trim_end());

        if !services.prompter.confirm("Apply this Terraform plan?").await? {
            return Err(PipelineError::UserAbort(
                "Terraform plan was not applied".to_string(),
            ));
        }

        services
            .runner
            .run(&terraform(&["apply", "-input=false", PLAN_FILE]))
            .await?;
        info!("Applied Terraform plan in {}", dir.display());
        Ok(context)
    }
}
