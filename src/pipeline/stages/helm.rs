use async_trait::async_trait;
use tracing::info;

use crate::error::PipelineError;
use crate::pipeline::predicates::{is_full_build, is_helm};
use crate::pipeline::stage::{Services, Stage};
use crate::project::types::BuildContext;
use crate::shell::ShellCommand;

/// Packages the chart at the project version and pushes it to Nexus
pub struct PublishHelmChart;

#[async_trait]
impl Stage for PublishHelmChart {
    fn name(&self) -> &'static str {
        "publish-helm-chart"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        is_full_build(context) && is_helm(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        let info = &context.project_info;
        let chart = format!("{}-{}.tgz", info.name, info.version);
        let repository_url = format!(
            "{}/repository/{}",
            services.config.nexus.url.trim_end_matches('/'),
            services.config.repositories.helm
        );

        services
            .runner
            .run(
                &ShellCommand::new("helm", ["package", ".", "--version", info.version.as_str()])
                    .in_dir(&context.working_dir),
            )
            .await?;
        services
            .runner
            .run(
                &ShellCommand::new("helm", ["push", chart.as_str(), repository_url.as_str()])
                    .in_dir(&context.working_dir),
            )
            .await?;

        info!("Published chart {} to {}", chart, repository_url);
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::project::types::{CommandType, ProjectInfo, ProjectType};
    use crate::prompt::MockPrompter;
    use crate::shell::MockCommandRunner;
    use crate::version::registry::MockRegistry;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn packages_then_pushes_chart() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorded = seen.clone();
        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(2).returning(move |command| {
            recorded.lock().unwrap().push(command.to_string());
            Ok(String::new())
        });
        let services = Services::new(
            Config::default(),
            Arc::new(MockRegistry::new()),
            Arc::new(runner),
            Arc::new(MockPrompter::new()),
            PathBuf::from("/nonexistent"),
        );
        let context = BuildContext::new(CommandType::FullBuild, PathBuf::from("/chart"))
            .with_project_type(ProjectType::HelmLibrary)
            .with_project_info(ProjectInfo::new(None, "platform", "2.0.0"));

        PublishHelmChart.execute(context, &services).await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "helm package . --version 2.0.0".to_string(),
                "helm push platform-2.0.0.tgz http://localhost:8081/repository/helm-hosted"
                    .to_string(),
            ]
        );
    }
}
