use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::PipelineError;
use crate::pipeline::predicates::{is_full_build, is_release};
use crate::pipeline::stage::{Services, Stage};
use crate::project::types::BuildContext;
use crate::shell::ShellCommand;

fn git<const N: usize>(context: &BuildContext, args: [&str; N]) -> ShellCommand {
    ShellCommand::new("git", args).in_dir(&context.working_dir)
}

pub struct CheckUncommittedChanges;

#[async_trait]
impl Stage for CheckUncommittedChanges {
    fn name(&self) -> &'static str {
        "check-uncommitted-changes"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        is_full_build(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        let status = services
            .runner
            .run(&git(&context, ["status", "--porcelain"]))
            .await?;
        if status.trim().is_empty() {
            return Ok(context);
        }

        warn!("Working tree has uncommitted changes:\n{}", status.trim_end());
        if services
            .prompter
            .confirm("There are uncommitted changes. Continue anyway?")
            .await?
        {
            Ok(context)
        } else {
            Err(PipelineError::UserAbort(
                "uncommitted changes in working tree".to_string(),
            ))
        }
    }
}

pub struct TagRelease;

#[async_trait]
impl Stage for TagRelease {
    fn name(&self) -> &'static str {
        "tag-release"
    }

    fn should_execute(&self, context: &BuildContext) -> bool {
        is_full_build(context) && is_release(context)
    }

    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError> {
        let tag = format!("v{}", context.project_info.version);
        services.runner.run(&git(&context, ["tag", &tag])).await?;
        services
            .runner
            .run(&git(&context, ["push", "origin", &tag]))
            .await?;
        info!("Tagged release {}", tag);
        Ok(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::project::types::{CommandType, ProjectInfo};
    use crate::prompt::MockPrompter;
    use crate::shell::MockCommandRunner;
    use crate::version::registry::MockRegistry;
    use mockall::Sequence;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn services(runner: MockCommandRunner, prompter: MockPrompter) -> Services {
        Services::new(
            Config::default(),
            Arc::new(MockRegistry::new()),
            Arc::new(runner),
            Arc::new(prompter),
            PathBuf::from("/nonexistent"),
        )
    }

    fn context(version: &str) -> BuildContext {
        BuildContext::new(CommandType::FullBuild, PathBuf::from("/work"))
            .with_project_info(ProjectInfo::new(None, "app", version))
    }

    #[tokio::test]
    async fn clean_tree_does_not_prompt() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|command| command.args == ["status", "--porcelain"])
            .returning(|_| Ok(String::new()));
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().times(0);

        let result = CheckUncommittedChanges
            .execute(context("1.0.0"), &services(runner, prompter))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn dirty_tree_aborts_when_declined() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_| Ok(" M src/main.rs\n".to_string()));
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().times(1).returning(|_| Ok(false));

        let result = CheckUncommittedChanges
            .execute(context("1.0.0"), &services(runner, prompter))
            .await;

        assert!(matches!(result, Err(PipelineError::UserAbort(_))));
    }

    #[tokio::test]
    async fn dirty_tree_continues_when_confirmed() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_| Ok("?? notes.txt\n".to_string()));
        let mut prompter = MockPrompter::new();
        prompter.expect_confirm().times(1).returning(|_| Ok(true));

        let result = CheckUncommittedChanges
            .execute(context("1.0.0"), &services(runner, prompter))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn tag_release_tags_then_pushes() {
        let mut sequence = Sequence::new();
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|command| command.program == "git" && command.args == ["tag", "v1.2.0"])
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(String::new()));
        runner
            .expect_run()
            .withf(|command| command.args == ["push", "origin", "v1.2.0"])
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(String::new()));

        let result = TagRelease
            .execute(context("1.2.0"), &services(runner, MockPrompter::new()))
            .await;

        assert!(result.is_ok());
    }

    #[test]
    fn tag_release_skips_pre_releases() {
        assert!(TagRelease.should_execute(&context("1.2.0")));
        assert!(!TagRelease.should_execute(&context("1.2.0-beta.1")));
    }
}
