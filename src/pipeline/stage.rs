use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::Config;
use crate::error::PipelineError;
use crate::project::ManifestCache;
use crate::project::types::BuildContext;
use crate::prompt::Prompter;
use crate::shell::CommandRunner;
use crate::version::registry::Registry;
use crate::version::resolver::VersionResolver;

/// A named unit of pipeline work
#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether the stage applies to `context`; must not have side effects
    fn should_execute(&self, context: &BuildContext) -> bool;

    /// Consumes the context and returns the one the next stage sees
    async fn execute(
        &self,
        context: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, PipelineError>;
}

/// Collaborators available to stages for the duration of one run
pub struct Services {
    pub config: Config,
    pub registry: Arc<dyn Registry>,
    pub runner: Arc<dyn CommandRunner>,
    pub prompter: Arc<dyn Prompter>,
    /// Fresh per run; never shared between runs
    pub manifests: ManifestCache,
    /// Local Maven repository holding deployed snapshot metadata
    pub maven_repository: PathBuf,
}

impl Services {
    pub fn new(
        config: Config,
        registry: Arc<dyn Registry>,
        runner: Arc<dyn CommandRunner>,
        prompter: Arc<dyn Prompter>,
        maven_repository: PathBuf,
    ) -> Self {
        Self {
            config,
            registry,
            runner,
            prompter,
            manifests: ManifestCache::new(),
            maven_repository,
        }
    }

    pub fn version_resolver(&self) -> VersionResolver<'_> {
        VersionResolver::new(
            self.registry.as_ref(),
            &self.config.repositories,
            &self.maven_repository,
        )
    }
}
