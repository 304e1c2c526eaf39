//! Ordered, fail-fast stage execution

use std::time::Instant;

use tracing::{debug, error, info};

use crate::error::StageError;
use crate::pipeline::stage::{Services, Stage};
use crate::project::types::BuildContext;

/// A fixed, ordered list of stages
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Runs every applicable stage in order, threading the context through.
    ///
    /// Stops at the first failure; the error names the failing stage. A stage
    /// whose predicate is false is never executed and the context passes to
    /// the next stage untouched.
    pub async fn run(
        &self,
        initial: BuildContext,
        services: &Services,
    ) -> Result<BuildContext, StageError> {
        let start = Instant::now();
        info!(
            "Starting {} pipeline in {}",
            initial.command_type.as_str(),
            initial.working_dir.display()
        );

        let mut context = initial;
        for stage in &self.stages {
            let name = stage.name();

            if !stage.should_execute(&context) {
                debug!("Stage {}: skipped", name);
                continue;
            }

            info!("Stage {}: started", name);
            let stage_start = Instant::now();
            context = stage.execute(context, services).await.map_err(|e| {
                error!("Stage {}: failed after {:?}: {}", name, stage_start.elapsed(), e);
                StageError::new(name, e)
            })?;
            info!("Stage {}: finished in {:?}", name, stage_start.elapsed());
        }

        info!("Pipeline complete in {:?}", start.elapsed());
        Ok(context)
    }
}
