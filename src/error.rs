//! Error taxonomy shared by every pipeline stage

use thiserror::Error;

use crate::project::manifest::ManifestError;
use crate::version::error::RegistryError;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Invocation mode unknown, project undetectable, or invalid config
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Proposed version is not above, or collides with, registry history
    #[error("{0}")]
    VersionConflict(String),

    /// No pre-release version found in any source
    #[error("Version resolution failed: {0}")]
    VersionResolution(String),

    #[error("`{command}` failed with exit code {}: {stderr}", describe_code(.code))]
    ExternalTool {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Aborted: {0}")]
    UserAbort(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none".to_string(), |c| c.to_string())
}

/// A stage failure, tagged with the stage that produced it
#[derive(Debug, Error)]
#[error("Stage '{stage}' failed: {source}")]
pub struct StageError {
    pub stage: String,
    #[source]
    pub source: PipelineError,
}

impl StageError {
    pub fn new(stage: &str, source: PipelineError) -> Self {
        Self {
            stage: stage.to_string(),
            source,
        }
    }
}
