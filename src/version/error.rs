use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Not authorized to search repository {0}")]
    Unauthorized(String),

    #[error("Repository not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Local metadata not found at {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed metadata in {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("No jar snapshot version listed in {}", .0.display())]
    NoJarEntry(PathBuf),
}
