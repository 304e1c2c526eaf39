//! Project layer
//! - types.rs: BuildContext and the ProjectType / CommandType / VersionType unions
//! - detect.rs: ecosystem detection from marker files
//! - manifest.rs: manifest readers and the per-run manifest cache

pub mod detect;
pub mod manifest;
pub mod types;

pub use detect::detect_project_type;
pub use manifest::{ManifestCache, ManifestError};
pub use types::{
    BuildContext, BuildToolInfo, CommandType, LatestNexusVersions, ProjectInfo, ProjectType,
    RepoType, VersionType,
};
