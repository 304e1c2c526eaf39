//! Build context and the tagged unions it is made of

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::version::registry::{Ecosystem, docker_image_name};
use crate::version::semver::is_pre_release;

/// Invocation mode selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandType {
    FullBuild,
    DockerOnly,
    KubernetesOnly,
    TerraformOnly,
    Unknown,
}

impl CommandType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::FullBuild => "full-build",
            CommandType::DockerOnly => "docker-only",
            CommandType::KubernetesOnly => "kubernetes-only",
            CommandType::TerraformOnly => "terraform-only",
            CommandType::Unknown => "unknown",
        }
    }
}

/// Project ecosystem tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectType {
    NpmLibrary,
    NpmApplication,
    MavenLibrary,
    MavenApplication,
    GradleLibrary,
    GradleApplication,
    DockerImage,
    DockerApplication,
    HelmLibrary,
    HelmApplication,
    Unknown,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::NpmLibrary => "npm-library",
            ProjectType::NpmApplication => "npm-application",
            ProjectType::MavenLibrary => "maven-library",
            ProjectType::MavenApplication => "maven-application",
            ProjectType::GradleLibrary => "gradle-library",
            ProjectType::GradleApplication => "gradle-application",
            ProjectType::DockerImage => "docker-image",
            ProjectType::DockerApplication => "docker-application",
            ProjectType::HelmLibrary => "helm-library",
            ProjectType::HelmApplication => "helm-application",
            ProjectType::Unknown => "unknown",
        }
    }

    /// Registry ecosystem artifacts of this project are published to.
    /// Gradle projects publish Maven artifacts.
    pub fn ecosystem(&self) -> Option<Ecosystem> {
        match self {
            ProjectType::NpmLibrary | ProjectType::NpmApplication => Some(Ecosystem::Npm),
            ProjectType::MavenLibrary
            | ProjectType::MavenApplication
            | ProjectType::GradleLibrary
            | ProjectType::GradleApplication => Some(Ecosystem::Maven),
            ProjectType::DockerImage | ProjectType::DockerApplication => Some(Ecosystem::Docker),
            ProjectType::HelmLibrary | ProjectType::HelmApplication => Some(Ecosystem::Helm),
            ProjectType::Unknown => None,
        }
    }

    /// Whether the project is deployed to Kubernetes
    pub fn is_application(&self) -> bool {
        match self {
            ProjectType::NpmApplication
            | ProjectType::MavenApplication
            | ProjectType::GradleApplication
            | ProjectType::DockerApplication
            | ProjectType::HelmApplication => true,
            ProjectType::NpmLibrary
            | ProjectType::MavenLibrary
            | ProjectType::GradleLibrary
            | ProjectType::DockerImage
            | ProjectType::HelmLibrary
            | ProjectType::Unknown => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VersionType {
    #[default]
    Release,
    PreRelease,
}

impl VersionType {
    /// Derive the version type from the shape of a version string
    pub fn of(version: &str) -> Self {
        if is_pre_release(version) {
            VersionType::PreRelease
        } else {
            VersionType::Release
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepoType {
    Monorepo,
    Polyrepo,
}

/// Latest versions the registry knows of, per category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LatestNexusVersions {
    pub latest_release_version: Option<String>,
    pub latest_pre_release_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInfo {
    pub group: Option<String>,
    pub name: String,
    pub version: String,
    pub version_type: VersionType,
    /// Dependency name -> range, in manifest order
    pub dependencies: IndexMap<String, String>,
    pub monorepo_children: Vec<ProjectInfo>,
    pub latest_nexus_versions: Option<LatestNexusVersions>,
    pub docker_pre_release_version: Option<String>,
    pub kubernetes_docker_image: Option<String>,
    pub repo_type: Option<RepoType>,
    pub has_terraform: bool,
}

impl ProjectInfo {
    pub fn new(group: Option<&str>, name: &str, version: &str) -> Self {
        Self {
            group: group.map(str::to_string),
            name: name.to_string(),
            version: version.to_string(),
            version_type: VersionType::of(version),
            ..Default::default()
        }
    }

    /// A copy carrying `version`, with the version type kept in agreement
    pub fn with_version(self, version: &str) -> Self {
        Self {
            version: version.to_string(),
            version_type: VersionType::of(version),
            ..self
        }
    }

    pub fn is_pre_release(&self) -> bool {
        self.version_type == VersionType::PreRelease
    }

    /// Repository path of the Docker image built from this project
    pub fn docker_image_name(&self) -> String {
        docker_image_name(self.group.as_deref(), &self.name)
    }

    /// Tag the Docker image of this project is built with
    pub fn docker_tag(&self) -> &str {
        self.docker_pre_release_version
            .as_deref()
            .unwrap_or(&self.version)
    }
}

/// Identity of the running orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildToolInfo {
    pub name: String,
    pub version: String,
    pub version_type: VersionType,
}

impl BuildToolInfo {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            version_type: VersionType::of(version),
        }
    }

    pub fn current() -> Self {
        Self::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
    }
}

/// The value threaded through the pipeline.
///
/// Stages never mutate a context they were handed; they return a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub command_type: CommandType,
    pub build_tool_info: BuildToolInfo,
    pub project_type: ProjectType,
    pub project_info: ProjectInfo,
    pub working_dir: PathBuf,
}

impl BuildContext {
    pub fn new(command_type: CommandType, working_dir: PathBuf) -> Self {
        Self {
            command_type,
            build_tool_info: BuildToolInfo::current(),
            project_type: ProjectType::Unknown,
            project_info: ProjectInfo::default(),
            working_dir,
        }
    }

    pub fn with_project_type(self, project_type: ProjectType) -> Self {
        Self {
            project_type,
            ..self
        }
    }

    pub fn with_project_info(self, project_info: ProjectInfo) -> Self {
        Self {
            project_info,
            ..self
        }
    }
}
