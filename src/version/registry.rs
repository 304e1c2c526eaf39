//! Registry trait for searching published artifacts

#[cfg(test)]
use mockall::automock;

use crate::config::RepositoriesConfig;
use crate::version::error::RegistryError;
use crate::version::types::NexusSearchResult;

/// Artifact ecosystem a registry search is scoped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ecosystem {
    Npm,
    Maven,
    Docker,
    Helm,
}

impl Ecosystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Npm => "npm",
            Ecosystem::Maven => "maven",
            Ecosystem::Docker => "docker",
            Ecosystem::Helm => "helm",
        }
    }

    /// Search for published releases of an artifact
    pub fn release_query(
        &self,
        repositories: &RepositoriesConfig,
        group: Option<&str>,
        name: &str,
    ) -> SearchQuery {
        let repository = match self {
            Ecosystem::Npm => &repositories.npm,
            Ecosystem::Maven => &repositories.maven_releases,
            Ecosystem::Docker => {
                return SearchQuery::new(&repositories.docker, &docker_image_name(group, name))
                    .pre_releases(false);
            }
            Ecosystem::Helm => &repositories.helm,
        };
        SearchQuery::new(repository, name)
            .with_group(group)
            .pre_releases(false)
    }

    /// Search for published pre-releases of an artifact
    ///
    /// Maven snapshots live in their own repository, so no pre-release flag is
    /// sent for them.
    pub fn pre_release_query(
        &self,
        repositories: &RepositoriesConfig,
        group: Option<&str>,
        name: &str,
    ) -> SearchQuery {
        match self {
            Ecosystem::Maven => {
                SearchQuery::new(&repositories.maven_snapshots, name).with_group(group)
            }
            Ecosystem::Npm => SearchQuery::new(&repositories.npm, name)
                .with_group(group)
                .pre_releases(true),
            Ecosystem::Docker => {
                SearchQuery::new(&repositories.docker, &docker_image_name(group, name))
                    .pre_releases(true)
            }
            Ecosystem::Helm => SearchQuery::new(&repositories.helm, name)
                .with_group(group)
                .pre_releases(true),
        }
    }
}

/// Docker images carry no group; it becomes the image path prefix
pub fn docker_image_name(group: Option<&str>, name: &str) -> String {
    match group.filter(|g| !g.is_empty()) {
        Some(group) => format!("{group}/{name}"),
        None => name.to_string(),
    }
}

/// Parameters of a single registry search
///
/// Results are always requested sorted by version, descending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub repository: String,
    pub group: Option<String>,
    pub name: String,
    pub prerelease: Option<bool>,
    /// Version filter, `*` acts as a wildcard
    pub version: Option<String>,
}

impl SearchQuery {
    pub fn new(repository: &str, name: &str) -> Self {
        Self {
            repository: repository.to_string(),
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_group(mut self, group: Option<&str>) -> Self {
        self.group = group.filter(|g| !g.is_empty()).map(str::to_string);
        self
    }

    pub fn pre_releases(mut self, prerelease: bool) -> Self {
        self.prerelease = Some(prerelease);
        self
    }

    pub fn matching_version(mut self, pattern: &str) -> Self {
        self.version = Some(pattern.to_string());
        self
    }

    /// Query string pairs in the order the Nexus search API documents them
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("repository", self.repository.clone())];
        if let Some(group) = &self.group {
            params.push(("group", group.clone()));
        }
        params.push(("name", self.name.clone()));
        params.push(("sort", "version".to_string()));
        params.push(("direction", "desc".to_string()));
        if let Some(prerelease) = self.prerelease {
            params.push(("prerelease", prerelease.to_string()));
        }
        if let Some(version) = &self.version {
            params.push(("version", version.clone()));
        }
        params
    }
}

/// Trait for searching an artifact registry
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Runs a search and returns matches in registry order, newest first
    ///
    /// # Returns
    /// * `Ok(NexusSearchResult)` - Matches, possibly empty
    /// * `Err(RegistryError)` - If the search fails
    async fn search(&self, query: &SearchQuery) -> Result<NexusSearchResult, RegistryError>;
}
