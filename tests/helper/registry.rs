//! Registry test utilities

use std::sync::Mutex;

use async_trait::async_trait;

use shipit::version::error::RegistryError;
use shipit::version::registry::{Registry, SearchQuery};
use shipit::version::types::{NexusSearchResult, NexusSearchResultItem};

/// In-memory Nexus: filters published versions the way the search API does
#[derive(Default)]
pub struct MockRegistry {
    /// (repository, name, version), newest first per artifact
    published: Vec<(String, String, String)>,
    queries: Mutex<Vec<SearchQuery>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `versions` (newest first) of `name` in `repository`
    pub fn with_versions(mut self, repository: &str, name: &str, versions: &[&str]) -> Self {
        self.published.extend(
            versions
                .iter()
                .map(|v| (repository.to_string(), name.to_string(), v.to_string())),
        );
        self
    }

    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries.lock().unwrap().clone()
    }

    fn matches_pattern(version: &str, pattern: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => version.starts_with(prefix),
            None => version == pattern,
        }
    }
}

#[async_trait]
impl Registry for MockRegistry {
    async fn search(&self, query: &SearchQuery) -> Result<NexusSearchResult, RegistryError> {
        self.queries.lock().unwrap().push(query.clone());

        let items = self
            .published
            .iter()
            .filter(|(repository, name, _)| *repository == query.repository && *name == query.name)
            .filter(|(_, _, version)| match query.prerelease {
                Some(prerelease) => version.contains('-') == prerelease,
                None => true,
            })
            .filter(|(_, _, version)| {
                query
                    .version
                    .as_deref()
                    .is_none_or(|pattern| Self::matches_pattern(version, pattern))
            })
            .map(|(repository, name, version)| NexusSearchResultItem {
                group: query.group.clone(),
                name: name.clone(),
                version: version.clone(),
                repository: repository.clone(),
                ..Default::default()
            })
            .collect();

        Ok(NexusSearchResult::new(items))
    }
}
