//! Nexus Repository search API implementation

use crate::config::NexusConfig;
use crate::version::error::RegistryError;
use crate::version::registry::{Registry, SearchQuery};
use crate::version::types::NexusSearchResult;
use tracing::{debug, warn};

/// Search endpoint path, relative to the Nexus base URL
const SEARCH_PATH: &str = "service/rest/v1/search";

/// Registry implementation for the Nexus search API
pub struct NexusClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<(String, Option<String>)>,
}

impl NexusClient {
    /// Creates a new NexusClient for `base_url` without credentials
    pub fn new(base_url: &str) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
        })
    }

    /// Creates a NexusClient from configuration, with basic auth when a
    /// username is configured
    pub fn from_config(config: &NexusConfig) -> Result<Self, RegistryError> {
        let mut nexus = Self::new(&config.url)?;
        nexus.credentials = config
            .username
            .clone()
            .map(|username| (username, config.password.clone()));
        Ok(nexus)
    }

    fn search_url(&self, query: &SearchQuery) -> Result<reqwest::Url, RegistryError> {
        let base = format!("{}/{}", self.base_url, SEARCH_PATH);
        reqwest::Url::parse_with_params(&base, query.to_params())
            .map_err(|e| RegistryError::InvalidResponse(format!("Invalid search URL {base}: {e}")))
    }
}

#[async_trait::async_trait]
impl Registry for NexusClient {
    async fn search(&self, query: &SearchQuery) -> Result<NexusSearchResult, RegistryError> {
        let url = self.search_url(query)?;
        debug!("Searching Nexus: {}", url);

        let mut request = self.client.get(url.clone());
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, password.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(RegistryError::Unauthorized(query.repository.clone()));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(query.repository.clone()));
        }

        if !status.is_success() {
            warn!("Nexus returned status {}: {}", status, url);
            return Err(RegistryError::InvalidResponse(format!(
                "Unexpected status: {}",
                status
            )));
        }

        let result: NexusSearchResult = response.json().await.map_err(|e| {
            warn!("Failed to parse Nexus search response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        debug!(
            "Nexus returned {} item(s) for {}",
            result.items.len(),
            query.name
        );
        Ok(result)
    }
}
