use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Application name used for config, data and log locations
pub const APP_NAME: &str = "shipit";

/// Default Nexus base URL
pub const DEFAULT_NEXUS_URL: &str = "http://localhost:8081";

/// Name of the local Maven metadata file written by a Nexus deploy
pub const MAVEN_METADATA_FILE: &str = "maven-metadata-nexus.xml";

/// Shipit configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub nexus: NexusConfig,
    pub repositories: RepositoriesConfig,
    pub docker: DockerConfig,
    pub tool: ToolConfig,
    pub kubernetes: KubernetesConfig,
}

/// Nexus connection settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct NexusConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for NexusConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_NEXUS_URL.to_string(),
            username: None,
            password: None,
        }
    }
}

/// Nexus repository names per ecosystem
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct RepositoriesConfig {
    pub npm: String,
    pub maven_releases: String,
    pub maven_snapshots: String,
    pub docker: String,
    pub helm: String,
}

impl Default for RepositoriesConfig {
    fn default() -> Self {
        Self {
            npm: "npm-hosted".to_string(),
            maven_releases: "maven-releases".to_string(),
            maven_snapshots: "maven-snapshots".to_string(),
            docker: "docker-hosted".to_string(),
            helm: "helm-hosted".to_string(),
        }
    }
}

/// Docker registry settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DockerConfig {
    /// Registry host images are tagged and pushed with (e.g. "nexus.local:8082")
    pub registry: String,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            registry: "localhost:8082".to_string(),
        }
    }
}

/// Where shipit's own releases are published, for the self version check
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct ToolConfig {
    pub repository: String,
    pub group: Option<String>,
    pub name: String,
    pub check_version: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            repository: "tools-hosted".to_string(),
            group: None,
            name: APP_NAME.to_string(),
            check_version: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct KubernetesConfig {
    pub namespace: Option<String>,
}

impl Config {
    /// Load configuration from `path`.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    /// `NEXUS_USERNAME` / `NEXUS_PASSWORD` override the file's credentials.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str::<Config>(&content).map_err(|e| {
                PipelineError::Configuration(format!(
                    "Invalid config file {}: {}",
                    path.display(),
                    e
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(e.into()),
        };

        config.apply_env(
            std::env::var("NEXUS_USERNAME").ok(),
            std::env::var("NEXUS_PASSWORD").ok(),
        );
        Ok(config)
    }

    fn apply_env(&mut self, username: Option<String>, password: Option<String>) {
        if username.is_some() {
            self.nexus.username = username;
        }
        if password.is_some() {
            self.nexus.password = password;
        }
    }
}

/// Returns the path to the config file.
/// Uses $XDG_CONFIG_HOME/shipit/config.json if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/shipit/config.json.
pub fn config_path() -> PathBuf {
    app_dir_with_env(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
        ".config",
    )
    .join("config.json")
}

/// Returns the path to the data directory for shipit.
/// Uses $XDG_DATA_HOME/shipit if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/shipit,
/// or ./shipit if neither is available.
pub fn data_dir() -> PathBuf {
    app_dir_with_env(
        std::env::var("XDG_DATA_HOME").ok(),
        dirs::home_dir(),
        ".local/share",
    )
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("shipit.log")
}

/// Returns the local Maven repository (`~/.m2/repository`).
pub fn maven_repository_dir() -> PathBuf {
    maven_repository_dir_with_home(dirs::home_dir())
}

fn maven_repository_dir_with_home(home_dir: Option<PathBuf>) -> PathBuf {
    home_dir
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".m2")
        .join("repository")
}

fn app_dir_with_env(xdg_home: Option<String>, home_dir: Option<PathBuf>, fallback: &str) -> PathBuf {
    let base = xdg_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(fallback)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_NAME)
}
