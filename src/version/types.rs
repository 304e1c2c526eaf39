//! Nexus search response types

use serde::{Deserialize, Serialize};

/// Response body of the Nexus search API
///
/// `items` keep the order the registry returned them in (requested sorted by
/// version, descending); `items[0]` is the most recent match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NexusSearchResult {
    #[serde(default)]
    pub items: Vec<NexusSearchResultItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
}

impl NexusSearchResult {
    pub fn new(items: Vec<NexusSearchResultItem>) -> Self {
        Self {
            items,
            continuation_token: None,
        }
    }

    /// Version of the most recent match, if any
    pub fn latest_version(&self) -> Option<&str> {
        self.items.first().map(|item| item.version.as_str())
    }

    /// First item (in registry order) whose version starts with `prefix`
    pub fn first_version_starting_with(&self, prefix: &str) -> Option<&str> {
        self.items
            .iter()
            .map(|item| item.version.as_str())
            .find(|version| version.starts_with(prefix))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NexusSearchResultItem {
    #[serde(default)]
    pub group: Option<String>,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub repository: String,
    #[serde(default)]
    pub assets: Vec<NexusAsset>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NexusAsset {
    pub download_url: String,
    pub path: String,
    pub id: String,
}
