//! Local Maven metadata lookup
//!
//! After a snapshot deploy, Maven leaves `maven-metadata-nexus.xml` in the
//! local repository next to the artifact. It lists the timestamped snapshot
//! identifier the server assigned to each published file.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::MAVEN_METADATA_FILE;
use crate::version::error::MetadataError;

/// Packaging extension whose snapshot identifier names the build
const JAR_EXTENSION: &str = "jar";

/// Path of the metadata file for `group:artifact:version` under `repository`
pub fn metadata_path(repository: &Path, group: &str, artifact: &str, version: &str) -> PathBuf {
    let mut path = repository.to_path_buf();
    path.extend(group.split('.'));
    path.push(artifact);
    path.push(version);
    path.push(MAVEN_METADATA_FILE);
    path
}

/// Read the server-assigned snapshot identifier of the `jar` artifact
pub fn read_snapshot_version(
    repository: &Path,
    group: &str,
    artifact: &str,
    version: &str,
) -> Result<String, MetadataError> {
    let path = metadata_path(repository, group, artifact, version);
    let content = std::fs::read_to_string(&path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            MetadataError::Missing(path.clone())
        } else {
            MetadataError::Read {
                path: path.clone(),
                source,
            }
        }
    })?;

    let snapshot = parse_snapshot_version(&content, JAR_EXTENSION).map_err(|reason| {
        MetadataError::Malformed {
            path: path.clone(),
            reason,
        }
    })?;

    let snapshot = snapshot.ok_or_else(|| MetadataError::NoJarEntry(path.clone()))?;
    debug!("Snapshot version of {}:{} is {}", group, artifact, snapshot);
    Ok(snapshot)
}

/// First `snapshotVersion/value` whose extension is `extension`
fn parse_snapshot_version(content: &str, extension: &str) -> Result<Option<String>, String> {
    let doc = roxmltree::Document::parse(content).map_err(|e| e.to_string())?;

    let value = doc
        .descendants()
        .filter(|n| n.has_tag_name("snapshotVersion"))
        .find(|entry| element_text(*entry, "extension").as_deref() == Some(extension))
        .and_then(|entry| element_text(entry, "value"));

    Ok(value)
}

fn element_text(node: roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    node.children()
        .find(|c| c.has_tag_name(name))
        .and_then(|c| c.text())
        .map(|t| t.trim().to_string())
}
