//! Project fixtures on disk

use std::path::Path;

use shipit::version::metadata::metadata_path;

pub fn write_file(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// What a Nexus deploy leaves in the local Maven repository
pub fn write_snapshot_metadata(repository: &Path, group: &str, artifact: &str, version: &str, value: &str) {
    let path = metadata_path(repository, group, artifact, version);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        path,
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata modelVersion="1.1.0">
  <groupId>{group}</groupId>
  <artifactId>{artifact}</artifactId>
  <version>{version}</version>
  <versioning>
    <snapshotVersions>
      <snapshotVersion>
        <extension>pom</extension>
        <value>{value}</value>
      </snapshotVersion>
      <snapshotVersion>
        <extension>jar</extension>
        <value>{value}</value>
      </snapshotVersion>
    </snapshotVersions>
  </versioning>
</metadata>
"#
        ),
    )
    .unwrap();
}
