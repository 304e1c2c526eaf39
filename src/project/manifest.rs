//! Manifest readers producing `ProjectInfo`
//!
//! - `package.json` (npm)
//! - `pom.xml` (Maven)
//! - `build.gradle.kts` / `build.gradle` + `settings.gradle(.kts)` (Gradle)
//! - `docker.json`, `helm.json`

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use indexmap::IndexMap;
use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::project::types::{ProjectInfo, ProjectType, RepoType};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Manifest not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed manifest {}: {reason}", .path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Manifest {} has no {field}", .path.display())]
    MissingField { path: PathBuf, field: &'static str },

    #[error("No manifest reader for project type {0}")]
    Unsupported(&'static str),
}

/// Read the project described by the manifest in `dir`
pub fn read_project_info(dir: &Path, project_type: ProjectType) -> Result<ProjectInfo, ManifestError> {
    let mut info = match project_type {
        ProjectType::NpmLibrary | ProjectType::NpmApplication => read_package_json(dir)?,
        ProjectType::MavenLibrary | ProjectType::MavenApplication => read_pom(dir)?,
        ProjectType::GradleLibrary | ProjectType::GradleApplication => {
            GradleBuildReader::new().read(dir)?
        }
        ProjectType::DockerImage | ProjectType::DockerApplication => {
            read_descriptor(&dir.join("docker.json"))?
        }
        ProjectType::HelmLibrary | ProjectType::HelmApplication => {
            read_descriptor(&dir.join("helm.json"))?
        }
        ProjectType::Unknown => return Err(ManifestError::Unsupported(project_type.as_str())),
    };

    info.repo_type = Some(if info.monorepo_children.is_empty() {
        RepoType::Polyrepo
    } else {
        RepoType::Monorepo
    });
    info.has_terraform = dir.join("terraform").is_dir();

    debug!(
        "Read {} {} from {}",
        project_type.as_str(),
        info.name,
        dir.display()
    );
    Ok(info)
}

/// Per-run memo of manifest reads, keyed by directory and project type.
#[derive(Debug, Default)]
pub struct ManifestCache {
    entries: Mutex<HashMap<(PathBuf, ProjectType), ProjectInfo>>,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn project_info(
        &self,
        dir: &Path,
        project_type: ProjectType,
    ) -> Result<ProjectInfo, ManifestError> {
        let key = (dir.to_path_buf(), project_type);
        if let Some(cached) = self.lock().get(&key) {
            return Ok(cached.clone());
        }

        let info = read_project_info(dir, project_type)?;
        self.lock().insert(key, info.clone());
        Ok(info)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<(PathBuf, ProjectType), ProjectInfo>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn read_file(path: &Path) -> Result<String, ManifestError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ManifestError::NotFound(path.to_path_buf())
        } else {
            ManifestError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: IndexMap<String, String>,
    #[serde(default)]
    workspaces: Option<serde_json::Value>,
}

/// Split `@scope/name` into (Some("scope"), "name")
pub fn split_npm_name(full_name: &str) -> (Option<&str>, &str) {
    match full_name.strip_prefix('@').and_then(|n| n.split_once('/')) {
        Some((scope, name)) => (Some(scope), name),
        None => (None, full_name),
    }
}

fn read_package_json(dir: &Path) -> Result<ProjectInfo, ManifestError> {
    let path = dir.join("package.json");
    let content = read_file(&path)?;
    let package: PackageJson =
        serde_json::from_str(&content).map_err(|e| ManifestError::Malformed {
            path: path.clone(),
            reason: e.to_string(),
        })?;

    let full_name = package.name.ok_or_else(|| ManifestError::MissingField {
        path: path.clone(),
        field: "name",
    })?;
    let version = package.version.ok_or_else(|| ManifestError::MissingField {
        path: path.clone(),
        field: "version",
    })?;

    let (group, name) = split_npm_name(&full_name);
    let mut info = ProjectInfo::new(group, name, &version);
    info.dependencies = package.dependencies;

    for workspace in workspace_dirs(dir, package.workspaces.as_ref()) {
        info.monorepo_children.push(read_package_json(&workspace)?);
    }

    Ok(info)
}

/// Resolve npm workspace entries; a trailing `/*` expands to every child
/// directory holding a `package.json`.
fn workspace_dirs(dir: &Path, workspaces: Option<&serde_json::Value>) -> Vec<PathBuf> {
    let Some(entries) = workspaces.and_then(|w| w.as_array()) else {
        return Vec::new();
    };

    let mut dirs = Vec::new();
    for entry in entries.iter().filter_map(|e| e.as_str()) {
        if let Some(parent) = entry.strip_suffix("/*") {
            let Ok(read_dir) = std::fs::read_dir(dir.join(parent)) else {
                continue;
            };
            let mut children: Vec<PathBuf> = read_dir
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.join("package.json").is_file())
                .collect();
            children.sort();
            dirs.extend(children);
        } else {
            dirs.push(dir.join(entry));
        }
    }
    dirs
}

fn child<'a, 'input>(
    node: roxmltree::Node<'a, 'input>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'input>> {
    node.children()
        .find(|c| c.is_element() && c.tag_name().name() == name)
}

fn child_text(node: roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    child(node, name)
        .and_then(|c| c.text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn read_pom(dir: &Path) -> Result<ProjectInfo, ManifestError> {
    let path = dir.join("pom.xml");
    let content = read_file(&path)?;
    let doc = roxmltree::Document::parse(&content).map_err(|e| ManifestError::Malformed {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let project = doc.root_element();
    let parent = child(project, "parent");
    let inherited = |field: &str| parent.and_then(|p| child_text(p, field));

    let group = child_text(project, "groupId").or_else(|| inherited("groupId"));
    let artifact = child_text(project, "artifactId").ok_or_else(|| ManifestError::MissingField {
        path: path.clone(),
        field: "artifactId",
    })?;
    let version = child_text(project, "version")
        .or_else(|| inherited("version"))
        .ok_or_else(|| ManifestError::MissingField {
            path: path.clone(),
            field: "version",
        })?;

    let modules: Vec<String> = child(project, "modules")
        .map(|m| {
            m.children()
                .filter(|c| c.is_element() && c.tag_name().name() == "module")
                .filter_map(|c| c.text().map(|t| t.trim().to_string()))
                .collect()
        })
        .unwrap_or_default();

    let mut info = ProjectInfo::new(group.as_deref(), &artifact, &version);
    for module in modules {
        info.monorepo_children.push(read_pom(&dir.join(module))?);
    }
    Ok(info)
}

/// Minimal Gradle build file reader.
///
/// Only understands literal `group = "..."`, `version = "..."`,
/// `rootProject.name = "..."` and `include(...)` statements.
struct GradleBuildReader {
    group_re: Regex,
    version_re: Regex,
    root_name_re: Regex,
    include_re: Regex,
    quoted_re: Regex,
}

impl GradleBuildReader {
    fn new() -> Self {
        Self {
            group_re: Regex::new(r#"(?m)^\s*group\s*=\s*["']([^"']+)["']"#).expect("valid regex"),
            version_re: Regex::new(r#"(?m)^\s*version\s*=\s*["']([^"']+)["']"#)
                .expect("valid regex"),
            root_name_re: Regex::new(r#"rootProject\.name\s*=\s*["']([^"']+)["']"#)
                .expect("valid regex"),
            include_re: Regex::new(r"(?m)^\s*include\s*\(?([^)\n]*)\)?").expect("valid regex"),
            quoted_re: Regex::new(r#"["']([^"']+)["']"#).expect("valid regex"),
        }
    }

    fn first_existing(dir: &Path, names: &[&str]) -> Option<PathBuf> {
        names.iter().map(|n| dir.join(n)).find(|p| p.is_file())
    }

    fn capture(re: &Regex, content: &str) -> Option<String> {
        re.captures(content).map(|c| c[1].to_string())
    }

    fn read(&self, dir: &Path) -> Result<ProjectInfo, ManifestError> {
        self.read_project(dir, None, None)
    }

    fn read_project(
        &self,
        dir: &Path,
        inherited_group: Option<&str>,
        inherited_version: Option<&str>,
    ) -> Result<ProjectInfo, ManifestError> {
        let build_file = Self::first_existing(dir, &["build.gradle.kts", "build.gradle"])
            .ok_or_else(|| ManifestError::NotFound(dir.join("build.gradle.kts")))?;
        let build = read_file(&build_file)?;

        let settings = match Self::first_existing(dir, &["settings.gradle.kts", "settings.gradle"]) {
            Some(path) => read_file(&path)?,
            None => String::new(),
        };

        let group = Self::capture(&self.group_re, &build).or(inherited_group.map(str::to_string));
        let version = Self::capture(&self.version_re, &build)
            .or(inherited_version.map(str::to_string))
            .ok_or_else(|| ManifestError::MissingField {
                path: build_file.clone(),
                field: "version",
            })?;
        let name = Self::capture(&self.root_name_re, &settings)
            .or_else(|| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
            .ok_or_else(|| ManifestError::MissingField {
                path: build_file.clone(),
                field: "rootProject.name",
            })?;

        let mut info = ProjectInfo::new(group.as_deref(), &name, &version);

        for include in self.include_re.captures_iter(&settings) {
            for project_path in self.quoted_re.captures_iter(&include[1]) {
                let relative = project_path[1].trim_start_matches(':').replace(':', "/");
                let child = self.read_project(
                    &dir.join(&relative),
                    group.as_deref(),
                    Some(&version),
                )?;
                info.monorepo_children.push(child);
            }
        }

        Ok(info)
    }
}

#[derive(Debug, Deserialize)]
struct Descriptor {
    group: Option<String>,
    name: Option<String>,
    version: Option<String>,
}

fn read_descriptor(path: &Path) -> Result<ProjectInfo, ManifestError> {
    let content = read_file(path)?;
    let descriptor: Descriptor =
        serde_json::from_str(&content).map_err(|e| ManifestError::Malformed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let name = descriptor.name.ok_or_else(|| ManifestError::MissingField {
        path: path.to_path_buf(),
        field: "name",
    })?;
    let version = descriptor.version.ok_or_else(|| ManifestError::MissingField {
        path: path.to_path_buf(),
        field: "version",
    })?;

    Ok(ProjectInfo::new(descriptor.group.as_deref(), &name, &version))
}
