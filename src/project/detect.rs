//! Project ecosystem detection

use std::path::Path;

use crate::project::types::ProjectType;

/// Directory whose presence marks a project as deployed (an application)
pub const DEPLOY_DIR: &str = "deploy";

/// Detect the ecosystem of the project in `dir` from its marker files.
///
/// Checked in order: `package.json`, `pom.xml`, `build.gradle(.kts)`,
/// `helm.json`, `docker.json`. A `deploy/` directory selects the
/// application variant.
pub fn detect_project_type(dir: &Path) -> ProjectType {
    let is_application = dir.join(DEPLOY_DIR).is_dir();
    let has = |file: &str| dir.join(file).is_file();

    let (library, application) = if has("package.json") {
        (ProjectType::NpmLibrary, ProjectType::NpmApplication)
    } else if has("pom.xml") {
        (ProjectType::MavenLibrary, ProjectType::MavenApplication)
    } else if has("build.gradle.kts") || has("build.gradle") {
        (ProjectType::GradleLibrary, ProjectType::GradleApplication)
    } else if has("helm.json") {
        (ProjectType::HelmLibrary, ProjectType::HelmApplication)
    } else if has("docker.json") {
        (ProjectType::DockerImage, ProjectType::DockerApplication)
    } else {
        return ProjectType::Unknown;
    };

    if is_application { application } else { library }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    #[rstest]
    #[case(&["package.json"], false, ProjectType::NpmLibrary)]
    #[case(&["package.json"], true, ProjectType::NpmApplication)]
    #[case(&["pom.xml"], false, ProjectType::MavenLibrary)]
    #[case(&["pom.xml", "docker.json"], true, ProjectType::MavenApplication)]
    #[case(&["build.gradle.kts"], false, ProjectType::GradleLibrary)]
    #[case(&["build.gradle"], true, ProjectType::GradleApplication)]
    #[case(&["helm.json"], true, ProjectType::HelmApplication)]
    #[case(&["docker.json"], false, ProjectType::DockerImage)]
    #[case(&["docker.json"], true, ProjectType::DockerApplication)]
    #[case(&["README.md"], true, ProjectType::Unknown)]
    fn detect_project_type_returns_expected(
        #[case] files: &[&str],
        #[case] deployed: bool,
        #[case] expected: ProjectType,
    ) {
        let temp_dir = TempDir::new().unwrap();
        for file in files {
            std::fs::write(temp_dir.path().join(file), "{}").unwrap();
        }
        if deployed {
            std::fs::create_dir(temp_dir.path().join(DEPLOY_DIR)).unwrap();
        }

        assert_eq!(detect_project_type(temp_dir.path()), expected);
    }
}
