//! The fixed default stage list

pub mod build;
pub mod docker;
pub mod git;
pub mod helm;
pub mod identify;
pub mod kubernetes;
pub mod terraform;
pub mod version;

use crate::config::Config;
use crate::pipeline::stage::Stage;

/// All stages, in execution order
pub fn default_stages(config: &Config) -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(identify::ValidateCommand),
        Box::new(identify::CheckToolVersion::new(config.tool.check_version)),
        Box::new(identify::DetectProjectType),
        Box::new(identify::ReadProjectInfo),
        Box::new(git::CheckUncommittedChanges),
        Box::new(version::FetchLatestNexusVersions),
        Box::new(version::ValidateProjectVersion),
        Box::new(version::CheckVersionUniqueness),
        Box::new(version::ResolvePreReleaseVersion),
        Box::new(version::CheckDependencies),
        Box::new(build::BuildProject),
        Box::new(build::PublishArtifact),
        Box::new(version::ResolvePublishedSnapshotVersion),
        Box::new(docker::BuildDockerImage),
        Box::new(docker::PushDockerImage),
        Box::new(helm::PublishHelmChart),
        Box::new(kubernetes::DeployKubernetes),
        Box::new(terraform::ApplyTerraform),
        Box::new(git::TagRelease),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;

    #[test]
    fn default_stage_order() {
        let pipeline = Pipeline::new(default_stages(&Config::default()));

        assert_eq!(
            pipeline.stage_names(),
            vec![
                "validate-command",
                "check-tool-version",
                "detect-project-type",
                "read-project-info",
                "check-uncommitted-changes",
                "fetch-latest-nexus-versions",
                "validate-project-version",
                "check-version-uniqueness",
                "resolve-pre-release-version",
                "check-dependencies",
                "build-project",
                "publish-artifact",
                "resolve-published-snapshot-version",
                "build-docker-image",
                "push-docker-image",
                "publish-helm-chart",
                "deploy-kubernetes",
                "apply-terraform",
                "tag-release",
            ]
        );
    }
}
