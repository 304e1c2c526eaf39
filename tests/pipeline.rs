//! Default pipeline runs against projects on disk

mod helper;

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use helper::{
    MockRegistry, RecordingRunner, ScriptedPrompter, test_services, write_file, write_snapshot_metadata,
};
use shipit::error::{PipelineError, StageError};
use shipit::pipeline::{Pipeline, default_stages};
use shipit::project::types::{BuildContext, CommandType, VersionType};

struct Run {
    result: Result<BuildContext, StageError>,
    runner: Arc<RecordingRunner>,
    registry: Arc<MockRegistry>,
    prompter: Arc<ScriptedPrompter>,
}

async fn run_pipeline(
    dir: &Path,
    command_type: CommandType,
    registry: MockRegistry,
    runner: RecordingRunner,
    prompter: ScriptedPrompter,
    maven_repository: &Path,
) -> Run {
    let registry = Arc::new(registry);
    let runner = Arc::new(runner);
    let prompter = Arc::new(prompter);
    let (config, services) = test_services(&registry, &runner, &prompter, maven_repository.to_path_buf());

    let result = Pipeline::new(default_stages(&config))
        .run(BuildContext::new(command_type, dir.to_path_buf()), &services)
        .await;

    Run {
        result,
        runner,
        registry,
        prompter,
    }
}

fn npm_project(dir: &Path, version: &str, deploy: bool) {
    write_file(
        dir,
        "package.json",
        &format!(r#"{{"name": "@acme/widget", "version": "{version}", "dependencies": {{"left-pad": "^1.3.0"}}}}"#),
    );
    if deploy {
        write_file(dir, "deploy/deployment.yaml", "kind: Deployment\n");
    }
}

#[tokio::test]
async fn npm_full_build_bumps_beta_and_publishes_it() {
    let project = TempDir::new().unwrap();
    npm_project(project.path(), "1.0.0-beta", false);
    let registry = MockRegistry::new()
        .with_versions("npm-hosted", "widget", &["1.0.0-beta.2", "1.0.0-beta.1", "0.9.0"]);

    let run = run_pipeline(
        project.path(),
        CommandType::FullBuild,
        registry,
        RecordingRunner::new(),
        ScriptedPrompter::default(),
        project.path(),
    )
    .await;

    let context = run.result.unwrap();
    assert_eq!(context.project_info.version, "1.0.0-beta.3");
    assert_eq!(context.project_info.version_type, VersionType::PreRelease);
    assert_eq!(
        run.runner.commands(),
        vec![
            "git status --porcelain",
            "npm version 1.0.0-beta.3 --no-git-tag-version --allow-same-version",
            "npm ci",
            "npm run build --if-present",
            "npm publish --tag beta",
        ]
    );
    assert!(
        run.registry
            .queries()
            .iter()
            .any(|q| q.version.as_deref() == Some("1.0.0-beta*"))
    );
}

#[tokio::test]
async fn npm_docker_only_reuses_published_beta() {
    let project = TempDir::new().unwrap();
    npm_project(project.path(), "1.0.0-beta", true);
    let registry = MockRegistry::new().with_versions("npm-hosted", "widget", &["1.0.0-beta.2"]);

    let run = run_pipeline(
        project.path(),
        CommandType::DockerOnly,
        registry,
        RecordingRunner::new(),
        ScriptedPrompter::default(),
        project.path(),
    )
    .await;

    let context = run.result.unwrap();
    assert_eq!(context.project_info.version, "1.0.0-beta.2");
    assert_eq!(
        run.runner.commands(),
        vec![
            "docker build -t localhost:8082/acme/widget:1.0.0-beta.2 --build-arg VERSION=1.0.0-beta.2 .",
            "docker push localhost:8082/acme/widget:1.0.0-beta.2",
        ]
    );
}

#[tokio::test]
async fn kubernetes_only_without_published_beta_fails_before_deploying() {
    let project = TempDir::new().unwrap();
    npm_project(project.path(), "1.0.0-beta", true);

    let run = run_pipeline(
        project.path(),
        CommandType::KubernetesOnly,
        MockRegistry::new(),
        RecordingRunner::new(),
        ScriptedPrompter::default(),
        project.path(),
    )
    .await;

    let error = run.result.unwrap_err();
    assert_eq!(error.stage, "resolve-pre-release-version");
    assert!(matches!(error.source, PipelineError::VersionResolution(_)));
    assert!(run.runner.commands().is_empty());
}

#[tokio::test]
async fn stale_release_stops_before_anything_is_built() {
    let project = TempDir::new().unwrap();
    npm_project(project.path(), "1.1.0", false);
    let registry = MockRegistry::new().with_versions("npm-hosted", "widget", &["2.0.0", "1.0.0"]);

    let run = run_pipeline(
        project.path(),
        CommandType::FullBuild,
        registry,
        RecordingRunner::new(),
        ScriptedPrompter::default(),
        project.path(),
    )
    .await;

    let error = run.result.unwrap_err();
    assert_eq!(error.stage, "validate-project-version");
    assert!(
        error
            .to_string()
            .contains("Project version is not higher than versions in Nexus")
    );
    assert_eq!(run.runner.commands(), vec!["git status --porcelain"]);
}

#[tokio::test]
async fn release_full_build_deploys_and_tags() {
    let project = TempDir::new().unwrap();
    npm_project(project.path(), "1.1.0", true);
    let registry = MockRegistry::new().with_versions("npm-hosted", "widget", &["1.0.0", "1.0.0-beta"]);

    let run = run_pipeline(
        project.path(),
        CommandType::FullBuild,
        registry,
        RecordingRunner::new(),
        ScriptedPrompter::default(),
        project.path(),
    )
    .await;

    let context = run.result.unwrap();
    let image = "localhost:8082/acme/widget:1.1.0";
    assert_eq!(
        context.project_info.kubernetes_docker_image.as_deref(),
        Some(image)
    );
    assert_eq!(
        run.runner.commands(),
        vec![
            "git status --porcelain".to_string(),
            "npm version 1.1.0 --no-git-tag-version --allow-same-version".to_string(),
            "npm ci".to_string(),
            "npm run build --if-present".to_string(),
            "npm publish".to_string(),
            format!("docker build -t {image} --build-arg VERSION=1.1.0 ."),
            format!("docker push {image}"),
            "kubectl apply -f deploy/".to_string(),
            format!("kubectl set image deployment/widget widget={image}"),
            "git tag v1.1.0".to_string(),
            "git push origin v1.1.0".to_string(),
        ]
    );
}

#[tokio::test]
async fn failing_tool_stops_the_pipeline_at_that_stage() {
    let project = TempDir::new().unwrap();
    npm_project(project.path(), "1.1.0", false);
    let registry = MockRegistry::new().with_versions("npm-hosted", "widget", &["1.0.0"]);

    let run = run_pipeline(
        project.path(),
        CommandType::FullBuild,
        registry,
        RecordingRunner::new().with_failure("npm ci"),
        ScriptedPrompter::default(),
        project.path(),
    )
    .await;

    let error = run.result.unwrap_err();
    assert_eq!(error.stage, "build-project");
    assert!(matches!(error.source, PipelineError::ExternalTool { .. }));
    assert_eq!(run.runner.commands().last().map(String::as_str), Some("npm ci"));
}

#[tokio::test]
async fn uncommitted_changes_abort_when_declined() {
    let project = TempDir::new().unwrap();
    npm_project(project.path(), "1.1.0", false);

    let run = run_pipeline(
        project.path(),
        CommandType::FullBuild,
        MockRegistry::new(),
        RecordingRunner::new().with_output("git status", " M package.json\n"),
        ScriptedPrompter::answering(&[false]),
        project.path(),
    )
    .await;

    let error = run.result.unwrap_err();
    assert_eq!(error.stage, "check-uncommitted-changes");
    assert!(matches!(error.source, PipelineError::UserAbort(_)));
    assert_eq!(run.prompter.questions().len(), 1);
    assert!(run.registry.queries().is_empty());
}

#[tokio::test]
async fn maven_full_build_uses_deployed_snapshot_identifier() {
    let project = TempDir::new().unwrap();
    let m2 = TempDir::new().unwrap();
    write_file(
        project.path(),
        "pom.xml",
        r#"<project>
  <groupId>com.acme</groupId>
  <artifactId>ledger</artifactId>
  <version>1.1.0-SNAPSHOT</version>
</project>"#,
    );
    write_snapshot_metadata(
        m2.path(),
        "com.acme",
        "ledger",
        "1.1.0-SNAPSHOT",
        "1.1.0-20240105.093012-7",
    );
    let registry = MockRegistry::new()
        .with_versions("maven-releases", "ledger", &["1.0.0"])
        .with_versions("maven-snapshots", "ledger", &["1.1.0-20240101.080000-6"]);

    let run = run_pipeline(
        project.path(),
        CommandType::FullBuild,
        registry,
        RecordingRunner::new(),
        ScriptedPrompter::default(),
        m2.path(),
    )
    .await;

    let context = run.result.unwrap();
    assert_eq!(context.project_info.version, "1.1.0-20240105.093012-7");
    assert_eq!(
        run.runner.commands(),
        vec![
            "git status --porcelain",
            "mvn -B clean install",
            "mvn -B deploy -DskipTests",
        ]
    );
}

#[tokio::test]
async fn maven_docker_only_looks_up_registry_snapshot() {
    let project = TempDir::new().unwrap();
    write_file(
        project.path(),
        "pom.xml",
        r#"<project>
  <groupId>com.acme</groupId>
  <artifactId>ledger</artifactId>
  <version>1.1.0-SNAPSHOT</version>
</project>"#,
    );
    write_file(project.path(), "deploy/deployment.yaml", "kind: Deployment\n");
    let registry = MockRegistry::new().with_versions(
        "maven-snapshots",
        "ledger",
        &["1.1.0-20240105.093012-7", "1.0.0-20231201.101010-2"],
    );

    let run = run_pipeline(
        project.path(),
        CommandType::DockerOnly,
        registry,
        RecordingRunner::new(),
        ScriptedPrompter::default(),
        project.path(),
    )
    .await;

    let context = run.result.unwrap();
    assert_eq!(context.project_info.version, "1.1.0-20240105.093012-7");
    assert_eq!(
        run.runner.commands()[0],
        "docker build -t localhost:8082/com.acme/ledger:1.1.0-20240105.093012-7 --build-arg VERSION=1.1.0-20240105.093012-7 ."
    );
}

#[tokio::test]
async fn terraform_only_never_touches_the_registry() {
    let project = TempDir::new().unwrap();
    npm_project(project.path(), "1.0.0-beta", true);
    write_file(project.path(), "terraform/main.tf", "");

    let run = run_pipeline(
        project.path(),
        CommandType::TerraformOnly,
        MockRegistry::new(),
        RecordingRunner::new(),
        ScriptedPrompter::answering(&[false]),
        project.path(),
    )
    .await;

    let error = run.result.unwrap_err();
    assert_eq!(error.stage, "apply-terraform");
    assert!(matches!(error.source, PipelineError::UserAbort(_)));
    assert!(run.registry.queries().is_empty());
    assert_eq!(
        run.runner.commands(),
        vec![
            "terraform init -input=false",
            "terraform plan -input=false -out=shipit.tfplan",
        ]
    );
}

#[tokio::test]
async fn unknown_command_runs_nothing() {
    let project = TempDir::new().unwrap();
    npm_project(project.path(), "1.0.0", false);

    let run = run_pipeline(
        project.path(),
        CommandType::Unknown,
        MockRegistry::new(),
        RecordingRunner::new(),
        ScriptedPrompter::default(),
        project.path(),
    )
    .await;

    let error = run.result.unwrap_err();
    assert_eq!(error.stage, "validate-command");
    assert!(matches!(error.source, PipelineError::Configuration(_)));
    assert!(run.runner.commands().is_empty());
    assert!(run.registry.queries().is_empty());
}

#[tokio::test]
async fn undetectable_project_is_a_configuration_error() {
    let project = TempDir::new().unwrap();

    let run = run_pipeline(
        project.path(),
        CommandType::FullBuild,
        MockRegistry::new(),
        RecordingRunner::new(),
        ScriptedPrompter::default(),
        project.path(),
    )
    .await;

    let error = run.result.unwrap_err();
    assert_eq!(error.stage, "detect-project-type");
    assert!(matches!(error.source, PipelineError::Configuration(_)));
}

#[tokio::test]
async fn each_run_reads_the_manifest_afresh() {
    let project = TempDir::new().unwrap();
    npm_project(project.path(), "1.0.0-beta", true);
    let registry = || MockRegistry::new().with_versions("npm-hosted", "widget", &["1.0.0-beta.2"]);

    let first = run_pipeline(
        project.path(),
        CommandType::DockerOnly,
        registry(),
        RecordingRunner::new(),
        ScriptedPrompter::default(),
        project.path(),
    )
    .await;
    npm_project(project.path(), "2.0.0", true);
    let second = run_pipeline(
        project.path(),
        CommandType::DockerOnly,
        registry(),
        RecordingRunner::new(),
        ScriptedPrompter::default(),
        project.path(),
    )
    .await;

    assert_eq!(first.result.unwrap().project_info.version, "1.0.0-beta.2");
    assert_eq!(second.result.unwrap().project_info.version, "2.0.0");
}
