use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{ArgGroup, Parser};

use shipit::config::{Config, config_path, maven_repository_dir};
use shipit::logging::{self, LoggingConfig};
use shipit::pipeline::{Pipeline, Services, default_stages};
use shipit::project::types::{BuildContext, CommandType};
use shipit::prompt::TerminalPrompter;
use shipit::shell::ProcessRunner;
use shipit::version::registries::NexusClient;

#[derive(Parser)]
#[command(name = "shipit")]
#[command(version, about = "Build, publish and deploy the project in the current directory")]
#[command(group(ArgGroup::new("mode").multiple(false)))]
struct Cli {
    /// Validate, build, publish, containerize, deploy and tag
    #[arg(long, group = "mode")]
    full_build: bool,

    /// Only build and push the Docker image
    #[arg(long, group = "mode")]
    docker_only: bool,

    /// Only deploy to Kubernetes
    #[arg(long, group = "mode")]
    kubernetes_only: bool,

    /// Only apply Terraform
    #[arg(long, group = "mode")]
    terraform_only: bool,

    /// Project directory
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Config file (defaults to $XDG_CONFIG_HOME/shipit/config.json)
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn command_type(&self) -> CommandType {
        match (
            self.full_build,
            self.docker_only,
            self.kubernetes_only,
            self.terraform_only,
        ) {
            (true, _, _, _) => CommandType::FullBuild,
            (_, true, _, _) => CommandType::DockerOnly,
            (_, _, true, _) => CommandType::KubernetesOnly,
            (_, _, _, true) => CommandType::TerraformOnly,
            _ => CommandType::Unknown,
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_file = cli.config.clone().unwrap_or_else(config_path);
    let config = Config::load(&config_file)
        .with_context(|| format!("Failed to load config from {}", config_file.display()))?;

    let registry = NexusClient::from_config(&config.nexus).context("Failed to create Nexus client")?;
    let pipeline = Pipeline::new(default_stages(&config));
    let services = Services::new(
        config,
        Arc::new(registry),
        Arc::new(ProcessRunner),
        Arc::new(TerminalPrompter),
        maven_repository_dir(),
    );

    let working_dir = cli
        .dir
        .canonicalize()
        .with_context(|| format!("Project directory {} not found", cli.dir.display()))?;
    let context = pipeline
        .run(BuildContext::new(cli.command_type(), working_dir), &services)
        .await?;

    tracing::info!(
        "Done: {} {}",
        context.project_info.name,
        context.project_info.version
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(&LoggingConfig::from_env()).context("Failed to initialize logging")?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}
