//! Recording stand-ins for the shell and the terminal

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use shipit::config::Config;
use shipit::error::PipelineError;
use shipit::pipeline::Services;
use shipit::prompt::Prompter;
use shipit::shell::{CommandRunner, ShellCommand};

use super::MockRegistry;

/// Records every command line; commands succeed with empty output unless
/// scripted otherwise
#[derive(Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<String>>,
    outputs: Vec<(String, String)>,
    failures: Vec<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands starting with `prefix` print `output`
    pub fn with_output(mut self, prefix: &str, output: &str) -> Self {
        self.outputs.push((prefix.to_string(), output.to_string()));
        self
    }

    /// Commands starting with `prefix` exit with status 1
    pub fn with_failure(mut self, prefix: &str) -> Self {
        self.failures.push(prefix.to_string());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, command: &ShellCommand) -> Result<String, PipelineError> {
        let line = command.to_string();
        self.commands.lock().unwrap().push(line.clone());

        if self.failures.iter().any(|prefix| line.starts_with(prefix)) {
            return Err(PipelineError::ExternalTool {
                command: line,
                code: Some(1),
                stderr: "scripted failure".to_string(),
            });
        }

        Ok(self
            .outputs
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }
}

/// Answers prompts from a script, in order; an exhausted script declines
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<bool>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().copied().collect()),
            questions: Mutex::default(),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prompter for ScriptedPrompter {
    async fn confirm(&self, question: &str) -> Result<bool, PipelineError> {
        self.questions.lock().unwrap().push(question.to_string());
        Ok(self.answers.lock().unwrap().pop_front().unwrap_or(false))
    }
}

/// Services for one run, with the tool self-check disabled
pub fn test_services(
    registry: &Arc<MockRegistry>,
    runner: &Arc<RecordingRunner>,
    prompter: &Arc<ScriptedPrompter>,
    maven_repository: PathBuf,
) -> (Config, Services) {
    let mut config = Config::default();
    config.tool.check_version = false;
    let services = Services::new(
        config.clone(),
        registry.clone(),
        runner.clone(),
        prompter.clone(),
        maven_repository,
    );
    (config, services)
}
