//! Interactive yes/no confirmation

use std::io::Write;

#[cfg(test)]
use mockall::automock;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::PipelineError;

/// The only answer taken as "yes"
const AFFIRMATIVE: &str = "y";

/// Whether a line of user input confirms; anything but `y` declines
pub fn is_affirmative(input: &str) -> bool {
    input.trim() == AFFIRMATIVE
}

#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Prompter: Send + Sync {
    /// Asks `question` and returns true only on an affirmative answer
    async fn confirm(&self, question: &str) -> Result<bool, PipelineError>;
}

/// Prompter reading from the controlling terminal
#[derive(Debug, Default)]
pub struct TerminalPrompter;

#[async_trait::async_trait]
impl Prompter for TerminalPrompter {
    async fn confirm(&self, question: &str) -> Result<bool, PipelineError> {
        {
            let mut stderr = std::io::stderr();
            write!(stderr, "{question} [y/N] ")?;
            stderr.flush()?;
        }

        let mut input = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut input)
            .await?;

        Ok(is_affirmative(&input))
    }
}
