//! External command port interface

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

/// Command errors
#[derive(Debug, Clone, Error)]
pub enum CommandError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Failed to run {program}: {message}")]
    Failed { program: String, message: String },
}

/// A program invocation. Arguments are passed as-is, never through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl ShellCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }
}

impl fmt::Display for ShellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
}

/// Port for running external programs to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command and capture its stdout.
    ///
    /// # Returns
    /// The output on completion (successful or not), `NotFound` if the
    /// program does not exist
    async fn output(&self, command: &ShellCommand) -> Result<CommandOutput, CommandError>;

    /// Stdout of a successful run, `None` if the program is missing or failed
    async fn stdout(&self, command: &ShellCommand) -> Option<String> {
        match self.output(command).await {
            Ok(output) if output.success => Some(output.stdout),
            _ => None,
        }
    }

    /// Run the command, treating a non-zero exit as an error
    async fn run(&self, command: &ShellCommand) -> Result<(), CommandError> {
        let output = self.output(command).await?;
        if !output.success {
            return Err(CommandError::Failed {
                program: command.program.clone(),
                message: format!("{} exited with a failure status", command),
            });
        }
        Ok(())
    }

    /// Whether `program` is on the PATH, probed with `which`
    async fn has_executable(&self, program: &str) -> bool {
        self.stdout(&ShellCommand::new("which").arg(program))
            .await
            .is_some_and(|path| !path.trim().is_empty())
    }
}
