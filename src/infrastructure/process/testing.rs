//! Scripted command runner for adapter tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::application::ports::{CommandError, CommandOutput, CommandRunner, ShellCommand};

type Responder = Box<dyn Fn(&ShellCommand) -> Option<Result<CommandOutput, CommandError>> + Send + Sync>;

/// Records every command and answers from a list of responders.
///
/// The first responder returning `Some` wins; unmatched commands succeed
/// with empty output.
#[derive(Clone, Default)]
pub struct ScriptedRunner {
    calls: Arc<Mutex<Vec<ShellCommand>>>,
    responders: Arc<Mutex<Vec<Responder>>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands whose display form starts with `prefix`
    pub fn respond(self, prefix: &str, success: bool, stdout: &str) -> Self {
        let prefix = prefix.to_string();
        let stdout = stdout.to_string();
        self.respond_with(move |cmd| {
            cmd.to_string().starts_with(&prefix).then(|| {
                Ok(CommandOutput {
                    success,
                    stdout: stdout.clone(),
                })
            })
        })
    }

    /// Report `program` as missing
    pub fn missing(self, program: &str) -> Self {
        let program = program.to_string();
        self.respond_with(move |cmd| {
            (cmd.program == program).then(|| Err(CommandError::NotFound(program.clone())))
        })
    }

    pub fn respond_with<F>(self, responder: F) -> Self
    where
        F: Fn(&ShellCommand) -> Option<Result<CommandOutput, CommandError>> + Send + Sync + 'static,
    {
        self.responders.lock().unwrap().push(Box::new(responder));
        self
    }

    pub fn calls(&self) -> Vec<ShellCommand> {
        self.calls.lock().unwrap().clone()
    }

    /// Display form of every recorded command
    pub fn lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn output(&self, command: &ShellCommand) -> Result<CommandOutput, CommandError> {
        self.calls.lock().unwrap().push(command.clone());
        let responders = self.responders.lock().unwrap();
        responders
            .iter()
            .find_map(|respond| respond(command))
            .unwrap_or_else(|| {
                Ok(CommandOutput {
                    success: true,
                    stdout: String::new(),
                })
            })
    }
}
