//! Runner for the `run` command

use std::process::{ExitCode, ExitStatus};
use std::time::Duration;

use tokio::process::Command;
use tracing::warn;

use crate::application::{Notifier, NotifierError, TurnOnOptions};
use crate::domain::config::NotifierConfig;
use crate::domain::notification::NotifyOptions;

use super::app::{build_notifier, EXIT_ERROR};
use super::args::RunArgs;
use super::presenter::Presenter;
use super::signals::InterruptSignal;

/// How the wrapped command ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Exited(i32),
    /// Killed by a signal, or no exit code available
    Terminated,
    SpawnFailed(String),
}

impl Outcome {
    fn from_status(status: ExitStatus) -> Self {
        status.code().map_or(Self::Terminated, Self::Exited)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }

    /// Our own exit code, mirroring the child's when it fits
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Exited(code) => u8::try_from(*code).unwrap_or(EXIT_ERROR),
            Self::Terminated | Self::SpawnFailed(_) => EXIT_ERROR,
        }
    }

    /// Message and options of the final notification
    pub fn notification(&self, command: &str, interrupted: bool) -> (String, NotifyOptions) {
        let image = if self.is_success() { "success" } else { "failed" };
        let message = match self {
            Self::Exited(0) => format!("{} succeeded", command),
            _ if interrupted => format!("{} was interrupted", command),
            Self::Exited(code) => format!("{} failed with exit code {}", command, code),
            Self::Terminated => format!("{} was terminated", command),
            Self::SpawnFailed(reason) => format!("{} could not be started: {}", command, reason),
        };
        (message, NotifyOptions::new().with("image", image))
    }
}

/// Run `run`: activate notifiers, run the command, report its result
pub async fn run_command(config: NotifierConfig, args: RunArgs) -> ExitCode {
    let presenter = Presenter::new();
    let command_line = args.command.join(" ");

    let mut notifier = build_notifier(config);
    if let Err(e) = activate(&mut notifier).await {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    let interrupt = InterruptSignal::new();
    interrupt.setup();

    let outcome = spawn_and_wait(&args.command).await;
    if let Outcome::SpawnFailed(reason) = &outcome {
        presenter.error(&format!("Failed to run {}: {}", command_line, reason));
    }

    let (message, options) = outcome.notification(&command_line, interrupt.is_interrupted());
    if let Err(e) = notifier.notify(&message, &options).await {
        warn!(error = %e, "Failed to send notification");
    }

    if args.linger > 0 {
        tokio::time::sleep(Duration::from_secs(args.linger)).await;
    }

    if let Err(e) = notifier.turn_off().await {
        presenter.warn(&e.to_string());
    }
    if let Err(e) = notifier.disconnect() {
        warn!(error = %e, "Failed to disconnect notifier");
    }

    ExitCode::from(outcome.exit_code())
}

async fn activate(notifier: &mut Notifier) -> Result<(), NotifierError> {
    notifier.connect().await?;
    notifier.turn_on(TurnOnOptions::default()).await
}

/// Spawn with inherited stdio and environment, so the child sees the
/// notifier state and can call `alertcast notify` itself
async fn spawn_and_wait(command: &[String]) -> Outcome {
    let Some((program, rest)) = command.split_first() else {
        return Outcome::SpawnFailed("empty command".to_string());
    };

    match Command::new(program).args(rest).status().await {
        Ok(status) => Outcome::from_status(status),
        Err(e) => Outcome::SpawnFailed(e.to_string()),
    }
}
