//! Host facilities handed to every backend

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::application::ports::CommandRunner;
use crate::domain::notification::images_dir_from;
use crate::infrastructure::process::TokioCommandRunner;

type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Terminal sink shared by backends that write escape sequences
pub type TerminalSink = Arc<Mutex<dyn Write + Send>>;

/// Everything a backend reads from or writes to outside its own options.
///
/// Backends never touch the process environment, the OS name or stdout
/// directly, so tests can substitute each one.
#[derive(Clone)]
pub struct BackendContext {
    runner: Arc<dyn CommandRunner>,
    env: EnvLookup,
    os: &'static str,
    images_dir: PathBuf,
    terminal: TerminalSink,
}

impl BackendContext {
    /// The real host: tokio processes, process environment, stdout
    pub fn system() -> Self {
        Self::new(Arc::new(TokioCommandRunner::new()))
    }

    /// Real host facilities with a custom command runner
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            runner,
            env: Arc::new(|key| std::env::var(key).ok()),
            os: std::env::consts::OS,
            images_dir: images_dir_from(|key| std::env::var(key).ok()),
            terminal: Arc::new(Mutex::new(io::stdout())),
        }
    }

    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String> + Send + Sync + 'static,
    {
        self.env = Arc::new(lookup);
        self
    }

    pub fn with_os(mut self, os: &'static str) -> Self {
        self.os = os;
        self
    }

    pub fn with_images_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.images_dir = dir.into();
        self
    }

    pub fn with_terminal(mut self, terminal: TerminalSink) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn runner(&self) -> &Arc<dyn CommandRunner> {
        &self.runner
    }

    pub fn env(&self, key: &str) -> Option<String> {
        (self.env)(key)
    }

    pub fn os(&self) -> &'static str {
        self.os
    }

    pub fn images_dir(&self) -> PathBuf {
        self.images_dir.clone()
    }

    pub fn terminal(&self) -> &TerminalSink {
        &self.terminal
    }
}
