//! Terminal window title backend

use std::io::Write;

use async_trait::async_trait;

use crate::application::ports::{Backend, BackendError, BackendFactory};
use crate::domain::notification::NotifyOptions;

use super::base::{check_host, first_line, BackendOptions, UNIX_HOSTS};
use super::context::BackendContext;

pub const NAME: &str = "terminal_title";

/// Writes the notification into the terminal title with an OSC 2 sequence
pub struct TerminalTitleBackend {
    ctx: BackendContext,
    options: BackendOptions,
}

impl TerminalTitleBackend {
    pub fn new(ctx: &BackendContext, options: &NotifyOptions) -> Result<Self, BackendError> {
        check_host(NAME, ctx.os(), UNIX_HOSTS)?;
        Ok(Self {
            ctx: ctx.clone(),
            options: BackendOptions::new(NotifyOptions::new(), options, ctx.images_dir()),
        })
    }

    fn write(&self, sequence: &str) -> Result<(), BackendError> {
        let mut terminal = self
            .ctx
            .terminal()
            .lock()
            .map_err(|_| BackendError::NotifyFailed("terminal lock poisoned".to_string()))?;
        terminal
            .write_all(sequence.as_bytes())
            .and_then(|_| terminal.flush())
            .map_err(|e| BackendError::NotifyFailed(e.to_string()))
    }
}

#[async_trait]
impl Backend for TerminalTitleBackend {
    fn title(&self) -> &str {
        "TerminalTitle"
    }

    fn reconfigure(&mut self, options: NotifyOptions) {
        self.options.reconfigure(options);
    }

    async fn notify(&self, message: &str, options: &NotifyOptions) -> Result<(), BackendError> {
        let opts = self.options.for_notify(options);
        let title = opts.get_text("title").unwrap_or_default();
        self.write(&format!("\x1b]2;[{}] {}\x07", title, first_line(message)))
    }

    async fn turn_off(&mut self) -> Result<(), BackendError> {
        self.write("\x1b]2;\x07")
    }
}

pub struct TerminalTitleFactory {
    ctx: BackendContext,
}

impl TerminalTitleFactory {
    pub fn new(ctx: BackendContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl BackendFactory for TerminalTitleFactory {
    fn name(&self) -> &str {
        NAME
    }

    async fn create(&self, options: &NotifyOptions) -> Result<Box<dyn Backend>, BackendError> {
        Ok(Box::new(TerminalTitleBackend::new(&self.ctx, options)?))
    }
}
