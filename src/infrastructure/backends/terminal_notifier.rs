//! macOS Notification Center backend through terminal-notifier

use async_trait::async_trait;

use crate::application::ports::{Backend, BackendError, BackendFactory, ShellCommand};
use crate::domain::notification::NotifyOptions;

use super::base::{check_host, BackendOptions, DEFAULT_TITLE};
use super::context::BackendContext;

pub const NAME: &str = "terminal_notifier";

const PROGRAM: &str = "terminal-notifier";

pub struct TerminalNotifierBackend {
    ctx: BackendContext,
    options: BackendOptions,
}

impl TerminalNotifierBackend {
    pub async fn new(ctx: &BackendContext, options: &NotifyOptions) -> Result<Self, BackendError> {
        check_host(NAME, ctx.os(), &["macos"])?;
        if !ctx.runner().has_executable(PROGRAM).await {
            return Err(BackendError::Unavailable(format!(
                "Unable to find {}",
                PROGRAM
            )));
        }

        Ok(Self {
            ctx: ctx.clone(),
            options: BackendOptions::new(NotifyOptions::new(), options, ctx.images_dir()),
        })
    }

    fn command(&self, message: &str, overrides: &NotifyOptions) -> ShellCommand {
        let opts = self.options.for_notify(overrides);
        let app_name = opts
            .get_text("app_name")
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        // A title explicitly set to null falls back to "<app> <Type>"
        let title = opts
            .get_text("title")
            .unwrap_or_else(|| format!("{} {}", app_name, opts.notification_type().label()));

        let mut command = ShellCommand::new(PROGRAM)
            .args(["-title", title.as_str()])
            .args(["-message", message])
            .args(["-group", app_name.as_str()]);
        if let Some(bundle) = opts.get_text("activate") {
            command = command.args(["-activate", bundle.as_str()]);
        }
        if let Some(image) = opts.get_text("image") {
            command = command.args(["-appIcon", image.as_str()]);
        }
        command
    }
}

#[async_trait]
impl Backend for TerminalNotifierBackend {
    fn title(&self) -> &str {
        "TerminalNotifier"
    }

    fn reconfigure(&mut self, options: NotifyOptions) {
        self.options.reconfigure(options);
    }

    async fn notify(&self, message: &str, options: &NotifyOptions) -> Result<(), BackendError> {
        self.ctx
            .runner()
            .run(&self.command(message, options))
            .await?;
        Ok(())
    }
}

pub struct TerminalNotifierFactory {
    ctx: BackendContext,
}

impl TerminalNotifierFactory {
    pub fn new(ctx: BackendContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl BackendFactory for TerminalNotifierFactory {
    fn name(&self) -> &str {
        NAME
    }

    async fn create(&self, options: &NotifyOptions) -> Result<Box<dyn Backend>, BackendError> {
        Ok(Box::new(TerminalNotifierBackend::new(&self.ctx, options).await?))
    }
}
