//! notify-send backend

use async_trait::async_trait;

use crate::application::ports::{Backend, BackendError, BackendFactory, ShellCommand};
use crate::domain::notification::NotifyOptions;

use super::base::{check_host, urgency_for, BackendOptions, FREEDESKTOP_HOSTS};
use super::context::BackendContext;

pub const NAME: &str = "notify_send";

const PROGRAM: &str = "notify-send";

/// Option keys passed through as `-<key> <value>`, in this order
const FLAGS: &[&str] = &["u", "t", "a", "i", "c", "h"];

fn defaults() -> NotifyOptions {
    NotifyOptions::new()
        .with("t", 3000)
        .with("h", "int:transient:1")
}

/// Desktop popups through the `notify-send` executable
pub struct NotifySendBackend {
    ctx: BackendContext,
    options: BackendOptions,
}

impl NotifySendBackend {
    pub async fn new(ctx: &BackendContext, options: &NotifyOptions) -> Result<Self, BackendError> {
        check_host(NAME, ctx.os(), FREEDESKTOP_HOSTS)?;
        if !ctx.runner().has_executable(PROGRAM).await {
            return Err(BackendError::Unavailable(format!(
                "Unable to find {}",
                PROGRAM
            )));
        }

        Ok(Self {
            ctx: ctx.clone(),
            options: BackendOptions::new(defaults(), options, ctx.images_dir()),
        })
    }

    fn command(&self, message: &str, overrides: &NotifyOptions) -> ShellCommand {
        let mut opts = self.options.for_notify(overrides);
        if !opts.is_set("i") {
            if let Some(image) = opts.get_text("image") {
                opts.insert("i", image);
            }
        }
        if !opts.is_set("u") {
            opts.insert("u", urgency_for(&opts.notification_type()));
        }

        let mut command = ShellCommand::new(PROGRAM);
        for flag in FLAGS {
            if let Some(value) = opts.get_text(flag) {
                command = command.arg(format!("-{}", flag)).arg(value);
            }
        }
        command
            .arg(opts.get_text("title").unwrap_or_default())
            .arg(message)
    }
}

#[async_trait]
impl Backend for NotifySendBackend {
    fn title(&self) -> &str {
        "NotifySend"
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

pub struct NotifySendFactory {
    ctx: BackendContext,
}

impl NotifySendFactory {
    pub fn new(ctx: BackendContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl BackendFactory for NotifySendFactory {
    fn name(&self) -> &str {
        NAME
    }

    async fn create(&self, options: &NotifyOptions) -> Result<Box<dyn Backend>, BackendError> {
        Ok(Box::new(NotifySendBackend::new(&self.ctx, options).await?))
    }
}
