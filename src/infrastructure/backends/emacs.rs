//! Emacs mode-line backend, driven through emacsclient

use async_trait::async_trait;

use crate::application::ports::{Backend, BackendError, BackendFactory, ShellCommand};
use crate::domain::notification::NotifyOptions;

use super::base::BackendOptions;
use super::context::BackendContext;

pub const NAME: &str = "emacs";

fn defaults() -> NotifyOptions {
    NotifyOptions::new()
        .with("client", "emacsclient")
        .with("success", "ForestGreen")
        .with("failed", "Firebrick")
        .with("default", "Black")
        .with("fontcolor", "White")
}

/// `emacsclient --eval <code>`, never falling back to another editor
fn eval(client: &str, code: &str) -> ShellCommand {
    ShellCommand::new(client)
        .env("ALTERNATE_EDITOR", "false")
        .args(["--eval", code])
}

/// Colors the Emacs mode line per notification type
pub struct EmacsBackend {
    ctx: BackendContext,
    options: BackendOptions,
}

impl EmacsBackend {
    /// Fails unless an Emacs server answers
    pub async fn new(ctx: &BackendContext, options: &NotifyOptions) -> Result<Self, BackendError> {
        let options = BackendOptions::new(defaults(), options, ctx.images_dir());
        let client = options
            .configured()
            .get_text("client")
            .unwrap_or_else(|| "emacsclient".to_string());

        let answered = ctx
            .runner()
            .output(&eval(&client, "1"))
            .await
            .is_ok_and(|output| output.success);
        if !answered {
            return Err(BackendError::Unavailable("Emacs client failed".to_string()));
        }

        Ok(Self {
            ctx: ctx.clone(),
            options,
        })
    }
}

/// Color option named after the type, falling back to `default`
fn emacs_color(opts: &NotifyOptions, key: &str) -> String {
    opts.get_text(key)
        .or_else(|| opts.get_text("default"))
        .unwrap_or_else(|| "Black".to_string())
}

#[async_trait]
impl Backend for EmacsBackend {
    fn title(&self) -> &str {
        "Emacs"
    }

    fn reconfigure(&mut self, options: NotifyOptions) {
        self.options.reconfigure(options);
    }

    async fn notify(&self, _message: &str, options: &NotifyOptions) -> Result<(), BackendError> {
        let opts = self.options.for_notify(options);
        let background = emacs_color(&opts, opts.notification_type().as_str());
        let foreground = emacs_color(&opts, "fontcolor");
        let client = opts
            .get_text("client")
            .unwrap_or_else(|| "emacsclient".to_string());

        let elisp = format!(
            "(set-face-attribute 'mode-line nil :background \"{}\" :foreground \"{}\")",
            background, foreground
        );
        self.ctx.runner().run(&eval(&client, &elisp)).await?;
        Ok(())
    }
}

pub struct EmacsFactory {
    ctx: BackendContext,
}

impl EmacsFactory {
    pub fn new(ctx: BackendContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl BackendFactory for EmacsFactory {
    fn name(&self) -> &str {
        NAME
    }

    async fn create(&self, options: &NotifyOptions) -> Result<Box<dyn Backend>, BackendError> {
        Ok(Box::new(EmacsBackend::new(&self.ctx, options).await?))
    }
}
