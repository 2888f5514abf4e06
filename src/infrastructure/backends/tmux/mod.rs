//! tmux status-bar backend
//!
//! Colors the status bar per notification type and can flash a message or
//! set the terminal title. While turned on, a [`Session`] holds the values
//! the status bar had before, and turning off restores them.

mod client;
mod session;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use crate::application::ports::{Backend, BackendError, BackendFactory, CommandRunner};
use crate::domain::notification::NotifyOptions;

use super::base::{fill_placeholders, first_line, BackendOptions};
use super::context::BackendContext;

pub use client::{parse_options, Client, Target, TmuxVersion, MIN_VERSION};
pub use session::{Session, TRACKED_OPTIONS};

pub const NAME: &str = "tmux";

fn defaults() -> NotifyOptions {
    NotifyOptions::new()
        .with("tmux_environment", "TMUX")
        .with("success", "green")
        .with("failed", "red")
        .with("pending", "yellow")
        .with("default", "green")
        .with("timeout", 5)
        .with("display_message", false)
        .with("default_message_format", "%s - %s")
        .with("default_message_color", "white")
        .with("display_on_all_clients", false)
        .with("display_title", false)
        .with("default_title_format", "%s - %s")
        .with("line_separator", " - ")
        .with("change_color", true)
        .with("color_location", json!("status-left-bg"))
}

/// Status-bar notifier for tmux
pub struct TmuxBackend {
    runner: Arc<dyn CommandRunner>,
    options: BackendOptions,
    session: Option<Session>,
}

impl TmuxBackend {
    /// Fails unless running inside tmux with a supported version
    pub async fn new(ctx: &BackendContext, options: &NotifyOptions) -> Result<Self, BackendError> {
        let options = BackendOptions::new(defaults(), options, ctx.images_dir());

        let marker = options
            .configured()
            .get_text("tmux_environment")
            .unwrap_or_else(|| "TMUX".to_string());
        if ctx.env(&marker).is_none() {
            return Err(BackendError::Unavailable(
                "tmux notifier is only available inside a TMux session.".to_string(),
            ));
        }

        let version = Client::version(ctx.runner().as_ref()).await?;
        if version < MIN_VERSION {
            return Err(BackendError::Unavailable(format!(
                "Your tmux version is way too old ({})!",
                version
            )));
        }

        Ok(Self {
            runner: ctx.runner().clone(),
            options,
            session: None,
        })
    }

    pub fn is_on(&self) -> bool {
        self.session.is_some()
    }

    async fn display_title(
        &self,
        client: &Client,
        kind: &str,
        title: &str,
        message: &str,
        opts: &NotifyOptions,
    ) -> Result<(), BackendError> {
        let format = per_type(opts, kind, "title_format");
        client
            .set_title(&fill_placeholders(&format, &[title, first_line(message)]))
            .await
    }

    async fn display_message(
        &self,
        client: &Client,
        kind: &str,
        title: &str,
        message: &str,
        opts: &NotifyOptions,
    ) -> Result<(), BackendError> {
        let format = per_type(opts, kind, "message_format");
        let separator = opts.get_text("line_separator").unwrap_or_default();
        let body = message.lines().collect::<Vec<_>>().join(&separator);

        let timeout = opts.get_f64("timeout").unwrap_or(5.0);
        client
            .set_display_time((timeout * 1000.0).round().max(0.0) as u64)
            .await?;
        client
            .set_message_fg(&per_type(opts, kind, "message_color"))
            .await?;
        client.set_message_bg(&color_for(opts, kind)).await?;
        client
            .display_message(&fill_placeholders(&format, &[title, &body]))
            .await
    }
}

/// `<type>_<suffix>`, falling back to `default_<suffix>`
fn per_type(opts: &NotifyOptions, kind: &str, suffix: &str) -> String {
    opts.get_text(&format!("{}_{}", kind, suffix))
        .or_else(|| opts.get_text(&format!("default_{}", suffix)))
        .unwrap_or_default()
}

/// Color option named after the type, falling back to `default`
fn color_for(opts: &NotifyOptions, kind: &str) -> String {
    opts.get_text(kind)
        .or_else(|| opts.get_text("default"))
        .unwrap_or_default()
}

#[async_trait]
impl Backend for TmuxBackend {
    fn title(&self) -> &str {
        "Tmux"
    }

    fn reconfigure(&mut self, options: NotifyOptions) {
        self.options.reconfigure(options);
    }

    async fn notify(&self, message: &str, options: &NotifyOptions) -> Result<(), BackendError> {
        let opts = self.options.for_notify(options);
        let kind = opts.notification_type();
        let kind = kind.as_str();
        let title = opts.get_text("title").unwrap_or_default();

        let target = if opts.is_set("display_on_all_clients") {
            Target::All
        } else {
            Target::Current
        };
        let client = Client::new(self.runner.clone(), target);

        if opts.get_bool("change_color") != Some(false) {
            let color = color_for(&opts, kind);
            for location in opts.get_list("color_location") {
                client.set(&location, &color).await?;
            }
        }

        if opts.is_set("display_title") {
            self.display_title(&client, kind, &title, message, &opts)
                .await?;
        }

        if opts.is_set("display_message") {
            self.display_message(&client, kind, &title, message, &opts)
                .await?;
        }

        Ok(())
    }

    async fn turn_on(&mut self) -> Result<(), BackendError> {
        if self.session.is_some() {
            return Err(BackendError::AlreadyOn);
        }
        let locations = self.options.configured().get_list("color_location");
        self.session = Some(Session::start(self.runner.clone(), &locations).await);
        Ok(())
    }

    async fn turn_off(&mut self) -> Result<(), BackendError> {
        let session = self.session.take().ok_or(BackendError::AlreadyOff)?;
        session.close().await
    }
}

/// Builds [`TmuxBackend`]s
pub struct TmuxFactory {
    ctx: BackendContext,
}

impl TmuxFactory {
    pub fn new(ctx: BackendContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl BackendFactory for TmuxFactory {
    fn name(&self) -> &str {
        NAME
    }

    async fn create(&self, options: &NotifyOptions) -> Result<Box<dyn Backend>, BackendError> {
        Ok(Box::new(TmuxBackend::new(&self.ctx, options).await?))
    }
}
