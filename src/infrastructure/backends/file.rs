//! File backend: writes the last notification to a file

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::{Backend, BackendError, BackendFactory};
use crate::domain::notification::NotifyOptions;

use super::base::{fill_placeholders, BackendOptions};
use super::context::BackendContext;

pub const NAME: &str = "file";

fn defaults() -> NotifyOptions {
    NotifyOptions::new().with("format", "%s\n%s\n%s\n")
}

fn missing_path() -> BackendError {
    BackendError::Unavailable("No :path option given".to_string())
}

/// Overwrites `path` with type, title and message on every notification
pub struct FileBackend {
    options: BackendOptions,
}

impl FileBackend {
    pub fn new(ctx: &BackendContext, options: &NotifyOptions) -> Result<Self, BackendError> {
        let options = BackendOptions::new(defaults(), options, ctx.images_dir());
        if options.configured().get_text("path").is_none() {
            return Err(missing_path());
        }
        Ok(Self { options })
    }
}

#[async_trait]
impl Backend for FileBackend {
    fn title(&self) -> &str {
        "File"
    }

    fn reconfigure(&mut self, options: NotifyOptions) {
        self.options.reconfigure(options);
    }

    async fn notify(&self, message: &str, options: &NotifyOptions) -> Result<(), BackendError> {
        let opts = self.options.for_notify(options);
        let path = opts.get_text("path").ok_or_else(missing_path)?;
        let format = opts.get_text("format").unwrap_or_default();
        let kind = opts.notification_type();
        let title = opts.get_text("title").unwrap_or_default();

        let content = fill_placeholders(&format, &[kind.as_str(), &title, message]);
        fs::write(&path, content)
            .await
            .map_err(|e| BackendError::NotifyFailed(format!("{}: {}", path, e)))
    }
}

pub struct FileFactory {
    ctx: BackendContext,
}

impl FileFactory {
    pub fn new(ctx: BackendContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl BackendFactory for FileFactory {
    fn name(&self) -> &str {
        NAME
    }

    async fn create(&self, options: &NotifyOptions) -> Result<Box<dyn Backend>, BackendError> {
        Ok(Box::new(FileBackend::new(&self.ctx, options)?))
    }
}
