//! Native desktop popups through notify-rust (libnotify over D-Bus)

use async_trait::async_trait;

use crate::application::ports::{Backend, BackendError, BackendFactory};
use crate::domain::notification::NotifyOptions;

use super::base::{check_host, urgency_for, BackendOptions, DEFAULT_TITLE, FREEDESKTOP_HOSTS};
use super::context::BackendContext;

pub const NAME: &str = "libnotify";

fn defaults() -> NotifyOptions {
    NotifyOptions::new().with("timeout", 3)
}

/// What one popup shows, extracted from the effective options
#[cfg_attr(not(feature = "desktop"), allow(dead_code))]
#[derive(Debug, Clone, PartialEq)]
struct Popup {
    app_name: String,
    summary: String,
    body: String,
    icon: Option<String>,
    timeout_ms: u32,
    urgency: String,
}

impl Popup {
    fn from_options(message: &str, opts: &NotifyOptions) -> Self {
        let urgency = opts
            .get_text("urgency")
            .unwrap_or_else(|| urgency_for(&opts.notification_type()).to_string());
        let timeout = opts.get_f64("timeout").unwrap_or(3.0);

        Self {
            app_name: opts
                .get_text("app_name")
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            summary: opts.get_text("title").unwrap_or_default(),
            body: message.to_string(),
            icon: opts.get_text("image"),
            timeout_ms: (timeout * 1000.0).round().clamp(0.0, u32::MAX as f64) as u32,
            urgency,
        }
    }
}

pub struct LibnotifyBackend {
    options: BackendOptions,
}

impl LibnotifyBackend {
    pub fn new(ctx: &BackendContext, options: &NotifyOptions) -> Result<Self, BackendError> {
        check_host(NAME, ctx.os(), FREEDESKTOP_HOSTS)?;
        if !cfg!(feature = "desktop") {
            return Err(BackendError::RequireFailed("notify-rust".to_string()));
        }
        if ctx.os() == "linux" && ctx.env("DBUS_SESSION_BUS_ADDRESS").is_none() {
            return Err(BackendError::Unavailable(
                "No D-Bus session bus (DBUS_SESSION_BUS_ADDRESS is not set)".to_string(),
            ));
        }

        Ok(Self {
            options: BackendOptions::new(defaults(), options, ctx.images_dir()),
        })
    }
}

#[cfg(feature = "desktop")]
async fn show(popup: Popup) -> Result<(), BackendError> {
    // notify-rust blocks on D-Bus, so run in spawn_blocking
    tokio::task::spawn_blocking(move || {
        let mut notification = notify_rust::Notification::new();
        notification
            .appname(&popup.app_name)
            .summary(&popup.summary)
            .body(&popup.body)
            .timeout(notify_rust::Timeout::Milliseconds(popup.timeout_ms));
        if let Some(icon) = &popup.icon {
            notification.icon(icon);
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        notification.urgency(match popup.urgency.as_str() {
            "critical" => notify_rust::Urgency::Critical,
            "normal" => notify_rust::Urgency::Normal,
            _ => notify_rust::Urgency::Low,
        });

        notification
            .show()
            .map_err(|e| BackendError::NotifyFailed(e.to_string()))?;
        Ok(())
    })
    .await
    .map_err(|e| BackendError::NotifyFailed(format!("Task join error: {}", e)))?
}

#[cfg(not(feature = "desktop"))]
async fn show(_popup: Popup) -> Result<(), BackendError> {
    Err(BackendError::RequireFailed("notify-rust".to_string()))
}

#[async_trait]
impl Backend for LibnotifyBackend {
    fn title(&self) -> &str {
        "Libnotify"
    }

    fn reconfigure(&mut self, options: NotifyOptions) {
        self.options.reconfigure(options);
    }

    async fn notify(&self, message: &str, options: &NotifyOptions) -> Result<(), BackendError> {
        let opts = self.options.for_notify(options);
        show(Popup::from_options(message, &opts)).await
    }
}

pub struct LibnotifyFactory {
    ctx: BackendContext,
}

impl LibnotifyFactory {
    pub fn new(ctx: BackendContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl BackendFactory for LibnotifyFactory {
    fn name(&self) -> &str {
        NAME
    }

    async fn create(&self, options: &NotifyOptions) -> Result<Box<dyn Backend>, BackendError> {
        Ok(Box::new(LibnotifyBackend::new(&self.ctx, options)?))
    }
}
