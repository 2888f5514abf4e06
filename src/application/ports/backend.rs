//! Notification backend port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::notification::NotifyOptions;

use super::command::CommandError;

/// Backend errors
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("{backend} is not supported on {host}")]
    UnsupportedPlatform { backend: String, host: String },

    #[error("{0}")]
    Unavailable(String),

    #[error("Could not load {0}")]
    RequireFailed(String),

    #[error("Already turned on!")]
    AlreadyOn,

    #[error("Already turned off!")]
    AlreadyOff,

    #[error("Failed to send notification: {0}")]
    NotifyFailed(String),
}

impl BackendError {
    /// Whether this error means "this backend cannot be used on this host".
    ///
    /// Detection skips candidates failing this way and tries the next one.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPlatform { .. } | Self::Unavailable(_) | Self::RequireFailed(_)
        )
    }
}

impl From<CommandError> for BackendError {
    fn from(err: CommandError) -> Self {
        match err {
            CommandError::NotFound(program) => {
                Self::Unavailable(format!("Could not find {}", program))
            }
            CommandError::Failed { .. } => Self::NotifyFailed(err.to_string()),
        }
    }
}

/// Port for a single notification mechanism
#[async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable identifier, e.g. `TerminalTitle`
    fn title(&self) -> &str;

    /// Registry identifier: the title in snake case, e.g. `terminal_title`
    fn name(&self) -> String {
        backend_name(self.title())
    }

    /// Replace the options given at construction time.
    ///
    /// Used when a backend that is already running is configured again;
    /// the instance keeps any open session.
    fn reconfigure(&mut self, options: NotifyOptions);

    /// Deliver a notification.
    ///
    /// # Arguments
    /// * `message` - The notification body
    /// * `options` - Call-time options, layered over the construction options
    async fn notify(&self, message: &str, options: &NotifyOptions) -> Result<(), BackendError>;

    /// Called when notifications are activated
    async fn turn_on(&mut self) -> Result<(), BackendError> {
        Ok(())
    }

    /// Called when notifications are deactivated
    async fn turn_off(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
}

/// Named constructor for a backend.
///
/// `create` validates availability and fails with an error for which
/// [`BackendError::is_unavailable`] holds when the backend cannot run here.
#[async_trait]
pub trait BackendFactory: Send + Sync {
    /// Registry identifier of the backends this factory builds
    fn name(&self) -> &str;

    async fn create(&self, options: &NotifyOptions) -> Result<Box<dyn Backend>, BackendError>;
}

/// Convert a CamelCase title to the snake_case backend name
pub fn backend_name(title: &str) -> String {
    let mut name = String::with_capacity(title.len() + 4);
    let mut prev_lower = false;
    for c in title.chars() {
        if c.is_ascii_uppercase() && prev_lower {
            name.push('_');
        }
        prev_lower = c.is_ascii_lowercase();
        name.push(c.to_ascii_lowercase());
    }
    name
}
