//! Domain layer - Core notification model
//!
//! Contains value objects, the persisted notifier state, configuration
//! and domain errors. This layer has no dependencies on external systems.

pub mod config;
pub mod error;
pub mod notification;
pub mod state;

// Re-export common types
pub use config::{BackendSetting, NotifierConfig, Switch};
pub use error::*;
pub use notification::{NotificationType, NotifyOptions};
pub use state::{BackendDescriptor, NotifierState};
