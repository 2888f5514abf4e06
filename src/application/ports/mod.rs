//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod backend;
pub mod command;
pub mod config;
pub mod state_store;

// Re-export common types
pub use backend::{backend_name, Backend, BackendError, BackendFactory};
pub use command::{CommandError, CommandOutput, CommandRunner, ShellCommand};
pub use config::ConfigStore;
pub use state_store::{StateError, StateStore};
