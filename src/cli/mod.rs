//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, interrupt handling,
//! and the runners behind each subcommand.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod presenter;
pub mod run_app;
pub mod signals;

// Re-export commonly used types
pub use app::{run_detect, run_notify, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, NotifyArgs, RunArgs};
pub use presenter::Presenter;
pub use run_app::run_command;
