//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with tmux, emacsclient, notify-send, D-Bus and the
//! process environment.

pub mod backends;
pub mod config;
pub mod process;
pub mod state;

// Re-export adapters
pub use backends::{default_registry, BackendContext};
pub use config::XdgConfigStore;
pub use process::TokioCommandRunner;
pub use state::{EnvStateStore, MemoryStateStore};
