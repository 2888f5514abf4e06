//! Notifier state store adapters

mod env;
mod memory;

pub use env::EnvStateStore;
pub use memory::MemoryStateStore;
