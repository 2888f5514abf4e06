//! Application layer - Use cases and port interfaces
//!
//! Contains the detector and the notifier facade, plus the trait
//! definitions for backends, state storage and external commands.

pub mod detector;
pub mod error;
pub mod notifier;
pub mod ports;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

// Re-export use cases
pub use detector::{BackendInstance, Detector};
pub use error::NotifierError;
pub use notifier::{BackendSummary, Notifier, PidSource, TurnOnOptions};
pub use registry::Registry;
