//! Persisted notifier state

mod descriptor;

pub use descriptor::{BackendDescriptor, NotifierState};
