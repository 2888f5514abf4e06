//! Notifier state storage port interface

use thiserror::Error;

use crate::domain::state::NotifierState;

/// State storage errors
#[derive(Debug, Clone, Error)]
pub enum StateError {
    #[error("Failed to encode notifier state: {0}")]
    Encode(String),

    #[error("Failed to decode notifier state from {key}: {message}")]
    Decode { key: String, message: String },
}

/// Port for the state shared between a connecting process and the
/// processes it spawns.
///
/// Implementations replace the whole record on `save`; readers never see a
/// partially written state.
pub trait StateStore: Send + Sync {
    /// Load the current state (an empty state if nothing was saved)
    fn load(&self) -> Result<NotifierState, StateError>;

    /// Replace the stored state
    fn save(&self, state: &NotifierState) -> Result<(), StateError>;
}
