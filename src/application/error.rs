//! Errors surfaced by the detector and the notifier facade

use thiserror::Error;

use super::ports::{BackendError, StateError};

/// Errors from detection and the notifier state machine
#[derive(Debug, Error)]
pub enum NotifierError {
    #[error("Alertcast could not detect any of the supported notification libraries.")]
    NoneAvailable,

    #[error("Unknown notifier: {0}")]
    UnknownBackend(String),

    #[error(
        "Only notify() is allowed from a child process (owner pid: {}, current pid: {current})",
        .owner.map_or_else(|| "none".to_string(), |pid| pid.to_string())
    )]
    NotOwner { owner: Option<u32>, current: u32 },

    #[error("{name}: {source}")]
    Backend {
        name: String,
        #[source]
        source: BackendError,
    },

    #[error(transparent)]
    State(#[from] StateError),
}

impl NotifierError {
    pub(crate) fn backend(name: impl Into<String>, source: BackendError) -> Self {
        Self::Backend {
            name: name.into(),
            source,
        }
    }
}
