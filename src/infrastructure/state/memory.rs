//! In-process state store

use std::sync::{Arc, Mutex};

use crate::application::ports::{StateError, StateStore};
use crate::domain::state::NotifierState;

/// State held in memory.
///
/// Clones share the same record, so several notifiers built from clones of
/// one store behave like a parent and its children.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    state: Arc<Mutex<NotifierState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current record
    pub fn snapshot(&self) -> NotifierState {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<NotifierState, StateError> {
        Ok(self.snapshot())
    }

    fn save(&self, state: &NotifierState) -> Result<(), StateError> {
        *self
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::NotifyOptions;

    #[test]
    fn clones_share_state() {
        let store = MemoryStateStore::new();
        let other = store.clone();

        let mut state = NotifierState::new();
        state.active = true;
        state.upsert("tmux", NotifyOptions::new());
        store.save(&state).unwrap();

        assert_eq!(other.load().unwrap(), state);
    }
}
