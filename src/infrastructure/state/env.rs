//! Environment-backed state store
//!
//! The state lives in three variables of the current process so that any
//! program spawned afterwards inherits it, with no coordinator running:
//!
//! - `<NS>_NOTIFY_ACTIVE`: `true` or `false`
//! - `<NS>_NOTIFY_PID`: owner process id, absent when nobody owns the state
//! - `<NS>_NOTIFIERS`: compact JSON array of `{name, options}`

use std::env;

use tracing::debug;

use crate::application::ports::{StateError, StateStore};
use crate::domain::config::parse_flag;
use crate::domain::state::{BackendDescriptor, NotifierState};

/// State store writing to the process environment
#[derive(Debug, Clone)]
pub struct EnvStateStore {
    prefix: String,
}

impl EnvStateStore {
    /// Create a store whose variables are scoped by `namespace`
    pub fn new(namespace: &str) -> Self {
        Self {
            prefix: env_prefix(namespace),
        }
    }

    pub fn active_key(&self) -> String {
        format!("{}_NOTIFY_ACTIVE", self.prefix)
    }

    pub fn pid_key(&self) -> String {
        format!("{}_NOTIFY_PID", self.prefix)
    }

    pub fn notifiers_key(&self) -> String {
        format!("{}_NOTIFIERS", self.prefix)
    }
}

impl StateStore for EnvStateStore {
    fn load(&self) -> Result<NotifierState, StateError> {
        let active = env::var(self.active_key())
            .ok()
            .and_then(|v| parse_flag(&v))
            .unwrap_or(false);

        let owner_pid = env::var(self.pid_key())
            .ok()
            .and_then(|v| v.trim().parse().ok());

        let key = self.notifiers_key();
        let descriptors: Vec<BackendDescriptor> = match env::var(&key) {
            Ok(raw) if !raw.trim().is_empty() => {
                serde_json::from_str(&raw).map_err(|e| StateError::Decode {
                    key: key.clone(),
                    message: e.to_string(),
                })?
            }
            _ => Vec::new(),
        };

        Ok(NotifierState {
            active,
            owner_pid,
            descriptors,
        })
    }

    fn save(&self, state: &NotifierState) -> Result<(), StateError> {
        let notifiers = serde_json::to_string(&state.descriptors)
            .map_err(|e| StateError::Encode(e.to_string()))?;

        env::set_var(self.active_key(), if state.active { "true" } else { "false" });
        match state.owner_pid {
            Some(pid) => env::set_var(self.pid_key(), pid.to_string()),
            None => env::remove_var(self.pid_key()),
        }
        env::set_var(self.notifiers_key(), notifiers);

        debug!(prefix = %self.prefix, active = state.active, "Saved notifier state");
        Ok(())
    }
}

/// Upper-case the namespace and map anything else than `[A-Z0-9]` to `_`
fn env_prefix(namespace: &str) -> String {
    namespace
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::NotifyOptions;

    // Each test uses its own namespace; the environment is process-wide.

    #[test]
    fn prefix_is_sanitized() {
        assert_eq!(env_prefix("alertcast"), "ALERTCAST");
        assert_eq!(env_prefix("my-tool.v2"), "MY_TOOL_V2");
    }

    #[test]
    fn keys_are_namespaced() {
        let store = EnvStateStore::new("guard");
        assert_eq!(store.active_key(), "GUARD_NOTIFY_ACTIVE");
        assert_eq!(store.pid_key(), "GUARD_NOTIFY_PID");
        assert_eq!(store.notifiers_key(), "GUARD_NOTIFIERS");
    }

    #[test]
    fn missing_variables_load_empty_state() {
        let store = EnvStateStore::new("alertcast-test-empty");
        assert_eq!(store.load().unwrap(), NotifierState::new());
    }

    #[test]
    fn save_then_load_restores_state() {
        let store = EnvStateStore::new("alertcast-test-roundtrip");
        let mut state = NotifierState::new();
        state.active = true;
        state.owner_pid = Some(1234);
        state.upsert("tmux", NotifyOptions::new().with("display_message", true));
        state.upsert("file", NotifyOptions::new().with("path", "out"));

        store.save(&state).unwrap();

        assert_eq!(env::var(store.active_key()).unwrap(), "true");
        assert_eq!(env::var(store.pid_key()).unwrap(), "1234");
        assert_eq!(store.load().unwrap(), state);
    }

    #[test]
    fn clearing_owner_removes_pid_variable() {
        let store = EnvStateStore::new("alertcast-test-pid");
        let mut state = NotifierState::new();
        state.owner_pid = Some(7);
        store.save(&state).unwrap();

        state.owner_pid = None;
        store.save(&state).unwrap();

        assert!(env::var(store.pid_key()).is_err());
        assert!(store.load().unwrap().owner_pid.is_none());
    }

    #[test]
    fn malformed_notifiers_fail_to_decode() {
        let store = EnvStateStore::new("alertcast-test-malformed");
        env::set_var(store.notifiers_key(), "{not json");

        let err = store.load().unwrap_err();
        assert!(matches!(err, StateError::Decode { ref key, .. } if key == "ALERTCAST_TEST_MALFORMED_NOTIFIERS"));
    }

    #[test]
    fn descriptors_without_options_decode() {
        let store = EnvStateStore::new("alertcast-test-bare");
        env::set_var(store.notifiers_key(), r#"[{"name":"terminal_title"}]"#);

        let state = store.load().unwrap();
        assert_eq!(state.names(), vec!["terminal_title"]);
        assert!(state.descriptors[0].options.is_empty());
    }
}
