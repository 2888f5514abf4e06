//! Restorable tmux session state

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::ports::{BackendError, CommandRunner};

use super::client::{Client, Target};

/// Attributes recorded for every client whatever the configuration
pub const TRACKED_OPTIONS: &[&str] = &[
    "status-left-bg",
    "status-right-bg",
    "status-left-fg",
    "status-right-fg",
    "message-bg",
    "message-fg",
    "display-time",
    "set-titles-string",
];

/// Pre-notification values of the attributes we may change, per client.
///
/// `None` means the attribute was not set on that client and gets unset
/// again on close.
pub struct Session {
    runner: Arc<dyn CommandRunner>,
    saved: BTreeMap<String, BTreeMap<String, Option<String>>>,
}

impl Session {
    /// Record the current values on every attached client.
    ///
    /// `extra` names attributes beyond [`TRACKED_OPTIONS`], such as the
    /// configured color locations.
    pub async fn start(runner: Arc<dyn CommandRunner>, extra: &[String]) -> Self {
        let mut saved = BTreeMap::new();

        for tty in Client::new(runner.clone(), Target::All).clients().await {
            let current = Client::new(runner.clone(), Target::Tty(tty.clone()))
                .options()
                .await;
            let keys = TRACKED_OPTIONS
                .iter()
                .map(|k| k.to_string())
                .chain(extra.iter().cloned());
            let values: BTreeMap<String, Option<String>> = keys
                .map(|key| {
                    let value = current.get(&key).cloned();
                    (key, value)
                })
                .collect();
            saved.insert(tty, values);
        }

        debug!(clients = saved.len(), "tmux session started");
        Self { runner, saved }
    }

    /// ttys whose state was recorded
    pub fn clients(&self) -> Vec<&str> {
        self.saved.keys().map(String::as_str).collect()
    }

    /// Put every recorded attribute back.
    ///
    /// All attributes are attempted even if some fail; the first failure
    /// is returned.
    pub async fn close(self) -> Result<(), BackendError> {
        let mut first_error = None;

        for (tty, options) in self.saved {
            let client = Client::new(self.runner.clone(), Target::Tty(tty.clone()));
            for (key, value) in options {
                if let Err(e) = client.unset(&key, value.as_deref()).await {
                    warn!(tty = %tty, option = %key, error = %e, "Failed to restore tmux option");
                    first_error.get_or_insert(e);
                }
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
