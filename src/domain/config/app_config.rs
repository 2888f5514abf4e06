//! Notifier configuration value object

use indexmap::IndexMap;

use serde::{Deserialize, Serialize};

use crate::domain::notification::NotifyOptions;

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "alertcast";

/// Prefix of the environment variables read by [`NotifierConfig::from_env_lookup`]
pub const ENV_PREFIX: &str = "ALERTCAST";

/// Marker that disables a backend instead of configuring it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Switch {
    Off,
}

/// Per-backend entry of the explicit `notifiers` table.
///
/// In TOML either `tmux = "off"` or `[notifiers.tmux]` with option keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BackendSetting {
    Switch(Switch),
    Options(NotifyOptions),
}

impl BackendSetting {
    pub fn is_off(&self) -> bool {
        matches!(self, Self::Switch(Switch::Off))
    }
}

/// Notifier configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub notify: Option<bool>,
    pub silent: Option<bool>,
    pub namespace: Option<String>,
    pub notifiers: Option<IndexMap<String, BackendSetting>>,
}

impl NotifierConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            notify: Some(true),
            silent: Some(false),
            namespace: Some(DEFAULT_NAMESPACE.to_string()),
            notifiers: None,
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this; the
    /// `notifiers` tables are merged entry by entry.
    pub fn merge(self, other: Self) -> Self {
        Self {
            notify: other.notify.or(self.notify),
            silent: other.silent.or(self.silent),
            namespace: other.namespace.or(self.namespace),
            notifiers: Self::merge_notifiers(self.notifiers, other.notifiers),
        }
    }

    fn merge_notifiers(
        base: Option<IndexMap<String, BackendSetting>>,
        other: Option<IndexMap<String, BackendSetting>>,
    ) -> Option<IndexMap<String, BackendSetting>> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(mut b), Some(o)) => {
                b.extend(o);
                Some(b)
            }
        }
    }

    /// Build the environment layer from a variable lookup.
    ///
    /// Reads `ALERTCAST_NOTIFY`, `ALERTCAST_SILENT` and `ALERTCAST_NAMESPACE`;
    /// unparsable booleans are ignored.
    pub fn from_env_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let flag = |suffix: &str| {
            lookup(&format!("{}_{}", ENV_PREFIX, suffix)).and_then(|v| parse_flag(&v))
        };

        Self {
            notify: flag("NOTIFY"),
            silent: flag("SILENT"),
            namespace: lookup(&format!("{}_NAMESPACE", ENV_PREFIX))
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            notifiers: None,
        }
    }

    /// Get notify setting, or true if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(true)
    }

    /// Get silent setting, or false if not set
    pub fn silent_or_default(&self) -> bool {
        self.silent.unwrap_or(false)
    }

    /// Get namespace, or "alertcast" if not set
    pub fn namespace_or_default(&self) -> &str {
        self.namespace.as_deref().unwrap_or(DEFAULT_NAMESPACE)
    }

    /// Explicitly configured backends, if any were given
    pub fn explicit_notifiers(&self) -> Option<&IndexMap<String, BackendSetting>> {
        self.notifiers.as_ref().filter(|n| !n.is_empty())
    }

    /// A notifier entry literally named `off` switches every backend off
    pub fn all_notifiers_off(&self) -> bool {
        self.notifiers
            .as_ref()
            .is_some_and(|n| n.contains_key("off"))
    }
}

/// Parse a boolean flag the way config values are written by hand
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
