//! XDG config store adapter

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::NotifierConfig;
use crate::domain::error::ConfigError;

/// XDG-compliant config store
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    /// Create a new XDG config store with default path
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("alertcast");

        Self {
            path: config_dir.join("config.toml"),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse TOML content into NotifierConfig
    fn parse_toml(content: &str) -> Result<NotifierConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize NotifierConfig to TOML
    fn to_toml(config: &NotifierConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(config).map_err(|e| ConfigError::WriteError(e.to_string()))
    }

    /// Reject values the notifier cannot act on.
    ///
    /// Backend names are snake_case identifiers and the namespace ends up
    /// in environment variable names, so both are checked here rather
    /// than at connect time.
    fn validate(config: NotifierConfig) -> Result<NotifierConfig, ConfigError> {
        if let Some(namespace) = &config.namespace {
            if !is_identifier(namespace) {
                return Err(ConfigError::ValidationError {
                    key: "namespace".to_string(),
                    message: "Namespace must contain only letters, digits and '_'".to_string(),
                });
            }
        }

        for name in config.notifiers.iter().flat_map(|n| n.keys()) {
            let snake_case = is_identifier(name)
                && !name.starts_with(|c: char| c.is_ascii_digit())
                && !name.contains(|c: char| c.is_ascii_uppercase());
            if !snake_case {
                return Err(ConfigError::ValidationError {
                    key: format!("notifiers.{}", name),
                    message: "Notifier names are lowercase snake_case".to_string(),
                });
            }
        }

        Ok(config)
    }
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<NotifierConfig, ConfigError> {
        if !self.exists() {
            // Return empty config if file doesn't exist
            return Ok(NotifierConfig::empty());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        Self::parse_toml(&content).and_then(Self::validate)
    }

    async fn save(&self, config: &NotifierConfig) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let config = Self::validate(config.clone())?;
        let content = Self::to_toml(&config)?;

        fs::write(&self.path, content)
            .await
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(
                self.path.to_string_lossy().to_string(),
            ));
        }

        let defaults = NotifierConfig::defaults();
        self.save(&defaults).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::{BackendSetting, Switch};
    use crate::domain::notification::NotifyOptions;
    use indexmap::IndexMap;
    use tempfile::TempDir;

    #[test]
    fn default_path_is_xdg() {
        let store = XdgConfigStore::new();
        let path = store.path();
        assert!(path.to_string_lossy().contains("alertcast"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn custom_path() {
        let store = XdgConfigStore::with_path("/custom/path/config.toml");
        assert_eq!(store.path(), PathBuf::from("/custom/path/config.toml"));
    }

    #[test]
    fn parse_toml_with_notifier_table() {
        let content = r#"
notify = true
namespace = "guard"

[notifiers]
terminal_title = "off"

[notifiers.tmux]
display_message = true
color_location = ["status-left-bg", "pane-border-fg"]
"#;

        let config = XdgConfigStore::parse_toml(content).unwrap();
        assert_eq!(config.notify, Some(true));
        assert_eq!(config.namespace, Some("guard".to_string()));

        let notifiers = config.notifiers.unwrap();
        assert!(notifiers["terminal_title"].is_off());
        match &notifiers["tmux"] {
            BackendSetting::Options(options) => {
                assert_eq!(options.get_bool("display_message"), Some(true));
                assert_eq!(options.get_list("color_location").len(), 2);
            }
            other => panic!("expected options, got {:?}", other),
        }
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = XdgConfigStore::parse_toml("notify = [").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn to_toml_round_trip() {
        let mut notifiers = IndexMap::new();
        notifiers.insert("emacs".to_string(), BackendSetting::Switch(Switch::Off));
        notifiers.insert(
            "file".to_string(),
            BackendSetting::Options(NotifyOptions::new().with("path", "/tmp/status")),
        );
        let config = NotifierConfig {
            silent: Some(true),
            notifiers: Some(notifiers),
            ..Default::default()
        };

        let toml = XdgConfigStore::to_toml(&config).unwrap();
        let parsed = XdgConfigStore::parse_toml(&toml).unwrap();

        assert_eq!(config, parsed);
    }

    #[test]
    fn validate_accepts_snake_case_notifiers() {
        let config = XdgConfigStore::parse_toml(
            r#"
namespace = "guard_2"

[notifiers]
terminal_title = "off"
notify_send = {}
"#,
        )
        .unwrap();

        assert!(XdgConfigStore::validate(config).is_ok());
    }

    #[test]
    fn validate_rejects_bad_notifier_names() {
        for name in ["Tmux", "notify-send", "2tmux", "\"\""] {
            let content = format!("[notifiers]\n{} = \"off\"\n", name);
            let config = XdgConfigStore::parse_toml(&content).unwrap();

            match XdgConfigStore::validate(config) {
                Err(ConfigError::ValidationError { key, .. }) => {
                    assert!(key.starts_with("notifiers."), "{}", key)
                }
                other => panic!("{} should be rejected, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn validate_rejects_namespace_unusable_in_env_names() {
        let config = XdgConfigStore::parse_toml(r#"namespace = "my guard""#).unwrap();
        assert!(matches!(
            XdgConfigStore::validate(config),
            Err(ConfigError::ValidationError { key, .. }) if key == "namespace"
        ));
    }

    #[tokio::test]
    async fn load_reports_invalid_notifier_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[notifiers.Emacs]\nclient = \"emacsclient\"\n").unwrap();
        let store = XdgConfigStore::with_path(&path);

        let err = store.load().await.unwrap_err();
        assert!(err.to_string().contains("notifiers.Emacs"));
    }

    #[tokio::test]
    async fn save_refuses_invalid_config() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let mut notifiers = IndexMap::new();
        notifiers.insert("tmux-client".to_string(), BackendSetting::Switch(Switch::Off));
        let config = NotifierConfig {
            notifiers: Some(notifiers),
            ..Default::default()
        };

        assert!(store.save(&config).await.is_err());
        assert!(!store.exists());
    }

    #[tokio::test]
    async fn init_writes_defaults_once() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("alertcast").join("config.toml"));

        assert_eq!(store.load().await.unwrap(), NotifierConfig::empty());

        store.init().await.unwrap();
        assert!(store.exists());
        assert_eq!(store.load().await.unwrap(), NotifierConfig::defaults());

        assert!(matches!(
            store.init().await,
            Err(ConfigError::AlreadyExists(_))
        ));
    }
}
