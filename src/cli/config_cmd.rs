//! Config command handler

use indexmap::IndexMap;

use crate::application::ports::ConfigStore;
use crate::domain::config::{parse_flag, BackendSetting, NotifierConfig, Switch};
use crate::domain::error::ConfigError;
use crate::domain::notification::NotifyOptions;

use super::args::{is_valid_config_key, notifier_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    validate_key(key)?;

    let mut config = store.load().await?;
    apply_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    validate_key(key)?;

    let config = store.load().await?;
    match read_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = read_value(&config, key);
        presenter.key_value(key, value.as_deref().unwrap_or(NOT_SET));
    }
    if let Some(notifiers) = &config.notifiers {
        for (name, setting) in notifiers {
            presenter.key_value(&format!("notifiers.{}", name), &format_setting(setting));
        }
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn validate_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!(
            "Unknown key. Valid keys: {}, notifiers.<name>",
            VALID_CONFIG_KEYS.join(", ")
        ),
    })
}

/// Write a validated value into the config
fn apply_value(config: &mut NotifierConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "notify" => config.notify = Some(parse_bool(key, value)?),
        "silent" => config.silent = Some(parse_bool(key, value)?),
        "namespace" => {
            let namespace = value.trim();
            if namespace.is_empty() {
                return Err(ConfigError::ValidationError {
                    key: key.to_string(),
                    message: "Namespace cannot be empty".to_string(),
                });
            }
            config.namespace = Some(namespace.to_string());
        }
        _ => {
            let name = notifier_key(key).ok_or_else(|| ConfigError::ValidationError {
                key: key.to_string(),
                message: "Unknown key".to_string(),
            })?;
            let setting = parse_setting(key, value)?;
            config
                .notifiers
                .get_or_insert_with(IndexMap::new)
                .insert(name.to_string(), setting);
        }
    }
    Ok(())
}

fn read_value(config: &NotifierConfig, key: &str) -> Option<String> {
    match key {
        "notify" => config.notify.map(|b| b.to_string()),
        "silent" => config.silent.map(|b| b.to_string()),
        "namespace" => config.namespace.clone(),
        _ => {
            let name = notifier_key(key)?;
            config
                .notifiers
                .as_ref()
                .and_then(|n| n.get(name))
                .map(format_setting)
        }
    }
}

/// `off` or a JSON object of backend options
fn parse_setting(key: &str, value: &str) -> Result<BackendSetting, ConfigError> {
    if value.trim().eq_ignore_ascii_case("off") {
        return Ok(BackendSetting::Switch(Switch::Off));
    }
    serde_json::from_str::<NotifyOptions>(value)
        .map(BackendSetting::Options)
        .map_err(|_| ConfigError::ValidationError {
            key: key.to_string(),
            message: "Value must be 'off' or a JSON object of options".to_string(),
        })
}

fn format_setting(setting: &BackendSetting) -> String {
    match setting {
        BackendSetting::Switch(Switch::Off) => "off".to_string(),
        BackendSetting::Options(options) => {
            serde_json::to_string(options).unwrap_or_else(|_| "{}".to_string())
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_flag(value).ok_or_else(|| ConfigError::ValidationError {
        key: key.to_string(),
        message: "Value must be 'true' or 'false'".to_string(),
    })
}
