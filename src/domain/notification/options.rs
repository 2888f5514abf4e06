//! Notification options value object
//!
//! Options are a loosely-typed string-keyed map because every backend
//! reads its own keys (`success`, `color_location`, `t`, `path`, ...).
//! Values are JSON values so the map round-trips through the persisted
//! state and through TOML config tables unchanged.

use std::collections::btree_map::{self, BTreeMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::OptionParseError;

use super::kind::NotificationType;

/// Image tokens resolved to bundled image files
pub const IMAGE_TOKENS: &[&str] = &["success", "failed", "pending"];

/// Environment variable pointing at an installed images directory
pub const IMAGES_DIR_ENV: &str = "ALERTCAST_IMAGES_DIR";

/// Directory holding the bundled status images.
///
/// This is the `images/` directory of the source tree the binary was
/// built from; an installed binary without that tree needs
/// [`IMAGES_DIR_ENV`] set, see [`images_dir_from`].
pub fn default_images_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("images")
}

/// Images directory from [`IMAGES_DIR_ENV`], falling back to the bundled one
pub fn images_dir_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup(IMAGES_DIR_ENV)
        .filter(|dir| !dir.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(default_images_dir)
}

/// String-keyed notification options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotifyOptions(BTreeMap<String, Value>);

impl NotifyOptions {
    /// Create an empty option map
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Get a value only if it is a JSON string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Get a scalar value rendered as text.
    ///
    /// Colors and similar settings may arrive as numbers or booleans from
    /// loosely-typed config, so those are stringified rather than dropped.
    pub fn get_text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Get a value only if it is a JSON boolean
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Get a numeric value (numeric strings are accepted)
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Whether a flag is set: present, not null and not `false`
    pub fn is_set(&self, key: &str) -> bool {
        !matches!(self.0.get(key), None | Some(Value::Null) | Some(Value::Bool(false)))
    }

    /// Get a value that may be a single string or a list of strings
    pub fn get_list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Merge with another map, where `overrides` takes precedence.
    pub fn merge(&self, overrides: &NotifyOptions) -> NotifyOptions {
        let mut merged = self.clone();
        merged
            .0
            .extend(overrides.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    /// Notification type carried by the `type` key (defaults to `notify`)
    pub fn notification_type(&self) -> NotificationType {
        self.get_text("type")
            .map(|t| NotificationType::from(t.as_str()))
            .unwrap_or_default()
    }

    /// Fill in `type` and `image` before the map is handed to a backend.
    ///
    /// - `image` defaults to the `success` token; an explicit null stays null
    /// - a missing `type` is derived from the image token
    /// - status image tokens become paths under `images_dir`
    pub fn resolve(mut self, images_dir: &Path) -> NotifyOptions {
        let image = match self.0.get("image") {
            None => Some("success".to_string()),
            Some(Value::Null) => None,
            Some(_) => self.get_text("image"),
        };

        if matches!(self.0.get("type"), None | Some(Value::Null)) {
            let kind = image
                .as_deref()
                .map(NotificationType::from_image_token)
                .unwrap_or_default();
            self.insert("type", kind.as_str());
        }

        let resolved = match image {
            Some(token) if IMAGE_TOKENS.contains(&token.as_str()) => Value::String(
                images_dir
                    .join(format!("{}.png", token))
                    .to_string_lossy()
                    .into_owned(),
            ),
            Some(other) => Value::String(other),
            None => Value::Null,
        };
        self.insert("image", resolved);
        self
    }
}

impl From<BTreeMap<String, Value>> for NotifyOptions {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for NotifyOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<'a> IntoIterator for &'a NotifyOptions {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Parse a `key=value` assignment.
///
/// The value is read as JSON when it parses (`true`, `5`, `["a","b"]`),
/// otherwise it is kept as a plain string.
pub fn parse_option_assignment(input: &str) -> Result<(String, Value), OptionParseError> {
    let (key, raw) = input.split_once('=').ok_or_else(|| OptionParseError {
        input: input.to_string(),
    })?;

    let key = key.trim();
    if key.is_empty() {
        return Err(OptionParseError {
            input: input.to_string(),
        });
    }

    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
