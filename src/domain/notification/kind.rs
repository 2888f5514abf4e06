//! Notification type value object

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The event a notification reports.
///
/// Backends key their per-type options (colors, formats) on [`as_str`],
/// so custom types behave exactly like the built-in ones.
///
/// [`as_str`]: NotificationType::as_str
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NotificationType {
    Success,
    Failed,
    Pending,
    #[default]
    Notify,
    Custom(String),
}

impl NotificationType {
    /// Get the string identifier for this type
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Pending => "pending",
            Self::Notify => "notify",
            Self::Custom(name) => name,
        }
    }

    /// Type implied by an image token: the three status images map to
    /// themselves, everything else is a plain notification.
    pub fn from_image_token(token: &str) -> Self {
        match token {
            "success" => Self::Success,
            "failed" => Self::Failed,
            "pending" => Self::Pending,
            _ => Self::Notify,
        }
    }

    /// Capitalized form used in generated titles ("Success", "Failed")
    pub fn label(&self) -> String {
        let s = self.as_str();
        let mut chars = s.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl FromStr for NotificationType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "success" => Self::Success,
            "failed" => Self::Failed,
            "pending" => Self::Pending,
            "notify" => Self::Notify,
            other => Self::Custom(other.to_string()),
        })
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for NotificationType {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(kind) => kind,
            Err(never) => match never {},
        }
    }
}
