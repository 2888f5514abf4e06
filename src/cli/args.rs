//! CLI argument definitions using Clap

use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value;

use crate::domain::notification::parse_option_assignment;

/// Alertcast - fan status notifications out to every backend on this host
#[derive(Parser, Debug)]
#[command(name = "alertcast")]
#[command(version)]
#[command(about = "Detect available notifiers and send status notifications to them")]
#[command(long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect notifiers and list the ones that would be used
    Detect,
    /// Send one notification
    Notify(NotifyArgs),
    /// Run a command and notify about its result
    Run(RunArgs),
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct NotifyArgs {
    /// Notification message
    pub message: String,

    /// Notification type (success, failed, pending, notify or any custom type)
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub kind: Option<String>,

    /// Notification title
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Image token (success, failed, pending) or path to an image file
    #[arg(long, value_name = "IMAGE")]
    pub image: Option<String>,

    /// Extra backend option, repeatable (e.g., -o display_message=true)
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE", value_parser = parse_option_arg)]
    pub options: Vec<(String, Value)>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RunArgs {
    /// Seconds to keep the notification visible before turning notifiers off
    #[arg(long, value_name = "SECS", default_value_t = 0)]
    pub linger: u64,

    /// Command to run
    #[arg(last = true, required = true, value_name = "CMD")]
    pub command: Vec<String>,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

fn parse_option_arg(input: &str) -> Result<(String, Value), String> {
    parse_option_assignment(input).map_err(|e| e.to_string())
}

/// Valid top-level config keys
pub const VALID_CONFIG_KEYS: &[&str] = &["notify", "silent", "namespace"];

/// Prefix of per-backend config keys (`notifiers.tmux`)
pub const NOTIFIERS_KEY_PREFIX: &str = "notifiers.";

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key) || notifier_key(key).is_some()
}

/// Backend name of a `notifiers.<name>` key
pub fn notifier_key(key: &str) -> Option<&str> {
    key.strip_prefix(NOTIFIERS_KEY_PREFIX)
        .filter(|name| !name.is_empty() && !name.contains('.'))
}
