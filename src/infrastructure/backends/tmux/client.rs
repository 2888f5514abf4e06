//! tmux control commands

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::application::ports::{BackendError, CommandRunner, ShellCommand};

const TMUX: &str = "tmux";

/// Oldest tmux release whose `set -q`/`display -c` behave as expected
pub const MIN_VERSION: TmuxVersion = TmuxVersion { major: 1, minor: 9 };

/// Which clients a command is aimed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// The client tmux considers current (no `-t`/`-c` flag)
    Current,
    /// Every attached client
    All,
    /// One client, by tty
    Tty(String),
}

/// `major.minor` of the installed tmux
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TmuxVersion {
    pub major: u32,
    pub minor: u32,
}

impl TmuxVersion {
    /// Find the first `<digits>.<digits>` in `tmux -V` output.
    ///
    /// Suffixes are ignored, so `tmux 3.3a` and `tmux next-3.4` parse.
    pub fn parse(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let mut start = 0;
        while start < bytes.len() {
            if !bytes[start].is_ascii_digit() {
                start += 1;
                continue;
            }
            let major_end = start + digits_len(&bytes[start..]);
            if bytes.get(major_end) == Some(&b'.') {
                let minor_len = digits_len(&bytes[major_end + 1..]);
                if minor_len > 0 {
                    let major = text[start..major_end].parse().ok()?;
                    let minor = text[major_end + 1..major_end + 1 + minor_len].parse().ok()?;
                    return Some(Self { major, minor });
                }
            }
            start = major_end;
        }
        None
    }
}

fn digits_len(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}

impl fmt::Display for TmuxVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Issues tmux commands for one [`Target`]
#[derive(Clone)]
pub struct Client {
    runner: Arc<dyn CommandRunner>,
    target: Target,
}

impl Client {
    pub fn new(runner: Arc<dyn CommandRunner>, target: Target) -> Self {
        Self { runner, target }
    }

    /// Installed tmux version
    pub async fn version(runner: &dyn CommandRunner) -> Result<TmuxVersion, BackendError> {
        let output = runner
            .stdout(&ShellCommand::new(TMUX).arg("-V"))
            .await
            .ok_or_else(|| BackendError::Unavailable("Could not find tmux".to_string()))?;

        TmuxVersion::parse(&output).ok_or_else(|| {
            BackendError::Unavailable(format!(
                "Failed to parse tmux version: {}",
                output.trim()
            ))
        })
    }

    /// ttys of the attached clients; the `(null)` entry of a detached
    /// terminal is dropped
    pub async fn clients(&self) -> Vec<String> {
        let command = ShellCommand::new(TMUX).args(["list-clients", "-F", "#{client_tty}"]);
        self.runner
            .stdout(&command)
            .await
            .unwrap_or_default()
            .lines()
            .map(str::trim)
            .filter(|tty| !tty.is_empty() && *tty != "(null)")
            .map(String::from)
            .collect()
    }

    async fn targets(&self) -> Vec<Option<String>> {
        match &self.target {
            Target::Current => vec![None],
            Target::Tty(tty) => vec![Some(tty.clone())],
            Target::All => self.clients().await.into_iter().map(Some).collect(),
        }
    }

    /// `tmux set -q [-t tty] key value`
    pub async fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        for tty in self.targets().await {
            let mut command = ShellCommand::new(TMUX).args(["set", "-q"]);
            if let Some(tty) = tty {
                command = command.args(["-t", tty.as_str()]);
            }
            self.runner.run(&command.args([key, value])).await?;
        }
        Ok(())
    }

    /// Restore `key` to `value`, or unset it when it had no value
    pub async fn unset(&self, key: &str, value: Option<&str>) -> Result<(), BackendError> {
        if let Some(value) = value {
            return self.set(key, value).await;
        }
        for tty in self.targets().await {
            let mut command = ShellCommand::new(TMUX).args(["set", "-q", "-u"]);
            if let Some(tty) = tty {
                command = command.args(["-t", tty.as_str()]);
            }
            self.runner.run(&command.arg(key)).await?;
        }
        Ok(())
    }

    /// `tmux display [-c tty] message`
    pub async fn display_message(&self, message: &str) -> Result<(), BackendError> {
        for tty in self.targets().await {
            let mut command = ShellCommand::new(TMUX).arg("display");
            if let Some(tty) = tty {
                command = command.args(["-c", tty.as_str()]);
            }
            self.runner.run(&command.arg(message)).await?;
        }
        Ok(())
    }

    pub async fn set_display_time(&self, millis: u64) -> Result<(), BackendError> {
        self.set("display-time", &millis.to_string()).await
    }

    pub async fn set_message_fg(&self, color: &str) -> Result<(), BackendError> {
        self.set("message-fg", color).await
    }

    pub async fn set_message_bg(&self, color: &str) -> Result<(), BackendError> {
        self.set("message-bg", color).await
    }

    pub async fn set_title(&self, title: &str) -> Result<(), BackendError> {
        self.set("set-titles-string", title).await
    }

    /// Current option values of this client (`tmux show [-t tty]`)
    pub async fn options(&self) -> BTreeMap<String, String> {
        let mut command = ShellCommand::new(TMUX).arg("show");
        if let Target::Tty(tty) = &self.target {
            command = command.args(["-t", tty.as_str()]);
        }
        parse_options(&self.runner.stdout(&command).await.unwrap_or_default())
    }
}

/// Parse `key value` lines; values quoted by tmux are unquoted
pub fn parse_options(output: &str) -> BTreeMap<String, String> {
    output
        .lines()
        .filter_map(|line| {
            let (key, value) = line.trim().split_once(' ')?;
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .unwrap_or(value);
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}
