//! Option layering, host checks and formatting shared by every backend

use std::path::PathBuf;

use crate::application::ports::BackendError;
use crate::domain::notification::{NotificationType, NotifyOptions};

/// Title used when neither the backend nor the caller sets one
pub const DEFAULT_TITLE: &str = "Alertcast";

/// Hosts with a freedesktop notification stack
pub const FREEDESKTOP_HOSTS: &[&str] = &[
    "linux",
    "freebsd",
    "openbsd",
    "netbsd",
    "dragonfly",
    "solaris",
    "illumos",
];

/// Hosts with an xterm-compatible terminal
pub const UNIX_HOSTS: &[&str] = &[
    "macos",
    "linux",
    "freebsd",
    "openbsd",
    "netbsd",
    "dragonfly",
    "solaris",
    "illumos",
];

/// Layered options of one backend instance.
///
/// Effective options for a call are built from, lowest priority first:
/// the default title, the backend defaults, the construction options, the
/// call options. The `silent` construction key is dropped.
#[derive(Debug, Clone)]
pub struct BackendOptions {
    defaults: NotifyOptions,
    construction: NotifyOptions,
    images_dir: PathBuf,
}

impl BackendOptions {
    pub fn new(defaults: NotifyOptions, construction: &NotifyOptions, images_dir: PathBuf) -> Self {
        Self {
            defaults,
            construction: Self::strip(construction.clone()),
            images_dir,
        }
    }

    fn strip(mut options: NotifyOptions) -> NotifyOptions {
        options.remove("silent");
        options
    }

    /// Options as of construction, without call overrides
    pub fn configured(&self) -> NotifyOptions {
        NotifyOptions::new()
            .with("title", DEFAULT_TITLE)
            .merge(&self.defaults)
            .merge(&self.construction)
    }

    pub fn reconfigure(&mut self, options: NotifyOptions) {
        self.construction = Self::strip(options);
    }

    /// Effective options for one notification, with `type` and `image` resolved
    pub fn for_notify(&self, overrides: &NotifyOptions) -> NotifyOptions {
        self.configured()
            .merge(overrides)
            .resolve(&self.images_dir)
    }
}

/// Display name of a host, as shown in error messages
pub fn host_name(os: &str) -> &str {
    match os {
        "macos" => "Mac OS X",
        "linux" => "Linux",
        "freebsd" => "FreeBSD",
        "openbsd" => "OpenBSD",
        "netbsd" => "NetBSD",
        "dragonfly" => "DragonFly",
        "solaris" => "Solaris",
        "illumos" => "SunOS",
        "windows" => "Windows",
        other => other,
    }
}

/// Fail with `UnsupportedPlatform` unless `os` is one of `supported`
pub fn check_host(backend: &str, os: &str, supported: &[&str]) -> Result<(), BackendError> {
    if supported.contains(&os) {
        return Ok(());
    }
    Err(BackendError::UnsupportedPlatform {
        backend: backend.to_string(),
        host: host_name(os).to_string(),
    })
}

/// Substitute `%s` placeholders in order; `%%` is a literal percent sign.
///
/// Placeholders beyond the supplied arguments become empty.
pub fn fill_placeholders(format: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek() {
            Some('s') => {
                chars.next();
                out.push_str(args.next().copied().unwrap_or_default());
            }
            Some('%') => {
                chars.next();
                out.push('%');
            }
            _ => out.push('%'),
        }
    }
    out
}

/// Desktop urgency hint for a notification type
pub fn urgency_for(kind: &NotificationType) -> &'static str {
    match kind {
        NotificationType::Failed => "normal",
        _ => "low",
    }
}

/// First line of a message, ignoring one leading newline
pub fn first_line(message: &str) -> &str {
    let message = message.strip_prefix('\n').unwrap_or(message);
    message.lines().next().unwrap_or_default()
}
