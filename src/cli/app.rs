//! App runners for the `detect` and `notify` commands

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::application::ports::ConfigStore;
use crate::application::{Notifier, NotifierError};
use crate::domain::config::NotifierConfig;
use crate::domain::notification::NotifyOptions;
use crate::infrastructure::{default_registry, BackendContext, EnvStateStore, XdgConfigStore};

use super::args::NotifyArgs;
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins; otherwise `info`, raised by each `-v`.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Load and merge configuration from file and env
pub async fn load_merged_config() -> NotifierConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable config file");
            NotifierConfig::empty()
        }
    };

    let env_config = NotifierConfig::from_env_lookup(|key| env::var(key).ok());

    // Merge: defaults < file < env
    NotifierConfig::defaults()
        .merge(file_config)
        .merge(env_config)
}

/// Wire the notifier to the real host
pub fn build_notifier(config: NotifierConfig) -> Notifier {
    let store = Arc::new(EnvStateStore::new(config.namespace_or_default()));
    let registry = default_registry(&BackendContext::system());
    Notifier::new(config, registry, store)
}

/// Connect unless a parent process already did and handed us its state
pub async fn connect_or_inherit(notifier: &mut Notifier) -> Result<(), NotifierError> {
    if notifier.descriptors()?.is_empty() {
        notifier.connect().await?;
    } else {
        tracing::debug!("Using notifiers inherited from the parent process");
    }
    Ok(())
}

/// Run `detect`: connect and list the chosen backends
pub async fn run_detect(config: NotifierConfig) -> ExitCode {
    let presenter = Presenter::new();

    if !config.notify_or_default() {
        presenter.warn("Notifications are disabled (notify = false)");
        return ExitCode::from(EXIT_SUCCESS);
    }

    let mut notifier = build_notifier(config);
    match detect(&mut notifier, &presenter).await {
        Ok(0) => {
            presenter.warn("No notifiers selected");
            ExitCode::from(EXIT_SUCCESS)
        }
        Ok(_) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn detect(notifier: &mut Notifier, presenter: &Presenter) -> Result<usize, NotifierError> {
    notifier.connect().await?;

    let descriptors = notifier.descriptors()?;
    let backends = notifier.available().await?;
    for backend in &backends {
        let options = descriptors
            .iter()
            .find(|d| d.name == backend.name)
            .map(|d| d.options.clone())
            .unwrap_or_default();
        presenter.backend(&backend.title, &backend.name, &options);
    }
    Ok(backends.len())
}

/// Run `notify`: deliver one message to every backend
pub async fn run_notify(config: NotifierConfig, args: NotifyArgs) -> ExitCode {
    let presenter = Presenter::new();
    let options = notify_options(&args);

    let mut notifier = build_notifier(config);
    let result = async {
        connect_or_inherit(&mut notifier).await?;
        notifier.notify(&args.message, &options).await
    }
    .await;

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.error(&e.to_string());
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Call options from `notify` arguments; `-o` pairs come last and win
pub fn notify_options(args: &NotifyArgs) -> NotifyOptions {
    let mut options = NotifyOptions::new();
    if let Some(kind) = &args.kind {
        options.insert("type", kind.as_str());
    }
    if let Some(title) = &args.title {
        options.insert("title", title.as_str());
    }
    if let Some(image) = &args.image {
        options.insert("image", image.as_str());
    }
    for (key, value) in &args.options {
        options.insert(key.as_str(), value.clone());
    }
    options
}
