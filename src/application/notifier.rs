//! Notifier facade: activation state machine and notification fan-out

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::config::{BackendSetting, NotifierConfig};
use crate::domain::notification::NotifyOptions;
use crate::domain::state::BackendDescriptor;

use super::detector::{BackendInstance, Detector};
use super::error::NotifierError;
use super::ports::StateStore;
use super::registry::Registry;

/// Source of the current process id
pub type PidSource = Arc<dyn Fn() -> u32 + Send + Sync>;

/// Options for [`Notifier::turn_on`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TurnOnOptions {
    /// Suppress the "using ..." message (falls back to the configured value)
    pub silent: Option<bool>,
}

/// Title and name of a live backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSummary {
    pub name: String,
    pub title: String,
}

/// Single entry point for callers.
///
/// States are disconnected, connected but inactive, and active. Only the
/// process that connected may move between inactive and active; every
/// process may deliver notifications.
pub struct Notifier {
    config: NotifierConfig,
    store: Arc<dyn StateStore>,
    detector: Detector,
    pid: PidSource,
}

impl Notifier {
    pub fn new(config: NotifierConfig, registry: Registry, store: Arc<dyn StateStore>) -> Self {
        Self {
            config,
            detector: Detector::new(registry, store.clone()),
            store,
            pid: Arc::new(std::process::id),
        }
    }

    /// Replace the process id source
    pub fn with_pid_source<F>(mut self, pid: F) -> Self
    where
        F: Fn() -> u32 + Send + Sync + 'static,
    {
        self.pid = Arc::new(pid);
        self
    }

    pub fn config(&self) -> &NotifierConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.notify_or_default()
    }

    pub fn is_active(&self) -> Result<bool, NotifierError> {
        Ok(self.store.load()?.active)
    }

    pub fn descriptors(&self) -> Result<Vec<BackendDescriptor>, NotifierError> {
        self.detector.descriptors()
    }

    /// Claim ownership and pick the backends.
    ///
    /// Without an explicit `notifiers` table the registry is probed; with one
    /// each entry is added, or switched off when marked `off`.
    pub async fn connect(&mut self) -> Result<(), NotifierError> {
        if !self.is_enabled() {
            debug!("Notifications disabled");
            return Ok(());
        }

        let mut state = self.store.load()?;
        state.owner_pid = Some((self.pid)());
        self.store.save(&state)?;

        if self.config.all_notifiers_off() {
            debug!("All notifiers switched off");
            return Ok(());
        }

        let explicit = self.config.explicit_notifiers().cloned();
        match explicit {
            None => self.detector.detect().await,
            Some(table) => {
                for (name, setting) in table {
                    match setting {
                        BackendSetting::Switch(_) => self.switch_off(&name).await?,
                        BackendSetting::Options(options) => {
                            self.detector.add(&name, options).await?
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Activate every available backend
    pub async fn turn_on(&mut self, options: TurnOnOptions) -> Result<(), NotifierError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut state = self.store.load()?;
        self.ensure_owner(state.owner_pid)?;
        if state.active {
            debug!("Notifications already active");
            return Ok(());
        }

        let silent = options
            .silent
            .unwrap_or_else(|| self.config.silent_or_default());

        let backends = self.detector.available().await?;
        for index in 0..backends.len() {
            if let Err(e) = backends[index].turn_on().await {
                let error = NotifierError::backend(backends[index].name(), e);
                for started in backends[..index].iter_mut().rev() {
                    if let Err(e) = started.turn_off().await {
                        warn!(notifier = started.name(), error = %e, "Failed to roll back notifier");
                    }
                }
                return Err(error);
            }
            if !silent {
                info!(
                    "Alertcast is using {} to send notifications.",
                    backends[index].title()
                );
            }
        }

        state.active = true;
        self.store.save(&state)?;
        Ok(())
    }

    /// Deactivate every available backend, best effort
    pub async fn turn_off(&mut self) -> Result<(), NotifierError> {
        if !self.is_enabled() {
            return Ok(());
        }
        let mut state = self.store.load()?;
        self.ensure_owner(state.owner_pid)?;
        if !state.active {
            return Ok(());
        }

        match self.detector.available().await {
            Ok(backends) => {
                for backend in backends.iter_mut() {
                    if let Err(e) = backend.turn_off().await {
                        warn!(notifier = backend.name(), error = %e, "Failed to turn off notifier");
                    }
                }
            }
            Err(e) => warn!(error = %e, "Could not load notifiers to turn off"),
        }

        state.active = false;
        self.store.save(&state)?;
        Ok(())
    }

    /// Send a notification to every available backend.
    ///
    /// A backend failing to deliver is logged and skipped.
    pub async fn notify(&mut self, message: &str, options: &NotifyOptions) -> Result<(), NotifierError> {
        if !self.is_enabled() {
            return Ok(());
        }

        // Delivery without activation is still honored for callers that
        // never connected.
        if !self.is_active()? {
            debug!("Delivering notification while notifications are inactive");
        }

        for backend in self.detector.available().await?.iter() {
            if let Err(e) = backend.notify(message, options).await {
                warn!(notifier = backend.name(), error = %e, "Failed to send notification");
            }
        }
        Ok(())
    }

    /// Forget detected backends and release ownership, from any process
    pub fn disconnect(&mut self) -> Result<(), NotifierError> {
        self.detector.reset()?;
        let mut state = self.store.load()?;
        state.owner_pid = None;
        self.store.save(&state)?;
        Ok(())
    }

    /// Live backends, in descriptor order
    pub async fn available(&mut self) -> Result<Vec<BackendSummary>, NotifierError> {
        Ok(self
            .detector
            .available()
            .await?
            .iter()
            .map(|b| BackendSummary {
                name: b.name().to_string(),
                title: b.title().to_string(),
            })
            .collect())
    }

    async fn switch_off(&mut self, name: &str) -> Result<(), NotifierError> {
        let active = self.is_active()?;
        let removed: Option<BackendInstance> = self.detector.remove(name)?;
        if let Some(mut instance) = removed {
            if active {
                if let Err(e) = instance.turn_off().await {
                    warn!(notifier = name, error = %e, "Failed to turn off notifier");
                }
            }
        }
        Ok(())
    }

    fn ensure_owner(&self, owner: Option<u32>) -> Result<(), NotifierError> {
        let current = (self.pid)();
        if owner != Some(current) {
            return Err(NotifierError::NotOwner { owner, current });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::BackendError;
    use crate::application::testing::{CallLog, FakeFactory};
    use crate::domain::config::Switch;
    use crate::infrastructure::state::MemoryStateStore;
    use indexmap::IndexMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    const PARENT: u32 = 4242;
    const CHILD: u32 = 4343;

    fn enabled() -> NotifierConfig {
        NotifierConfig::defaults()
    }

    fn notifier(config: NotifierConfig, registry: Registry, store: &MemoryStateStore) -> Notifier {
        Notifier::new(config, registry, Arc::new(store.clone())).with_pid_source(|| PARENT)
    }

    fn two_backends(log: &CallLog) -> Registry {
        Registry::new()
            .with_group(vec![FakeFactory::new("Foo", "foo", log).arc()])
            .with_group(vec![FakeFactory::new("Bar", "bar", log).arc()])
    }

    #[tokio::test]
    async fn connect_records_owner_and_detects() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut notifier = notifier(enabled(), two_backends(&log), &store);

        notifier.connect().await.unwrap();

        let state = store.snapshot();
        assert_eq!(state.owner_pid, Some(PARENT));
        assert_eq!(state.names(), vec!["foo", "bar"]);
        assert!(!state.active);
    }

    #[tokio::test]
    async fn connect_when_disabled_does_nothing() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let config = NotifierConfig {
            notify: Some(false),
            ..NotifierConfig::defaults()
        };
        let mut notifier = notifier(config, two_backends(&log), &store);

        notifier.connect().await.unwrap();

        assert!(!notifier.is_enabled());
        assert_eq!(store.snapshot(), Default::default());
    }

    #[tokio::test]
    async fn disabled_notifier_short_circuits_every_operation() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let config = NotifierConfig {
            notify: Some(false),
            ..NotifierConfig::defaults()
        };
        let mut notifier = notifier(config, two_backends(&log), &store);

        assert!(notifier.connect().await.is_ok());
        assert!(notifier.turn_on(TurnOnOptions::default()).await.is_ok());
        assert!(notifier.notify("done", &NotifyOptions::new()).await.is_ok());
        assert!(notifier.turn_off().await.is_ok());

        assert!(log.entries().is_empty());
        assert_eq!(store.snapshot(), Default::default());
    }

    #[tokio::test]
    async fn connect_propagates_detection_failure() {
        let store = MemoryStateStore::new();
        let mut notifier = notifier(enabled(), Registry::new(), &store);

        let err = notifier.connect().await.unwrap_err();
        assert!(matches!(err, NotifierError::NoneAvailable));
    }

    #[tokio::test]
    async fn connect_with_explicit_table_adds_only_listed_backends() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut table = IndexMap::new();
        table.insert(
            "bar".to_string(),
            BackendSetting::Options(NotifyOptions::new().with("color", "Blue")),
        );
        let config = NotifierConfig {
            notifiers: Some(table),
            ..enabled()
        };
        let mut notifier = notifier(config, two_backends(&log), &store);

        notifier.connect().await.unwrap();

        let descriptors = notifier.descriptors().unwrap();
        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].name, "bar");
        assert_eq!(descriptors[0].options.get_str("color"), Some("Blue"));
    }

    #[tokio::test]
    async fn connect_adds_explicit_backends_in_config_order() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut table = IndexMap::new();
        table.insert("foo".to_string(), BackendSetting::Options(NotifyOptions::new()));
        table.insert("bar".to_string(), BackendSetting::Options(NotifyOptions::new()));
        let config = NotifierConfig {
            notifiers: Some(table),
            ..enabled()
        };
        let mut notifier = notifier(config, two_backends(&log), &store);

        notifier.connect().await.unwrap();

        assert_eq!(store.snapshot().names(), vec!["foo", "bar"]);
    }

    #[tokio::test]
    async fn connect_with_unknown_explicit_backend_fails() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut table = IndexMap::new();
        table.insert(
            "growl".to_string(),
            BackendSetting::Options(NotifyOptions::new()),
        );
        let config = NotifierConfig {
            notifiers: Some(table),
            ..enabled()
        };
        let mut notifier = notifier(config, two_backends(&log), &store);

        assert!(matches!(
            notifier.connect().await,
            Err(NotifierError::UnknownBackend(_))
        ));
    }

    #[tokio::test]
    async fn connect_with_off_entry_removes_backend() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut first = notifier(enabled(), two_backends(&log), &store);
        first.connect().await.unwrap();

        let mut table = IndexMap::new();
        table.insert("foo".to_string(), BackendSetting::Switch(Switch::Off));
        let config = NotifierConfig {
            notifiers: Some(table),
            ..enabled()
        };
        let mut second = notifier(config, two_backends(&log), &store);
        second.connect().await.unwrap();

        assert_eq!(store.snapshot().names(), vec!["bar"]);
    }

    #[tokio::test]
    async fn connect_with_off_key_skips_detection() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut table = IndexMap::new();
        table.insert(
            "off".to_string(),
            BackendSetting::Options(NotifyOptions::new()),
        );
        let config = NotifierConfig {
            notifiers: Some(table),
            ..enabled()
        };
        let mut notifier = notifier(config, two_backends(&log), &store);

        notifier.connect().await.unwrap();
        notifier.turn_on(TurnOnOptions::default()).await.unwrap();

        assert!(store.snapshot().descriptors.is_empty());
        assert!(notifier.available().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn turn_on_activates_backends() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut notifier = notifier(enabled(), two_backends(&log), &store);

        notifier.connect().await.unwrap();
        notifier.turn_on(TurnOnOptions::default()).await.unwrap();

        assert!(notifier.is_active().unwrap());
        assert_eq!(log.entries(), vec!["foo:turn_on", "bar:turn_on"]);
    }

    #[tokio::test]
    async fn turn_on_twice_is_a_noop() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut notifier = notifier(enabled(), two_backends(&log), &store);

        notifier.connect().await.unwrap();
        notifier.turn_on(TurnOnOptions::default()).await.unwrap();
        notifier.turn_on(TurnOnOptions::default()).await.unwrap();

        assert_eq!(log.entries().len(), 2);
    }

    #[tokio::test]
    async fn turn_on_without_backends_still_activates() {
        let store = MemoryStateStore::new();
        let mut table = IndexMap::new();
        table.insert("off".to_string(), BackendSetting::Switch(Switch::Off));
        let config = NotifierConfig {
            notifiers: Some(table),
            ..enabled()
        };
        let mut notifier = notifier(config, Registry::new(), &store);

        notifier.connect().await.unwrap();
        notifier
            .turn_on(TurnOnOptions { silent: Some(false) })
            .await
            .unwrap();

        assert!(notifier.is_active().unwrap());
    }

    #[tokio::test]
    async fn turn_on_rolls_back_on_backend_failure() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let registry = Registry::new()
            .with_group(vec![FakeFactory::new("Foo", "foo", &log).arc()])
            .with_group(vec![FakeFactory::new("Bar", "bar", &log)
                .failing_turn_on()
                .arc()]);
        let mut notifier = notifier(enabled(), registry, &store);

        notifier.connect().await.unwrap();
        let err = notifier
            .turn_on(TurnOnOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            NotifierError::Backend {
                source: BackendError::AlreadyOn,
                ..
            }
        ));
        assert!(!notifier.is_active().unwrap());
        assert_eq!(
            log.entries(),
            vec!["foo:turn_on", "bar:turn_on", "foo:turn_off"]
        );
    }

    #[tokio::test]
    async fn child_process_cannot_toggle_activation() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut parent = notifier(enabled(), two_backends(&log), &store);
        parent.connect().await.unwrap();

        let mut child = Notifier::new(enabled(), two_backends(&log), Arc::new(store.clone()))
            .with_pid_source(|| CHILD);

        let err = child
            .turn_on(TurnOnOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Only notify()"));
        assert!(!store.snapshot().active);

        parent.turn_on(TurnOnOptions::default()).await.unwrap();
        assert!(matches!(
            child.turn_off().await,
            Err(NotifierError::NotOwner {
                owner: Some(PARENT),
                current: CHILD
            })
        ));
        assert!(store.snapshot().active);
    }

    #[tokio::test]
    async fn turn_off_continues_past_failing_backends() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let registry = Registry::new()
            .with_group(vec![FakeFactory::new("Foo", "foo", &log)
                .failing_turn_off()
                .arc()])
            .with_group(vec![FakeFactory::new("Bar", "bar", &log).arc()]);
        let mut notifier = notifier(enabled(), registry, &store);

        notifier.connect().await.unwrap();
        notifier.turn_on(TurnOnOptions::default()).await.unwrap();
        notifier.turn_off().await.unwrap();

        assert!(!notifier.is_active().unwrap());
        assert!(log.entries().ends_with(&["foo:turn_off".to_string(), "bar:turn_off".to_string()]));
    }

    #[tokio::test]
    async fn turn_off_when_inactive_is_a_noop() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut notifier = notifier(enabled(), two_backends(&log), &store);

        notifier.connect().await.unwrap();
        notifier.turn_off().await.unwrap();

        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn notify_fans_out_to_every_backend() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut notifier = notifier(enabled(), two_backends(&log), &store);

        notifier.connect().await.unwrap();
        notifier.turn_on(TurnOnOptions::default()).await.unwrap();
        notifier
            .notify("Hello", &NotifyOptions::new().with("color", "Red"))
            .await
            .unwrap();

        let entries = log.entries();
        assert!(entries.contains(&"foo:notify:Hello:Red".to_string()));
        assert!(entries.contains(&"bar:notify:Hello:Red".to_string()));
    }

    #[tokio::test]
    async fn notify_call_options_win_over_construction_options() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut table = IndexMap::new();
        table.insert(
            "foo".to_string(),
            BackendSetting::Options(NotifyOptions::new().with("color", "Green")),
        );
        let config = NotifierConfig {
            notifiers: Some(table),
            ..enabled()
        };
        let mut notifier = notifier(config, two_backends(&log), &store);

        notifier.connect().await.unwrap();
        notifier.notify("a", &NotifyOptions::new()).await.unwrap();
        notifier
            .notify("b", &NotifyOptions::new().with("color", "Orange"))
            .await
            .unwrap();

        assert_eq!(
            log.entries(),
            vec!["foo:notify:a:Green", "foo:notify:b:Orange"]
        );
    }

    #[tokio::test]
    async fn notify_skips_failing_backends() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let registry = Registry::new()
            .with_group(vec![FakeFactory::new("Foo", "foo", &log)
                .failing_notify()
                .arc()])
            .with_group(vec![FakeFactory::new("Bar", "bar", &log).arc()]);
        let mut notifier = notifier(enabled(), registry, &store);

        notifier.connect().await.unwrap();
        notifier.notify("Hi", &NotifyOptions::new()).await.unwrap();

        assert_eq!(log.entries(), vec!["foo:notify:Hi:", "bar:notify:Hi:"]);
    }

    #[tokio::test]
    async fn child_process_delivers_from_inherited_state() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut parent = notifier(enabled(), two_backends(&log), &store);
        parent.connect().await.unwrap();
        parent.turn_on(TurnOnOptions::default()).await.unwrap();

        let counter = Arc::new(AtomicU32::new(CHILD));
        let pid = counter.clone();
        let mut child = Notifier::new(enabled(), two_backends(&log), Arc::new(store.clone()))
            .with_pid_source(move || pid.load(Ordering::SeqCst));
        child.notify("Hello", &NotifyOptions::new()).await.unwrap();

        let entries = log.entries();
        assert!(entries.contains(&"foo:notify:Hello:".to_string()));
        assert!(entries.contains(&"bar:notify:Hello:".to_string()));
    }

    #[tokio::test]
    async fn notify_when_disabled_sends_nothing() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut state = crate::domain::state::NotifierState::new();
        state.upsert("foo", NotifyOptions::new());
        state.active = true;
        store.save(&state).unwrap();

        let config = NotifierConfig {
            notify: Some(false),
            ..enabled()
        };
        let mut notifier = notifier(config, two_backends(&log), &store);
        notifier.notify("Hi", &NotifyOptions::new()).await.unwrap();

        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn disconnect_clears_descriptors_and_owner_from_any_process() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut parent = notifier(enabled(), two_backends(&log), &store);
        parent.connect().await.unwrap();

        let mut child = Notifier::new(enabled(), two_backends(&log), Arc::new(store.clone()))
            .with_pid_source(|| CHILD);
        child.disconnect().unwrap();

        assert!(store.snapshot().owner_pid.is_none());
        assert!(parent.available().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn available_reports_titles_and_names() {
        let log = CallLog::default();
        let store = MemoryStateStore::new();
        let mut notifier = notifier(enabled(), two_backends(&log), &store);
        notifier.connect().await.unwrap();

        let available = notifier.available().await.unwrap();
        assert_eq!(
            available,
            vec![
                BackendSummary {
                    name: "foo".to_string(),
                    title: "Foo".to_string()
                },
                BackendSummary {
                    name: "bar".to_string(),
                    title: "Bar".to_string()
                },
            ]
        );
    }
}
