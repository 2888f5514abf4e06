//! Backend detection and the in-process instance cache

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tracing::debug;

use crate::domain::notification::NotifyOptions;
use crate::domain::state::{BackendDescriptor, NotifierState};

use super::error::NotifierError;
use super::ports::{Backend, StateStore};
use super::registry::Registry;

/// A constructed backend together with the descriptor it was built from
pub struct BackendInstance {
    name: String,
    options: NotifyOptions,
    backend: Box<dyn Backend>,
}

impl BackendInstance {
    /// Registry name this instance was built under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Construction options currently applied
    pub fn options(&self) -> &NotifyOptions {
        &self.options
    }

    fn reconfigure(&mut self, options: NotifyOptions) {
        self.backend.reconfigure(options.clone());
        self.options = options;
    }
}

impl Deref for BackendInstance {
    type Target = dyn Backend;

    fn deref(&self) -> &Self::Target {
        self.backend.as_ref()
    }
}

impl DerefMut for BackendInstance {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.backend.as_mut()
    }
}

impl std::fmt::Debug for BackendInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendInstance")
            .field("name", &self.name)
            .field("title", &self.backend.title())
            .field("options", &self.options)
            .finish()
    }
}

/// Owns the registry, the persisted descriptors and the live instances.
///
/// Descriptors live in the [`StateStore`] so that child processes see the
/// outcome of detection; instances are private to this process and are
/// reconciled against the descriptors every time they are requested.
pub struct Detector {
    registry: Registry,
    store: Arc<dyn StateStore>,
    instances: Vec<BackendInstance>,
}

impl Detector {
    pub fn new(registry: Registry, store: Arc<dyn StateStore>) -> Self {
        Self {
            registry,
            store,
            instances: Vec::new(),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Persisted descriptors, in detection/insertion order
    pub fn descriptors(&self) -> Result<Vec<BackendDescriptor>, NotifierError> {
        Ok(self.store.load()?.descriptors)
    }

    /// Detect one backend per registry group.
    ///
    /// No-op while any descriptor is persisted. Candidates failing with an
    /// availability error are skipped; any other construction error aborts.
    pub async fn detect(&mut self) -> Result<(), NotifierError> {
        let mut state = self.store.load()?;
        if !state.descriptors.is_empty() {
            debug!(notifiers = ?state.names(), "Reusing detected notifiers");
            return Ok(());
        }

        let options = NotifyOptions::new();
        for group in self.registry.groups() {
            for factory in group {
                match factory.create(&options).await {
                    Ok(backend) => {
                        debug!(notifier = factory.name(), "Notifier available");
                        state.upsert(factory.name(), options.clone());
                        self.instances.retain(|i| i.name != factory.name());
                        self.instances.push(BackendInstance {
                            name: factory.name().to_string(),
                            options: options.clone(),
                            backend,
                        });
                        break;
                    }
                    Err(e) if e.is_unavailable() => {
                        debug!(notifier = factory.name(), error = %e, "Notifier unavailable");
                    }
                    Err(e) => return Err(NotifierError::backend(factory.name(), e)),
                }
            }
        }

        if state.descriptors.is_empty() {
            return Err(NotifierError::NoneAvailable);
        }
        self.store.save(&state)?;
        Ok(())
    }

    /// Live instances for the persisted descriptors, in descriptor order.
    ///
    /// Missing instances are constructed, instances whose descriptor was
    /// removed are dropped, and instances whose descriptor options changed
    /// are reconfigured in place.
    pub async fn available(&mut self) -> Result<&mut [BackendInstance], NotifierError> {
        let state = self.store.load()?;

        self.instances.retain(|i| state.contains(&i.name));

        for descriptor in &state.descriptors {
            match self.instances.iter().position(|i| i.name == descriptor.name) {
                Some(index) => {
                    let instance = &mut self.instances[index];
                    if instance.options != descriptor.options {
                        instance.reconfigure(descriptor.options.clone());
                    }
                }
                None => {
                    let factory = self
                        .registry
                        .find(&descriptor.name)
                        .ok_or_else(|| NotifierError::UnknownBackend(descriptor.name.clone()))?;
                    let backend = factory
                        .create(&descriptor.options)
                        .await
                        .map_err(|e| NotifierError::backend(&descriptor.name, e))?;
                    self.instances.push(BackendInstance {
                        name: descriptor.name.clone(),
                        options: descriptor.options.clone(),
                        backend,
                    });
                }
            }
        }

        let position = |name: &str| {
            state
                .descriptors
                .iter()
                .position(|d| d.name == name)
                .unwrap_or(usize::MAX)
        };
        self.instances.sort_by_key(|i| position(&i.name));

        Ok(&mut self.instances)
    }

    /// Register a backend explicitly.
    ///
    /// A known name only has its options replaced; the running instance is
    /// kept. A new name is constructed once to validate it, and construction
    /// errors propagate.
    pub async fn add(&mut self, name: &str, options: NotifyOptions) -> Result<(), NotifierError> {
        let factory = self
            .registry
            .find(name)
            .ok_or_else(|| NotifierError::UnknownBackend(name.to_string()))?;

        let mut state = self.store.load()?;
        if state.contains(name) {
            state.upsert(name, options.clone());
            self.store.save(&state)?;
            if let Some(instance) = self.instances.iter_mut().find(|i| i.name == name) {
                instance.reconfigure(options);
            }
            return Ok(());
        }

        let backend = factory
            .create(&options)
            .await
            .map_err(|e| NotifierError::backend(name, e))?;

        state.upsert(name, options.clone());
        self.store.save(&state)?;
        self.instances.retain(|i| i.name != name);
        self.instances.push(BackendInstance {
            name: name.to_string(),
            options,
            backend,
        });
        Ok(())
    }

    /// Forget a backend, handing back its live instance if one was built
    pub fn remove(&mut self, name: &str) -> Result<Option<BackendInstance>, NotifierError> {
        let mut state = self.store.load()?;
        if state.remove(name).is_some() {
            self.store.save(&state)?;
        }
        let index = self.instances.iter().position(|i| i.name == name);
        Ok(index.map(|i| self.instances.remove(i)))
    }

    /// Clear all descriptors and drop the instance cache.
    ///
    /// The `active` flag and the owner are left untouched.
    pub fn reset(&mut self) -> Result<(), NotifierError> {
        let mut state: NotifierState = self.store.load()?;
        state.descriptors.clear();
        self.store.save(&state)?;
        self.instances.clear();
        Ok(())
    }
}
