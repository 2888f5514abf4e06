//! Backend descriptors and the cross-process notifier state

use serde::{Deserialize, Serialize};

use crate::domain::notification::NotifyOptions;

/// A configured backend: its registry name and the options it was last
/// constructed or configured with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    pub name: String,
    #[serde(default)]
    pub options: NotifyOptions,
}

impl BackendDescriptor {
    pub fn new(name: impl Into<String>, options: NotifyOptions) -> Self {
        Self {
            name: name.into(),
            options,
        }
    }
}

/// State shared between the process that connected and the processes it
/// spawns.
///
/// Invariant: descriptor names are unique. Only [`upsert`] adds entries,
/// and it replaces options in place when the name is already present.
///
/// [`upsert`]: NotifierState::upsert
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotifierState {
    pub active: bool,
    pub owner_pid: Option<u32>,
    pub descriptors: Vec<BackendDescriptor>,
}

impl NotifierState {
    /// Create an empty, inactive, unowned state
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a descriptor by backend name
    pub fn descriptor(&self, name: &str) -> Option<&BackendDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.descriptor(name).is_some()
    }

    /// Insert a descriptor, or replace the options of an existing one.
    ///
    /// Returns `true` if a new descriptor was appended.
    pub fn upsert(&mut self, name: &str, options: NotifyOptions) -> bool {
        match self.descriptors.iter_mut().find(|d| d.name == name) {
            Some(existing) => {
                existing.options = options;
                false
            }
            None => {
                self.descriptors.push(BackendDescriptor::new(name, options));
                true
            }
        }
    }

    /// Remove a descriptor by name
    pub fn remove(&mut self, name: &str) -> Option<BackendDescriptor> {
        let index = self.descriptors.iter().position(|d| d.name == name)?;
        Some(self.descriptors.remove(index))
    }

    /// Names of all persisted descriptors, in order
    pub fn names(&self) -> Vec<&str> {
        self.descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    /// Whether `pid` may toggle activation
    pub fn is_owned_by(&self, pid: u32) -> bool {
        self.owner_pid == Some(pid)
    }
}
