//! Backend registry: ordered priority groups of named factories

use std::sync::Arc;

use super::ports::BackendFactory;

/// Ordered sequence of candidate groups.
///
/// Detection walks the groups in order and accepts at most one candidate per
/// group (the first that constructs). Within a group, earlier entries win.
#[derive(Clone, Default)]
pub struct Registry {
    groups: Vec<Vec<Arc<dyn BackendFactory>>>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a priority group
    pub fn with_group(mut self, group: Vec<Arc<dyn BackendFactory>>) -> Self {
        self.groups.push(group);
        self
    }

    pub fn groups(&self) -> &[Vec<Arc<dyn BackendFactory>>] {
        &self.groups
    }

    /// Look up a factory by backend name across all groups
    pub fn find(&self, name: &str) -> Option<Arc<dyn BackendFactory>> {
        self.groups
            .iter()
            .flatten()
            .find(|factory| factory.name() == name)
            .cloned()
    }

    /// All registered names in priority order
    pub fn names(&self) -> Vec<&str> {
        self.groups.iter().flatten().map(|f| f.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(Vec::is_empty)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let groups: Vec<Vec<&str>> = self
            .groups
            .iter()
            .map(|g| g.iter().map(|factory| factory.name()).collect())
            .collect();
        f.debug_struct("Registry").field("groups", &groups).finish()
    }
}
