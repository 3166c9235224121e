//! Read-only origin lookup.

use std::collections::HashMap;

use crate::config::schema::OriginConfig;

/// Immutable mapping from request origin to its mail configuration.
///
/// Built once at startup and shared by reference; lookups never mutate it.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    origins: HashMap<String, OriginConfig>,
}

impl ConfigStore {
    /// Wrap an already validated origins map.
    pub fn new(origins: HashMap<String, OriginConfig>) -> Self {
        Self { origins }
    }

    /// Configuration for `origin`, if it is configured.
    pub fn resolve(&self, origin: Option<&str>) -> Option<&OriginConfig> {
        origin.and_then(|o| self.origins.get(o))
    }

    /// Whether `origin` is configured.
    pub fn is_known(&self, origin: Option<&str>) -> bool {
        self.resolve(origin).is_some()
    }

    /// Configured origins in no particular order.
    pub fn origins(&self) -> impl Iterator<Item = (&str, &OriginConfig)> {
        self.origins.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.origins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}
