//! Registry configuration.

use cohort_component::MAX_COMPONENTS;
use serde::Deserialize;

/// Tunables for a [`Registry`](crate::Registry).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Upper bound on distinct component types. Values above
    /// [`MAX_COMPONENTS`] are clamped when the registry is built.
    pub max_component_types: usize,
    /// Entities to reserve room for up front.
    pub entity_capacity: usize,
}

impl RegistryConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_component_types(mut self, max: usize) -> Self {
        self.max_component_types = max;
        self
    }

    #[must_use]
    pub fn with_entity_capacity(mut self, capacity: usize) -> Self {
        self.entity_capacity = capacity;
        self
    }

    /// The component capacity actually enforced.
    #[must_use]
    pub fn effective_max_component_types(&self) -> usize {
        self.max_component_types.min(MAX_COMPONENTS)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_component_types: MAX_COMPONENTS,
            entity_capacity: 0,
        }
    }
}
