//! Registry error types.

use cohort_component::{BitIndex, ComponentTypeId};

/// Errors raised by component registration.
///
/// Mutating a dead or unknown entity is never an error; those calls are
/// silently ignored.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// Every bit of the composition representation is already assigned.
    #[error("cannot register component type {type_id}: all {capacity} component bits are in use")]
    CapacityExceeded {
        type_id: ComponentTypeId,
        capacity: usize,
    },

    /// The type already owns a bit; assigning another would orphan every
    /// filter and composition that uses the old one.
    #[error("component type {type_id} is already registered at bit {bit}")]
    AlreadyRegistered {
        type_id: ComponentTypeId,
        bit: BitIndex,
    },

    /// A storage exists for this type id but holds a different Rust type,
    /// which happens when two types share a `type_name`.
    #[error("storage for component type {type_id} does not hold `{name}`")]
    StorageTypeMismatch {
        type_id: ComponentTypeId,
        name: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
