//! The [`Component`] trait and static component identity.
//!
//! A component type is identified by a [`ComponentTypeId`] computed from its
//! string name with FNV-1a 64-bit. The id is known before any registry
//! exists, needs no runtime type inspection, and can be recomputed from a
//! plain name, which lets configuration files refer to component types.
//!
//! The id says *which* type a component is. Where its bit lives in a
//! composition is a separate, registry-local decision (see
//! [`BitIndex`](crate::BitIndex)).

use serde::{Deserialize, Serialize};

/// Name-derived identifier of a component type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentTypeId(pub u64);

impl ComponentTypeId {
    const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    /// Hash a component name with FNV-1a 64-bit.
    ///
    /// ```text
    /// hash = 0xcbf29ce484222325
    /// for each byte in name:
    ///     hash = (hash ^ byte) * 0x00000100000001b3
    /// ```
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET_BASIS;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// The id of Rust component type `T`.
    #[must_use]
    pub fn of<T: Component>() -> Self {
        T::component_type_id()
    }
}

impl std::fmt::Display for ComponentTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Data that can be attached to an entity.
///
/// # Examples
///
/// ```rust
/// use cohort_component::{Component, ComponentTypeId};
///
/// struct Health {
///     current: f32,
/// }
///
/// impl Component for Health {
///     fn type_name() -> &'static str {
///         "Health"
///     }
/// }
///
/// assert_eq!(Health::component_type_id(), ComponentTypeId::from_name("Health"));
/// ```
pub trait Component: 'static {
    /// Stable, human-readable name. Two types with the same name are the
    /// same component type as far as the engine is concerned.
    fn type_name() -> &'static str;

    fn component_type_id() -> ComponentTypeId {
        ComponentTypeId::from_name(Self::type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health;

    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }
    }

    struct Velocity;

    impl Component for Velocity {
        fn type_name() -> &'static str {
            "Velocity"
        }
    }

    #[test]
    fn test_type_id_matches_name_hash() {
        assert_eq!(Health::component_type_id(), ComponentTypeId::from_name("Health"));
        assert_eq!(ComponentTypeId::of::<Health>(), Health::component_type_id());
    }

    #[test]
    fn test_distinct_names_distinct_ids() {
        assert_ne!(ComponentTypeId::of::<Health>(), ComponentTypeId::of::<Velocity>());
    }

    #[test]
    fn test_fnv1a_known_vectors() {
        assert_eq!(ComponentTypeId::from_name(""), ComponentTypeId(0xcbf2_9ce4_8422_2325));
        // Published FNV-1a 64 test vector for "a".
        assert_eq!(ComponentTypeId::from_name("a"), ComponentTypeId(0xaf63_dc4c_8601_ec8c));
    }

    #[test]
    fn test_display_is_fixed_width_hex() {
        assert_eq!(ComponentTypeId(0x2a).to_string(), "0x000000000000002a");
    }
}
