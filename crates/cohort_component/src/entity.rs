//! Entity handles and their allocator.
//!
//! An [`Entity`] is nothing more than a `u64`. Everything an entity "is"
//! lives elsewhere: its composition in the entity index, its data in the
//! component storages.

use serde::{Deserialize, Serialize};

/// An opaque entity handle.
///
/// Handles are never reused within one allocator, so a stale handle held
/// after its entity was purged can never alias a newer entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(pub u64);

impl Entity {
    /// Sentinel that no allocator ever returns.
    pub const INVALID: Entity = Entity(0);

    /// Wrap a raw handle value.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// The raw handle value.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// `false` only for [`Entity::INVALID`].
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Hands out entity handles in strictly increasing order, starting at 1.
///
/// There is no free list. Destroyed handles stay retired for the lifetime
/// of the allocator.
#[derive(Debug)]
pub struct EntityAllocator {
    next_id: u64,
}

impl EntityAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    /// Allocate the next handle.
    pub fn allocate(&mut self) -> Entity {
        let entity = Entity(self.next_id);
        self.next_id += 1;
        entity
    }

    /// Number of handles handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u64 {
        self.next_id - 1
    }
}

impl Default for EntityAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_entity_is_zero() {
        assert!(!Entity::INVALID.is_valid());
        assert_eq!(Entity::INVALID.id(), 0);
        assert!(Entity::from_raw(7).is_valid());
    }

    #[test]
    fn test_allocator_is_monotonic() {
        let mut alloc = EntityAllocator::new();
        let ids: Vec<u64> = (0..5).map(|_| alloc.allocate().id()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(alloc.allocated(), 5);
    }

    #[test]
    fn test_entity_display() {
        assert_eq!(Entity::from_raw(12).to_string(), "Entity(12)");
    }
}
