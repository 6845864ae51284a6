//! Component type to bit assignment.
//!
//! Bits are handed out once per component type, in registration order,
//! starting at 0. A bit is never reassigned or recycled for the lifetime of
//! the table.

use std::collections::HashMap;

use cohort_component::{BitIndex, ComponentTypeId};

use crate::error::{RegistryError, Result};

/// Injective map from component type to [`BitIndex`].
#[derive(Debug)]
pub struct BitTable {
    by_type: HashMap<ComponentTypeId, BitIndex>,
    /// `types[bit]` is the type that owns `bit`.
    types: Vec<ComponentTypeId>,
    capacity: usize,
}

impl BitTable {
    /// `capacity` must not exceed [`MAX_COMPONENTS`](cohort_component::MAX_COMPONENTS);
    /// larger values are clamped.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(cohort_component::MAX_COMPONENTS);
        Self {
            by_type: HashMap::new(),
            types: Vec::new(),
            capacity,
        }
    }

    /// Assign the next bit to `type_id`.
    ///
    /// Fails if the type already has a bit or if the table is full.
    pub fn assign(&mut self, type_id: ComponentTypeId) -> Result<BitIndex> {
        if let Some(&bit) = self.by_type.get(&type_id) {
            return Err(RegistryError::AlreadyRegistered { type_id, bit });
        }
        let bit = BitIndex::new(self.types.len())
            .filter(|bit| bit.index() < self.capacity)
            .ok_or(RegistryError::CapacityExceeded {
                type_id,
                capacity: self.capacity,
            })?;
        self.by_type.insert(type_id, bit);
        self.types.push(type_id);
        Ok(bit)
    }

    /// Existing bit for `type_id`, assigning one if the type is new.
    pub fn get_or_assign(&mut self, type_id: ComponentTypeId) -> Result<BitIndex> {
        match self.by_type.get(&type_id) {
            Some(&bit) => Ok(bit),
            None => self.assign(type_id),
        }
    }

    /// Check that every type in `type_ids` has a bit or could still get one,
    /// without assigning anything.
    pub fn ensure_room(&self, type_ids: impl IntoIterator<Item = ComponentTypeId>) -> Result<()> {
        let mut pending = Vec::new();
        for type_id in type_ids {
            if self.by_type.contains_key(&type_id) || pending.contains(&type_id) {
                continue;
            }
            if self.types.len() + pending.len() >= self.capacity {
                return Err(RegistryError::CapacityExceeded {
                    type_id,
                    capacity: self.capacity,
                });
            }
            pending.push(type_id);
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, type_id: ComponentTypeId) -> Option<BitIndex> {
        self.by_type.get(&type_id).copied()
    }

    /// The type that owns `bit`, if assigned.
    #[must_use]
    pub fn type_of(&self, bit: BitIndex) -> Option<ComponentTypeId> {
        self.types.get(bit.index()).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
