//! Component storages.
//!
//! The registry treats storage layout as a black box. What it relies on is
//! the [`ComponentStorage`] contract: a storage knows its bit, can tell
//! whether it holds an entity, and can drop an entity's data on purge. Every
//! `set`/`remove` goes through the [`EntityIndex`] so the entity's
//! composition bit and dirty mark stay in step with the data.

use std::any::Any;
use std::collections::HashMap;

use cohort_component::{BitIndex, Component, ComponentTypeId, Entity};

use crate::entity_index::EntityIndex;

/// Identity of a registered component type: its id and its bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageHandle {
    /// Id of the component type.
    pub type_id: ComponentTypeId,
    /// Bit the type occupies in every composition.
    pub bit: BitIndex,
}

/// Object-safe view of a storage, used for type-erased bookkeeping.
pub trait ComponentStorage: Any {
    /// Bit of the stored component type.
    fn bit(&self) -> BitIndex;

    /// Id of the stored component type.
    fn component_type_id(&self) -> ComponentTypeId;

    /// Name of the stored component type.
    fn name(&self) -> &'static str;

    /// Whether the storage holds data for `entity`.
    fn contains(&self, entity: Entity) -> bool;

    /// Number of entities with data in this storage.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop `entity`'s data, clearing its bit in `index`. Returns `true` if
    /// the storage held data for it.
    fn purge(&mut self, entity: Entity, index: &mut EntityIndex) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Hash-map backed storage for one component type.
#[derive(Debug)]
pub struct Storage<T> {
    /// Bit this storage flips in the entity index.
    bit: BitIndex,
    /// Component values by owning entity.
    components: HashMap<Entity, T>,
}

impl<T: Component> Storage<T> {
    /// Empty storage for a type assigned `bit`.
    #[must_use]
    pub fn new(bit: BitIndex) -> Self {
        Self {
            bit,
            components: HashMap::new(),
        }
    }

    /// Type id and bit of this storage.
    #[must_use]
    pub fn handle(&self) -> StorageHandle {
        StorageHandle {
            type_id: T::component_type_id(),
            bit: self.bit,
        }
    }

    /// Attach `value` to `entity`, replacing any previous value.
    ///
    /// Ignored (returns `false`) when `entity` is not alive.
    pub fn set(&mut self, index: &mut EntityIndex, entity: Entity, value: T) -> bool {
        if !index.set_bit(entity, self.bit) {
            return false;
        }
        self.components.insert(entity, value);
        true
    }

    /// Detach and return `entity`'s value. `None` when the entity is not
    /// alive or holds no value.
    pub fn remove(&mut self, index: &mut EntityIndex, entity: Entity) -> Option<T> {
        if !index.clear_bit(entity, self.bit) {
            return None;
        }
        self.components.remove(&entity)
    }

    /// The value attached to `entity`, if any.
    #[must_use]
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.components.get(&entity)
    }

    /// In-place access. Editing a value does not change the composition, so
    /// it does not mark the entity dirty.
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        self.components.get_mut(&entity)
    }

    /// Every `(entity, value)` pair in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (Entity, &T)> {
        self.components.iter().map(|(&entity, value)| (entity, value))
    }
}

impl<T: Component> ComponentStorage for Storage<T> {
    fn bit(&self) -> BitIndex {
        self.bit
    }

    fn component_type_id(&self) -> ComponentTypeId {
        T::component_type_id()
    }

    fn name(&self) -> &'static str {
        T::type_name()
    }

    fn contains(&self, entity: Entity) -> bool {
        self.components.contains_key(&entity)
    }

    fn len(&self) -> usize {
        self.components.len()
    }

    fn purge(&mut self, entity: Entity, index: &mut EntityIndex) -> bool {
        index.clear_bit(entity, self.bit);
        self.components.remove(&entity).is_some()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Health(u32);

    impl Component for Health {
        fn type_name() -> &'static str {
            "Health"
        }
    }

    fn setup() -> (EntityIndex, Storage<Health>, Entity) {
        let mut index = EntityIndex::new();
        let entity = Entity::from_raw(1);
        index.mark_alive(entity);
        (index, Storage::new(BitIndex::new(4).unwrap()), entity)
    }

    #[test]
    fn test_set_flips_bit_and_marks_dirty() {
        let (mut index, mut storage, entity) = setup();
        assert!(storage.set(&mut index, entity, Health(10)));
        assert!(index.composition(entity).contains(storage.bit()));
        assert_eq!(index.dirty(), &[entity]);
        assert_eq!(storage.get(entity), Some(&Health(10)));
    }

    #[test]
    fn test_remove_clears_bit() {
        let (mut index, mut storage, entity) = setup();
        storage.set(&mut index, entity, Health(10));
        index.clear_dirty();

        assert_eq!(storage.remove(&mut index, entity), Some(Health(10)));
        assert!(index.composition(entity).is_empty());
        assert!(index.is_dirty(entity));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_dead_entity_writes_are_ignored() {
        let (mut index, mut storage, _) = setup();
        let ghost = Entity::from_raw(99);
        assert!(!storage.set(&mut index, ghost, Health(1)));
        assert!(!storage.contains(ghost));
        assert_eq!(storage.remove(&mut index, ghost), None);
    }

    #[test]
    fn test_get_mut_does_not_dirty() {
        let (mut index, mut storage, entity) = setup();
        storage.set(&mut index, entity, Health(10));
        index.clear_dirty();

        storage.get_mut(entity).unwrap().0 = 3;
        assert!(!index.is_dirty(entity));
        assert_eq!(storage.get(entity), Some(&Health(3)));
    }

    #[test]
    fn test_purge_through_trait_object() {
        let (mut index, storage, entity) = setup();
        let mut boxed: Box<dyn ComponentStorage> = Box::new(storage);
        boxed
            .as_any_mut()
            .downcast_mut::<Storage<Health>>()
            .unwrap()
            .set(&mut index, entity, Health(1));

        assert!(boxed.contains(entity));
        assert!(boxed.purge(entity, &mut index));
        assert!(!boxed.contains(entity));
        assert!(!index.composition(entity).contains(boxed.bit()));
        assert_eq!(boxed.name(), "Health");
    }
}
