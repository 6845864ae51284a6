//! Deduplicated entity set with O(1) insert, remove and membership.

use std::collections::HashMap;

use cohort_component::Entity;

/// Dense `Vec` of entities plus a position index.
///
/// Iteration follows insertion order until the first removal; removal
/// swaps the last entity into the freed slot.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    dense: Vec<Entity>,
    position: HashMap<Entity, usize>,
}

impl EntitySet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            dense: Vec::with_capacity(capacity),
            position: HashMap::with_capacity(capacity),
        }
    }

    /// Returns `true` if `entity` was not already present.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.position.contains_key(&entity) {
            return false;
        }
        self.position.insert(entity, self.dense.len());
        self.dense.push(entity);
        true
    }

    /// Returns `true` if `entity` was present.
    pub fn remove(&mut self, entity: Entity) -> bool {
        let Some(pos) = self.position.remove(&entity) else {
            return false;
        };
        self.dense.swap_remove(pos);
        if let Some(&moved) = self.dense.get(pos) {
            self.position.insert(moved, pos);
        }
        true
    }

    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.position.contains_key(&entity)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.dense.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    pub fn clear(&mut self) {
        self.dense.clear();
        self.position.clear();
    }

    /// Empty the set, returning its entities.
    pub fn take(&mut self) -> Vec<Entity> {
        self.position.clear();
        std::mem::take(&mut self.dense)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Entity] {
        &self.dense
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.dense.iter()
    }
}

impl<'a> IntoIterator for &'a EntitySet {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Entity> for EntitySet {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let mut set = Self::new();
        for entity in iter {
            set.insert(entity);
        }
        set
    }
}
