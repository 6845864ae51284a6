//! Alive, dirty and destroyed tracking plus per-entity compositions.
//!
//! The [`EntityIndex`] is the only place compositions live. Storages call
//! [`EntityIndex::set_bit`] and [`EntityIndex::clear_bit`] whenever they gain
//! or lose an entity; those calls flip the bit and put the entity on the
//! dirty list, which the registry drains once per cycle.
//!
//! Entity lifecycle as seen from here:
//!
//! ```text
//! mark_alive ──▶ Alive ──mark_destroyed──▶ PendingRemoval ──purge──▶ (gone)
//! ```
//!
//! A pending entity is still alive: it stays visible to storages and views,
//! and may still be mutated, until the registry purges it.

use std::collections::HashMap;

use cohort_component::{BitIndex, CompositionSet, Entity};
use tracing::trace;

use crate::entity_set::EntitySet;

#[derive(Debug, Default)]
pub struct EntityIndex {
    alive: EntitySet,
    compositions: HashMap<Entity, CompositionSet>,
    dirty: EntitySet,
    destroyed: EntitySet,
}

impl EntityIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            alive: EntitySet::with_capacity(capacity),
            compositions: HashMap::with_capacity(capacity),
            dirty: EntitySet::new(),
            destroyed: EntitySet::new(),
        }
    }

    /// Current composition of `entity`; empty if it has none or is unknown.
    #[must_use]
    pub fn composition(&self, entity: Entity) -> CompositionSet {
        self.compositions.get(&entity).copied().unwrap_or_default()
    }

    /// Mutable composition of `entity`, created empty on first access.
    ///
    /// Changes made through this reference are not tracked; prefer
    /// [`set_bit`](Self::set_bit) and [`clear_bit`](Self::clear_bit).
    pub(crate) fn composition_mut(&mut self, entity: Entity) -> &mut CompositionSet {
        self.compositions.entry(entity).or_default()
    }

    /// Returns `true` if the entity was not already alive.
    pub fn mark_alive(&mut self, entity: Entity) -> bool {
        self.alive.insert(entity)
    }

    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.alive.contains(entity)
    }

    /// Queue `entity` for re-testing at the next synchronization.
    ///
    /// Ignored for entities that are not alive. Returns `true` only when the
    /// entity was newly added to the dirty set.
    pub fn mark_dirty(&mut self, entity: Entity) -> bool {
        if !self.alive.contains(entity) {
            trace!(%entity, "ignoring dirty mark on dead entity");
            return false;
        }
        self.dirty.insert(entity)
    }

    #[must_use]
    pub fn is_dirty(&self, entity: Entity) -> bool {
        self.dirty.contains(entity)
    }

    /// Record that `entity` gained a component. Marks it dirty if the bit
    /// actually changed. Returns `false` for dead entities.
    pub fn set_bit(&mut self, entity: Entity, bit: BitIndex) -> bool {
        if !self.alive.contains(entity) {
            trace!(%entity, %bit, "ignoring component add on dead entity");
            return false;
        }
        if self.composition_mut(entity).insert(bit) {
            self.dirty.insert(entity);
        }
        true
    }

    /// Record that `entity` lost a component. Marks it dirty if the bit
    /// actually changed. Returns `false` for dead entities.
    pub fn clear_bit(&mut self, entity: Entity, bit: BitIndex) -> bool {
        if !self.alive.contains(entity) {
            trace!(%entity, %bit, "ignoring component removal on dead entity");
            return false;
        }
        let changed = self
            .compositions
            .get_mut(&entity)
            .is_some_and(|composition| composition.remove(bit));
        if changed {
            self.dirty.insert(entity);
        }
        true
    }

    /// Schedule `entity` for removal at the next purge. The composition is
    /// left untouched. Returns `false` if the entity is not alive or is
    /// already scheduled.
    pub fn mark_destroyed(&mut self, entity: Entity) -> bool {
        if !self.alive.contains(entity) {
            return false;
        }
        self.destroyed.insert(entity)
    }

    #[must_use]
    pub fn is_pending_removal(&self, entity: Entity) -> bool {
        self.destroyed.contains(entity)
    }

    /// Forget `entity` entirely. It stays on the dirty list so the next
    /// synchronization drops it from every view.
    pub fn purge(&mut self, entity: Entity) {
        if self.alive.contains(entity) {
            self.dirty.insert(entity);
        }
        self.alive.remove(entity);
        self.compositions.remove(&entity);
        self.destroyed.remove(entity);
    }

    /// Drain the destroyed set.
    pub fn take_destroyed(&mut self) -> Vec<Entity> {
        self.destroyed.take()
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    #[must_use]
    pub fn alive(&self) -> &[Entity] {
        self.alive.as_slice()
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.alive.len()
    }

    #[must_use]
    pub fn dirty(&self) -> &[Entity] {
        self.dirty.as_slice()
    }

    #[must_use]
    pub fn destroyed(&self) -> &[Entity] {
        self.destroyed.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn e(id: u64) -> Entity {
        Entity::from_raw(id)
    }

    fn bit(i: usize) -> BitIndex {
        BitIndex::new(i).unwrap()
    }

    #[test]
    fn test_composition_defaults_to_empty() {
        let mut index = EntityIndex::new();
        assert!(index.composition(e(1)).is_empty());
        assert!(index.composition_mut(e(1)).is_empty());
    }

    #[test]
    fn test_dirty_only_once_per_cycle() {
        let mut index = EntityIndex::new();
        index.mark_alive(e(1));
        assert!(index.mark_dirty(e(1)));
        assert!(!index.mark_dirty(e(1)));
        index.set_bit(e(1), bit(0));
        index.set_bit(e(1), bit(1));
        assert_eq!(index.dirty(), &[e(1)]);

        index.clear_dirty();
        assert!(index.dirty().is_empty());
        assert!(index.mark_dirty(e(1)));
    }

    #[test]
    fn test_dead_entities_are_ignored() {
        let mut index = EntityIndex::new();
        assert!(!index.mark_dirty(e(9)));
        assert!(!index.set_bit(e(9), bit(0)));
        assert!(!index.clear_bit(e(9), bit(0)));
        assert!(!index.mark_destroyed(e(9)));
        assert!(index.dirty().is_empty());
        assert!(index.composition(e(9)).is_empty());
    }

    #[test]
    fn test_bit_changes_mark_dirty_only_when_changed() {
        let mut index = EntityIndex::new();
        index.mark_alive(e(1));
        assert!(index.set_bit(e(1), bit(2)));
        assert!(index.is_dirty(e(1)));
        index.clear_dirty();

        // Setting an already-set bit is not a composition change.
        index.set_bit(e(1), bit(2));
        assert!(!index.is_dirty(e(1)));

        // Neither is clearing an unset bit.
        index.clear_bit(e(1), bit(5));
        assert!(!index.is_dirty(e(1)));

        index.clear_bit(e(1), bit(2));
        assert!(index.is_dirty(e(1)));
        assert!(index.composition(e(1)).is_empty());
    }

    #[test]
    fn test_destroy_defers_removal() {
        let mut index = EntityIndex::new();
        index.mark_alive(e(1));
        index.set_bit(e(1), bit(0));
        index.clear_dirty();

        assert!(index.mark_destroyed(e(1)));
        assert!(!index.mark_destroyed(e(1)));
        assert!(index.is_alive(e(1)));
        assert!(index.is_pending_removal(e(1)));
        assert!(index.composition(e(1)).contains(bit(0)));

        // Still mutable while pending.
        assert!(index.set_bit(e(1), bit(1)));
        assert!(index.is_dirty(e(1)));
    }

    #[test]
    fn test_purge_forgets_entity() {
        let mut index = EntityIndex::new();
        index.mark_alive(e(1));
        index.set_bit(e(1), bit(0));
        index.clear_dirty();
        index.mark_destroyed(e(1));

        let destroyed = index.take_destroyed();
        assert_eq!(destroyed, vec![e(1)]);
        index.purge(e(1));

        assert!(!index.is_alive(e(1)));
        assert!(!index.is_pending_removal(e(1)));
        assert!(index.composition(e(1)).is_empty());
        assert_eq!(index.dirty(), &[e(1)]);
        assert_eq!(index.alive_count(), 0);
    }
}
