//! Cached, incrementally maintained views.
//!
//! A [`View`] is the materialized answer to one [`Filter`]: the set of
//! alive entities whose composition matches it. The view is seeded once by
//! a full scan and afterwards only re-tests the entities the index reports
//! as dirty.
//!
//! Synchronizing one entity is a four-way table, not a toggle:
//!
//! | in view | matches now | action  |
//! |---------|-------------|---------|
//! | yes     | no          | remove  |
//! | no      | yes         | add     |
//! | yes     | yes         | none    |
//! | no      | no          | none    |

use cohort_component::{CompositionSet, Entity, Filter};

use crate::entity_index::EntityIndex;
use crate::entity_set::EntitySet;

/// Position of a view in the registry's view arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(pub(crate) usize);

impl ViewId {
    /// Index into [`Registry::views`](crate::Registry::views).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Outcome of re-testing one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Transition {
    Added,
    Removed,
    Unchanged,
}

/// Membership changes produced by one synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncDelta {
    /// Entities that entered the view.
    pub added: usize,
    /// Entities that left the view.
    pub removed: usize,
}

/// The alive entities matching one [`Filter`], kept current by
/// [`synchronize`](Self::synchronize).
#[derive(Debug)]
pub struct View {
    /// Position in the registry's view arena.
    id: ViewId,
    /// Membership rule, fixed for the view's lifetime.
    filter: Filter,
    /// Entities that matched at the last seed or synchronization.
    members: EntitySet,
}

impl View {
    pub(crate) fn new(id: ViewId, filter: Filter) -> Self {
        Self {
            id,
            filter,
            members: EntitySet::new(),
        }
    }

    /// This view's id.
    #[must_use]
    pub fn id(&self) -> ViewId {
        self.id
    }

    /// The filter this view materializes.
    #[must_use]
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Whether `entity` is currently a member.
    #[must_use]
    pub fn has(&self, entity: Entity) -> bool {
        self.members.contains(entity)
    }

    /// Whether `composition` satisfies this view's filter.
    #[must_use]
    pub fn matches(&self, composition: &CompositionSet) -> bool {
        self.filter.matches(composition)
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in unspecified order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        self.members.as_slice()
    }

    /// Iterate the members in unspecified order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.members.iter()
    }

    pub(crate) fn add(&mut self, entity: Entity) -> bool {
        self.members.insert(entity)
    }

    pub(crate) fn remove(&mut self, entity: Entity) -> bool {
        self.members.remove(entity)
    }

    /// Cold start: test every alive entity once against its current
    /// composition.
    pub(crate) fn seed(&mut self, index: &EntityIndex) {
        for &entity in index.alive() {
            if self.filter.matches(&index.composition(entity)) {
                self.add(entity);
            }
        }
    }

    /// Re-test one entity. Dead entities never match.
    pub(crate) fn sync_entity(&mut self, entity: Entity, index: &EntityIndex) -> Transition {
        let matches = index.is_alive(entity) && self.filter.matches(&index.composition(entity));
        match (self.has(entity), matches) {
            (true, false) => {
                self.remove(entity);
                Transition::Removed
            }
            (false, true) => {
                self.add(entity);
                Transition::Added
            }
            _ => Transition::Unchanged,
        }
    }

    /// Re-test every dirty entity in `index`.
    pub(crate) fn synchronize(&mut self, index: &EntityIndex) -> SyncDelta {
        let mut delta = SyncDelta::default();
        for &entity in index.dirty() {
            match self.sync_entity(entity, index) {
                Transition::Added => delta.added += 1,
                Transition::Removed => delta.removed += 1,
                Transition::Unchanged => {}
            }
        }
        delta
    }
}

impl<'a> IntoIterator for &'a View {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
