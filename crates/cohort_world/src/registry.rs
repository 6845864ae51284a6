//! The registry: bit assignment, storages, the entity index and the view
//! cache, driven one cycle at a time.
//!
//! A registry is an explicit context object. Nothing here is global, and
//! two registries never share bits, entities or views.

use std::collections::HashMap;

use cohort_component::{
    BitIndex, Component, ComponentTypeId, CompositionSet, Entity, EntityAllocator, Filter,
    QueryDescriptor,
};
use tracing::{debug, warn};

use crate::bits::BitTable;
use crate::bundle::ComponentBundle;
use crate::config::RegistryConfig;
use crate::entity_index::EntityIndex;
use crate::error::{RegistryError, Result};
use crate::storage::{ComponentStorage, Storage, StorageHandle};
use crate::view::{View, ViewId};

/// What one [`Registry::update`] call did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateReport {
    /// Cycle number, starting at 1 for the first update.
    pub cycle: u64,
    /// Entities purged from every storage and view.
    pub purged: usize,
    /// Entities re-tested against the views.
    pub dirty: usize,
    /// View insertions, summed over all views.
    pub added: usize,
    /// View removals, summed over all views.
    pub removed: usize,
}

/// Owns every entity, component storage and cached view of one simulation.
pub struct Registry {
    /// Source of new entity handles.
    allocator: EntityAllocator,
    /// Component type to bit assignment.
    bits: BitTable,
    /// One storage per component type that has been written or registered.
    storages: HashMap<ComponentTypeId, Box<dyn ComponentStorage>>,
    /// Alive, dirty and destroyed tracking plus compositions.
    index: EntityIndex,
    /// Cached views, indexed by [`ViewId`].
    views: Vec<View>,
    /// Structural lookup from filter to its cached view.
    view_lookup: HashMap<Filter, ViewId>,
    /// Completed update cycles.
    cycle: u64,
}

impl Registry {
    /// Create an empty registry with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry sized by `config`.
    #[must_use]
    pub fn with_config(config: RegistryConfig) -> Self {
        let capacity = config.effective_max_component_types();
        if capacity < config.max_component_types {
            warn!(
                requested = config.max_component_types,
                capacity, "component capacity clamped to composition width"
            );
        }
        Self {
            allocator: EntityAllocator::new(),
            bits: BitTable::new(capacity),
            storages: HashMap::new(),
            index: EntityIndex::with_capacity(config.entity_capacity),
            views: Vec::new(),
            view_lookup: HashMap::new(),
            cycle: 0,
        }
    }

    // -- Component types --

    /// Assign the next bit to `T` and create its storage.
    ///
    /// Registering a type that already has a bit is an error, including a
    /// type that was auto-registered earlier by [`query`](Self::query).
    pub fn register<T: Component>(&mut self) -> Result<StorageHandle> {
        let bit = self.bits.assign(T::component_type_id())?;
        debug!(component = T::type_name(), %bit, "registered component type");
        Ok(self.attach_storage::<T>(bit))
    }

    /// The storage handle for `T`, registering it on first use.
    pub fn resolve<T: Component>(&mut self) -> Result<StorageHandle> {
        let type_id = T::component_type_id();
        if let Some(storage) = self.storages.get(&type_id) {
            if !storage.as_any().is::<Storage<T>>() {
                return Err(RegistryError::StorageTypeMismatch {
                    type_id,
                    name: T::type_name(),
                });
            }
            return Ok(StorageHandle {
                type_id,
                bit: storage.bit(),
            });
        }
        let bit = match self.bits.get(type_id) {
            Some(bit) => bit,
            None => {
                let bit = self.bits.assign(type_id)?;
                debug!(component = T::type_name(), %bit, "registered component type");
                bit
            }
        };
        Ok(self.attach_storage::<T>(bit))
    }

    fn attach_storage<T: Component>(&mut self, bit: BitIndex) -> StorageHandle {
        let storage = Storage::<T>::new(bit);
        let handle = storage.handle();
        self.storages.insert(handle.type_id, Box::new(storage));
        handle
    }

    /// Bit of a component type, without registering it.
    #[must_use]
    pub fn bit_of(&self, type_id: ComponentTypeId) -> Option<BitIndex> {
        self.bits.get(type_id)
    }

    /// Number of component types with an assigned bit.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.bits.len()
    }

    /// Typed storage for `T`, if one exists.
    #[must_use]
    pub fn storage<T: Component>(&self) -> Option<&Storage<T>> {
        self.storages
            .get(&T::component_type_id())?
            .as_any()
            .downcast_ref::<Storage<T>>()
    }

    fn storage_mut<T: Component>(&mut self) -> Option<&mut Storage<T>> {
        self.storages
            .get_mut(&T::component_type_id())?
            .as_any_mut()
            .downcast_mut::<Storage<T>>()
    }

    // -- Entities --

    /// Allocate a new, alive entity with an empty composition.
    ///
    /// The entity starts out dirty so that views whose filter only excludes
    /// components pick it up at the next update.
    pub fn create(&mut self) -> Entity {
        let entity = self.allocator.allocate();
        self.index.mark_alive(entity);
        self.index.mark_dirty(entity);
        entity
    }

    /// Allocate a new entity and write every component of `bundle` to it.
    ///
    /// Either the whole bundle is attached or no entity is left behind: a
    /// bundle that cannot fit in the bit table fails before allocating, and
    /// an insert that fails partway discards the entity on the spot.
    pub fn create_with<B: ComponentBundle>(&mut self, bundle: B) -> Result<Entity> {
        self.bits.ensure_room(B::component_types())?;
        let entity = self.create();
        if let Err(err) = bundle.insert_into(self, entity) {
            self.discard(entity);
            return Err(err);
        }
        Ok(entity)
    }

    /// Remove a half-built entity immediately, without waiting for the
    /// next update. It never reached a view, so only storages need purging.
    fn discard(&mut self, entity: Entity) {
        for storage in self.storages.values_mut() {
            storage.purge(entity, &mut self.index);
        }
        self.index.purge(entity);
        warn!(%entity, "discarded partially built entity");
    }

    /// Schedule `entity` for removal at the next [`update`](Self::update).
    ///
    /// The entity stays alive, visible and mutable until then. Returns
    /// `false` if it is not alive or already scheduled.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        self.index.mark_destroyed(entity)
    }

    /// Whether `entity` is alive, including while pending removal.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.index.is_alive(entity)
    }

    /// Whether `entity` is scheduled for removal at the next update.
    #[must_use]
    pub fn is_pending_removal(&self, entity: Entity) -> bool {
        self.index.is_pending_removal(entity)
    }

    /// Current composition of `entity`; empty for dead entities.
    #[must_use]
    pub fn composition(&self, entity: Entity) -> CompositionSet {
        self.index.composition(entity)
    }

    /// Number of alive entities.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.index.alive_count()
    }

    /// Alive entities, including those pending removal.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        self.index.alive()
    }

    /// Read-only access to alive, dirty and destroyed tracking.
    #[must_use]
    pub fn entity_index(&self) -> &EntityIndex {
        &self.index
    }

    // -- Components --

    /// Attach `value` to `entity`, registering `T` if needed.
    ///
    /// Returns `Ok(false)` without touching anything when `entity` is not
    /// alive.
    pub fn insert<T: Component>(&mut self, entity: Entity, value: T) -> Result<bool> {
        if !self.index.is_alive(entity) {
            return Ok(false);
        }
        self.resolve::<T>()?;
        let type_id = T::component_type_id();
        let storage = self
            .storages
            .get_mut(&type_id)
            .and_then(|storage| storage.as_any_mut().downcast_mut::<Storage<T>>())
            .ok_or(RegistryError::StorageTypeMismatch {
                type_id,
                name: T::type_name(),
            })?;
        Ok(storage.set(&mut self.index, entity, value))
    }

    /// Detach `T` from `entity`. Never registers `T`.
    pub fn remove<T: Component>(&mut self, entity: Entity) -> Option<T> {
        let type_id = T::component_type_id();
        let storage = self
            .storages
            .get_mut(&type_id)?
            .as_any_mut()
            .downcast_mut::<Storage<T>>()?;
        storage.remove(&mut self.index, entity)
    }

    /// The `T` attached to `entity`, if any.
    #[must_use]
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        self.storage::<T>()?.get(entity)
    }

    /// Mutable access to `entity`'s `T`. Editing a value in place does not
    /// mark the entity dirty.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.storage_mut::<T>()?.get_mut(entity)
    }

    /// Whether `entity`'s composition holds the bit for `T`.
    #[must_use]
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        self.bits
            .get(T::component_type_id())
            .is_some_and(|bit| self.index.composition(entity).contains(bit))
    }

    // -- Views --

    /// The cached view for `descriptor`, building it on first request.
    ///
    /// Unknown component types are registered on the fly; if they do not all
    /// fit, none of them is registered. Descriptors that resolve to the same
    /// masks share one view. A new view is seeded by scanning every alive
    /// entity's current composition, so it reflects changes not yet
    /// synchronized.
    pub fn query(&mut self, descriptor: &QueryDescriptor) -> Result<ViewId> {
        self.bits.ensure_room(descriptor.component_types())?;
        let bits = &mut self.bits;
        let filter = Filter::resolve(descriptor, |type_id| bits.get_or_assign(type_id))?;
        if let Some(&id) = self.view_lookup.get(&filter) {
            return Ok(id);
        }

        let id = ViewId(self.views.len());
        let mut view = View::new(id, filter);
        view.seed(&self.index);
        debug!(
            view = id.index(),
            include = ?filter.include(),
            exclude = ?filter.exclude(),
            seeded = view.len(),
            "created view"
        );
        if !filter.is_satisfiable() {
            warn!(view = id.index(), "view filter requires and forbids the same component");
        }
        self.views.push(view);
        self.view_lookup.insert(filter, id);
        Ok(id)
    }

    /// [`query`](Self::query), returning the view itself.
    pub fn query_view(&mut self, descriptor: &QueryDescriptor) -> Result<&View> {
        let id = self.query(descriptor)?;
        Ok(&self.views[id.index()])
    }

    /// The cached view with id `id`.
    #[must_use]
    pub fn view(&self, id: ViewId) -> Option<&View> {
        self.views.get(id.index())
    }

    /// Every cached view, in creation order.
    #[must_use]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    // -- Cycle --

    /// Number of completed [`update`](Self::update) calls.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Run one cycle: purge destroyed entities from every storage,
    /// synchronize every view against the dirty entities, then reset the
    /// dirty and destroyed sets.
    ///
    /// Call exactly once per logical frame. Views are only guaranteed to be
    /// exact right after this returns.
    pub fn update(&mut self) -> UpdateReport {
        self.cycle += 1;

        let destroyed = self.index.take_destroyed();
        for &entity in &destroyed {
            for storage in self.storages.values_mut() {
                storage.purge(entity, &mut self.index);
            }
            self.index.purge(entity);
        }

        let mut report = UpdateReport {
            cycle: self.cycle,
            purged: destroyed.len(),
            dirty: self.index.dirty().len(),
            ..UpdateReport::default()
        };
        for view in &mut self.views {
            let delta = view.synchronize(&self.index);
            report.added += delta.added;
            report.removed += delta.removed;
        }
        self.index.clear_dirty();

        debug!(
            cycle = report.cycle,
            purged = report.purged,
            dirty = report.dirty,
            added = report.added,
            removed = report.removed,
            views = self.views.len(),
            "registry updated"
        );
        report
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("cycle", &self.cycle)
            .field("components", &self.bits.len())
            .field("alive", &self.index.alive_count())
            .field("allocated", &self.allocator.allocated())
            .field("views", &self.views.len())
            .finish()
    }
}
