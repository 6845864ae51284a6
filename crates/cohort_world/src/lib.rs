//! # cohort_world
//!
//! The engine half of cohort: who is alive, what each entity is composed of,
//! and a cache of views kept correct as compositions change.
//!
//! ## Cycle model
//!
//! Everything is single-threaded and cycle-driven. Between two calls to
//! [`Registry::update`], component writes flip bits in the
//! [`EntityIndex`] and mark entities dirty, and [`Registry::destroy`] only
//! schedules removal. `update()` then:
//!
//! 1. purges every destroyed entity from every storage,
//! 2. re-tests each dirty entity against each cached [`View`],
//! 3. clears the dirty and destroyed sets.
//!
//! Right after `update()`, every view's membership equals exactly the set of
//! alive entities whose composition matches its filter.

pub mod bits;
pub mod bundle;
pub mod config;
pub mod entity_index;
pub mod entity_set;
pub mod error;
pub mod registry;
pub mod storage;
pub mod view;

pub use bits::BitTable;
pub use bundle::ComponentBundle;
pub use config::RegistryConfig;
pub use entity_index::EntityIndex;
pub use entity_set::EntitySet;
pub use error::{RegistryError, Result};
pub use registry::{Registry, UpdateReport};
pub use storage::{ComponentStorage, Storage, StorageHandle};
pub use view::{View, ViewId};

pub use cohort_component::{
    BitIndex, Component, ComponentTypeId, CompositionSet, Entity, Filter, QueryDescriptor,
    MAX_COMPONENTS,
};
