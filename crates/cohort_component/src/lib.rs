//! # cohort_component
//!
//! Leaf types shared by every part of the cohort engine. Nothing in this
//! crate owns engine state; it only describes it.
//!
//! This crate provides:
//!
//! - [`Entity`] — opaque `u64` handles and the [`EntityAllocator`] that
//!   hands them out.
//! - [`Component`] and [`ComponentTypeId`] — static, name-derived identity
//!   for component types.
//! - [`BitIndex`] and [`CompositionSet`] — the bit-level representation of
//!   which component types an entity currently holds.
//! - [`QueryDescriptor`] and [`Filter`] — what a query asks for, and the
//!   inclusion/exclusion masks that decide membership.

pub mod component;
pub mod composition;
pub mod entity;
pub mod query;

pub use component::{Component, ComponentTypeId};
pub use composition::{BitIndex, CompositionSet, MAX_COMPONENTS};
pub use entity::{Entity, EntityAllocator};
pub use query::{Filter, QueryDescriptor};
