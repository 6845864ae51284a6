//! Query descriptors and the filters built from them.
//!
//! A [`QueryDescriptor`] names component types: those an entity must hold
//! and those it must not. Resolving it against a registry's bit assignment
//! yields a [`Filter`], a pair of composition masks:
//!
//! ```text
//! matches(c) := (c ∩ include == include) AND (c ∩ exclude == ∅)
//! ```
//!
//! Filters compare and hash by their masks alone. Two descriptors that list
//! the same types in a different order, or list a type twice, resolve to the
//! same filter and therefore share one cached view.

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentTypeId};
use crate::composition::{BitIndex, CompositionSet};

/// The component types a query requires and forbids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Types every matching entity must hold.
    #[serde(default)]
    pub contains: Vec<ComponentTypeId>,
    /// Types no matching entity may hold.
    #[serde(default)]
    pub excludes: Vec<ComponentTypeId>,
}

impl QueryDescriptor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require component `T`.
    #[must_use]
    pub fn with<T: Component>(self) -> Self {
        self.with_type(T::component_type_id())
    }

    /// Forbid component `T`.
    #[must_use]
    pub fn without<T: Component>(self) -> Self {
        self.without_type(T::component_type_id())
    }

    #[must_use]
    pub fn with_type(mut self, type_id: ComponentTypeId) -> Self {
        self.contains.push(type_id);
        self
    }

    #[must_use]
    pub fn without_type(mut self, type_id: ComponentTypeId) -> Self {
        self.excludes.push(type_id);
        self
    }

    /// Every type the descriptor mentions, required ones first.
    pub fn component_types(&self) -> impl Iterator<Item = ComponentTypeId> + '_ {
        self.contains.iter().chain(self.excludes.iter()).copied()
    }
}

/// Inclusion and exclusion masks deciding membership of a composition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    include: CompositionSet,
    exclude: CompositionSet,
}

impl Filter {
    #[must_use]
    pub const fn new(include: CompositionSet, exclude: CompositionSet) -> Self {
        Self { include, exclude }
    }

    /// Build a filter by mapping every type in `descriptor` to its bit.
    ///
    /// `resolve` is called once per mentioned type, in descriptor order, and
    /// the first error aborts the build.
    pub fn resolve<E, F>(descriptor: &QueryDescriptor, mut resolve: F) -> Result<Self, E>
    where
        F: FnMut(ComponentTypeId) -> Result<BitIndex, E>,
    {
        let mut include = CompositionSet::new();
        for &type_id in &descriptor.contains {
            include.insert(resolve(type_id)?);
        }
        let mut exclude = CompositionSet::new();
        for &type_id in &descriptor.excludes {
            exclude.insert(resolve(type_id)?);
        }
        Ok(Self { include, exclude })
    }

    #[must_use]
    pub fn include(&self) -> &CompositionSet {
        &self.include
    }

    #[must_use]
    pub fn exclude(&self) -> &CompositionSet {
        &self.exclude
    }

    #[inline]
    #[must_use]
    pub fn matches(&self, composition: &CompositionSet) -> bool {
        composition.is_superset(&self.include) && composition.is_disjoint(&self.exclude)
    }

    /// `false` when a type is both required and forbidden; such a filter
    /// matches nothing.
    #[must_use]
    pub fn is_satisfiable(&self) -> bool {
        self.include.is_disjoint(&self.exclude)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn bit(i: usize) -> BitIndex {
        BitIndex::new(i).unwrap()
    }

    fn set(bits: &[usize]) -> CompositionSet {
        bits.iter().copied().map(bit).collect()
    }

    fn mask(bits: u8) -> CompositionSet {
        (0..3).filter(|i| bits & (1 << i) != 0).map(bit).collect()
    }

    #[test]
    fn test_matches_exhaustive_three_types() {
        // Every composition against every include/exclude pair over 3 types.
        for comp_bits in 0u8..8 {
            for inc_bits in 0u8..8 {
                for exc_bits in 0u8..8 {
                    let composition = mask(comp_bits);
                    let filter = Filter::new(mask(inc_bits), mask(exc_bits));
                    let expected = composition.intersection(filter.include()) == *filter.include()
                        && composition.intersection(filter.exclude()).is_empty();
                    assert_eq!(
                        filter.matches(&composition),
                        expected,
                        "comp={comp_bits:03b} inc={inc_bits:03b} exc={exc_bits:03b}"
                    );
                    assert_eq!(
                        expected,
                        comp_bits & inc_bits == inc_bits && comp_bits & exc_bits == 0
                    );
                }
            }
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = Filter::default();
        assert!(filter.matches(&CompositionSet::EMPTY));
        assert!(filter.matches(&set(&[0, 9, 100])));
    }

    #[test]
    fn test_overlapping_masks_never_match() {
        let filter = Filter::new(set(&[1]), set(&[1]));
        assert!(!filter.is_satisfiable());
        assert!(!filter.matches(&set(&[1])));
        assert!(!filter.matches(&CompositionSet::EMPTY));
    }

    #[test]
    fn test_resolve_ignores_order_and_duplicates() {
        let a = ComponentTypeId::from_name("A");
        let b = ComponentTypeId::from_name("B");
        let c = ComponentTypeId::from_name("C");
        let bits: HashMap<ComponentTypeId, BitIndex> =
            [(a, bit(0)), (b, bit(1)), (c, bit(2))].into_iter().collect();
        let lookup = |id: ComponentTypeId| bits.get(&id).copied().ok_or(id);

        let first = QueryDescriptor::new().with_type(a).with_type(b).without_type(c);
        let second = QueryDescriptor::new()
            .without_type(c)
            .with_type(b)
            .with_type(a)
            .with_type(b);

        let f1 = Filter::resolve(&first, lookup).unwrap();
        let f2 = Filter::resolve(&second, lookup).unwrap();
        assert_eq!(f1, f2);
        assert_eq!(*f1.include(), set(&[0, 1]));
        assert_eq!(*f1.exclude(), set(&[2]));
    }

    #[test]
    fn test_resolve_propagates_first_error() {
        let unknown = ComponentTypeId::from_name("Unknown");
        let descriptor = QueryDescriptor::new().with_type(unknown);
        let result = Filter::resolve(&descriptor, |id| Err::<BitIndex, _>(id));
        assert_eq!(result, Err(unknown));
    }

    #[test]
    fn test_different_masks_are_different_filters() {
        let with_a = Filter::new(set(&[0]), CompositionSet::EMPTY);
        let without_a = Filter::new(CompositionSet::EMPTY, set(&[0]));
        assert_ne!(with_a, without_a);
    }

    #[test]
    fn test_descriptor_from_json() {
        let json = r#"{ "contains": [1, 2] }"#;
        let descriptor: QueryDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.contains, vec![ComponentTypeId(1), ComponentTypeId(2)]);
        assert!(descriptor.excludes.is_empty());
        assert_eq!(descriptor.component_types().count(), 2);
    }
}
