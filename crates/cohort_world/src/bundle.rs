//! Groups of components written together when an entity is created.

use cohort_component::{Component, ComponentTypeId, Entity};

use crate::error::Result;
use crate::registry::Registry;

/// A set of component values that can be attached to one entity.
///
/// Implemented for tuples of up to eight components. Each element is
/// written through [`Registry::insert`], so every write marks the entity
/// dirty exactly like an individual insert would.
pub trait ComponentBundle {
    /// Ids of the bundled component types, in tuple order.
    fn component_types() -> Vec<ComponentTypeId>;

    fn insert_into(self, registry: &mut Registry, entity: Entity) -> Result<()>;
}

impl ComponentBundle for () {
    fn component_types() -> Vec<ComponentTypeId> {
        Vec::new()
    }

    fn insert_into(self, _registry: &mut Registry, _entity: Entity) -> Result<()> {
        Ok(())
    }
}

macro_rules! impl_bundle {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentBundle for ($($name,)+) {
            fn component_types() -> Vec<ComponentTypeId> {
                vec![$($name::component_type_id()),+]
            }

            #[allow(non_snake_case)]
            fn insert_into(self, registry: &mut Registry, entity: Entity) -> Result<()> {
                let ($($name,)+) = self;
                $(registry.insert(entity, $name)?;)+
                Ok(())
            }
        }
    };
}

impl_bundle!(A);
impl_bundle!(A, B);
impl_bundle!(A, B, C);
impl_bundle!(A, B, C, D);
impl_bundle!(A, B, C, D, E);
impl_bundle!(A, B, C, D, E, F);
impl_bundle!(A, B, C, D, E, F, G);
impl_bundle!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    struct Position;
    struct Velocity;

    impl Component for Position {
        fn type_name() -> &'static str {
            "Position"
        }
    }

    impl Component for Velocity {
        fn type_name() -> &'static str {
            "Velocity"
        }
    }

    #[test]
    fn test_component_types_in_tuple_order() {
        assert_eq!(
            <(Velocity, Position)>::component_types(),
            vec![Velocity::component_type_id(), Position::component_type_id()]
        );
        assert!(<()>::component_types().is_empty());
    }

    #[test]
    fn test_insert_into_writes_every_component() {
        let mut registry = Registry::new();
        let entity = registry.create();
        (Position, Velocity).insert_into(&mut registry, entity).unwrap();
        assert!(registry.has::<Position>(entity));
        assert!(registry.has::<Velocity>(entity));
        assert_eq!(registry.composition(entity).len(), 2);
    }
}
