//! # Component Type Registrar
//!
//! Maps each component type to a dense [`ComponentId`].
//!
//! The table is an explicit value rather than process-global state: every
//! registry owns one unless it is handed a shared registrar, so independently
//! built registries in one test run never see each other's ids.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use parking_lot::RwLock;

use super::component::{Component, ComponentId};
use crate::error::{EcsError, EcsResult};

/// Type table behind the lock.
#[derive(Default)]
struct RegistrarTable {
    /// Type to dense id.
    ids: HashMap<TypeId, ComponentId>,
    /// Type names indexed by id, for diagnostics.
    names: Vec<&'static str>,
}

/// Assigns stable, dense ids to component types.
///
/// Ids are handed out in first-call order starting at 0, with no gaps.
/// The registrar refuses to register more types than `limit`, the width of
/// every signature built against it.
///
/// The table sits behind a `RwLock` so one designated registrar can be shared
/// (`Arc`) by several registries. Lookups of known types take the read lock
/// only.
pub struct ComponentRegistrar {
    /// Signature width; maximum number of distinct component types.
    limit: usize,
    /// The type table.
    table: RwLock<RegistrarTable>,
}

impl ComponentRegistrar {
    /// Creates an empty registrar accepting up to `limit` component types.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            table: RwLock::new(RegistrarTable::default()),
        }
    }

    /// Returns the id of `T`, assigning the next free id on first use.
    ///
    /// # Errors
    ///
    /// [`EcsError::ComponentLimit`] if `T` is new and the table is full.
    pub fn id_of<T: Component>(&self) -> EcsResult<ComponentId> {
        let type_id = TypeId::of::<T>();
        if let Some(&id) = self.table.read().ids.get(&type_id) {
            return Ok(id);
        }

        let mut table = self.table.write();
        // Another registry sharing this registrar may have won the race.
        if let Some(&id) = table.ids.get(&type_id) {
            return Ok(id);
        }
        if table.names.len() >= self.limit {
            return Err(EcsError::ComponentLimit {
                limit: self.limit,
                component: type_name::<T>(),
            });
        }

        let id = ComponentId::new(u32::try_from(table.names.len()).map_err(|_| {
            EcsError::ComponentLimit {
                limit: self.limit,
                component: type_name::<T>(),
            }
        })?);
        table.ids.insert(type_id, id);
        table.names.push(type_name::<T>());
        tracing::debug!(component = type_name::<T>(), id = id.index(), "component type registered");
        Ok(id)
    }

    /// Returns the id of `T` if it was ever registered, without assigning one.
    #[must_use]
    pub fn lookup<T: Component>(&self) -> Option<ComponentId> {
        self.table.read().ids.get(&TypeId::of::<T>()).copied()
    }

    /// Returns the type name registered under `id`.
    #[must_use]
    pub fn name(&self, id: ComponentId) -> Option<&'static str> {
        self.table.read().names.get(id.index()).copied()
    }

    /// Number of component types registered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.read().names.len()
    }

    /// Whether no component type has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of component types (the signature width).
    #[inline]
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }
}

impl Default for ComponentRegistrar {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_COMPONENT_TYPES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct A;
    impl Component for A {}

    #[derive(Default)]
    struct B;
    impl Component for B {}

    #[derive(Default)]
    struct C;
    impl Component for C {}

    #[test]
    fn test_ids_are_dense_and_stable() {
        let registrar = ComponentRegistrar::new(8);
        let a = registrar.id_of::<A>().unwrap();
        let b = registrar.id_of::<B>().unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(registrar.id_of::<A>().unwrap(), a);
        assert_eq!(registrar.len(), 2);
    }

    #[test]
    fn test_independent_registrars_do_not_share_ids() {
        let first = ComponentRegistrar::new(8);
        let second = ComponentRegistrar::new(8);
        first.id_of::<A>().unwrap();
        assert_eq!(second.id_of::<B>().unwrap().index(), 0);
    }

    #[test]
    fn test_lookup_does_not_assign() {
        let registrar = ComponentRegistrar::new(8);
        assert!(registrar.lookup::<A>().is_none());
        assert!(registrar.is_empty());
        let id = registrar.id_of::<A>().unwrap();
        assert_eq!(registrar.lookup::<A>(), Some(id));
        assert!(registrar.name(id).unwrap().ends_with("A"));
    }

    #[test]
    fn test_limit_is_enforced() {
        let registrar = ComponentRegistrar::new(2);
        registrar.id_of::<A>().unwrap();
        registrar.id_of::<B>().unwrap();
        let err = registrar.id_of::<C>().unwrap_err();
        assert!(matches!(err, EcsError::ComponentLimit { limit: 2, .. }));
        // Known types still resolve once the table is full.
        assert_eq!(registrar.id_of::<A>().unwrap().index(), 0);
    }
}
