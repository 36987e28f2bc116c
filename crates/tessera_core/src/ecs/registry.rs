//! # Registry
//!
//! The single owner of entities, component pools, signatures and systems,
//! and the only place structural changes are applied.
//!
//! ## Deferred mutation
//!
//! ```text
//! create_entity() ──> pending_add ────┐
//! kill_entity()   ──> pending_remove ─┤
//! add/remove component on live ──> dirty
//!                                     │
//!                 update() (once per tick, before systems run)
//!                                     │
//!   1. back-fill systems added since the last barrier
//!   2. promote pending adds, match them into systems
//!   3. re-match dirty live entities
//!   4. drop pending removes from systems, reset signature,
//!      bump generation, queue the index for reuse
//! ```
//!
//! Systems therefore see one stable member list for the whole tick, even
//! when their own update kills or creates entities.

use std::any::{type_name, TypeId};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::Arc;

use super::component::{Component, ComponentId};
use super::entity::{Entity, EntityState};
use super::pool::{ErasedPool, Pool};
use super::registrar::ComponentRegistrar;
use super::signature::Signature;
use super::system::{AsAny, System};
use crate::config::RegistryConfig;
use crate::error::{EcsError, EcsResult};

/// Per-index bookkeeping.
#[derive(Clone, Copy, Debug, Default)]
struct Slot {
    /// Bumped every time the barrier recycles the index.
    generation: u32,
    /// Lifecycle state.
    state: EntityState,
}

/// The ECS registry.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = Registry::new();
/// registry.add_system(MovementSystem::new(registry.registrar())?)?;
///
/// let e = registry.create_entity();
/// registry.add_component(e, Position { x: 1.0, y: 1.0 })?;
/// registry.add_component(e, Velocity { x: 2.0, y: 0.0 })?;
///
/// registry.update(); // `e` becomes visible to MovementSystem
/// ```
pub struct Registry {
    /// Type table shared with every system built for this registry.
    registrar: Arc<ComponentRegistrar>,
    /// Sizing parameters.
    config: RegistryConfig,
    /// One pool per component id, created on first use.
    pools: Vec<Option<Box<dyn ErasedPool>>>,
    /// Component signature per entity index.
    signatures: Vec<Signature>,
    /// Generation and state per entity index.
    slots: Vec<Slot>,
    /// Registered systems, one per concrete type.
    systems: HashMap<TypeId, Box<dyn System>>,
    /// Systems registered since the last barrier, awaiting back-fill.
    unsynced_systems: Vec<TypeId>,
    /// Indices created since the last barrier.
    pending_add: BTreeSet<u32>,
    /// Indices killed since the last barrier.
    pending_remove: BTreeSet<u32>,
    /// Live indices whose signature changed since the last barrier.
    dirty: BTreeSet<u32>,
    /// Recycled indices, reused first-in first-out.
    free_ids: VecDeque<u32>,
    /// Next never-used index.
    next_index: u32,
    /// Slots currently reserved in signatures and every pool.
    capacity: usize,
    /// Entities created and not yet recycled.
    alive_count: usize,
    /// Systems currently detached by `system_scope`, innermost last.
    scopes: Vec<(TypeId, &'static str)>,
}

impl Registry {
    /// Creates a registry with default sizing and its own registrar.
    #[must_use]
    pub fn new() -> Self {
        let config = RegistryConfig::default();
        let registrar = Arc::new(ComponentRegistrar::new(config.max_component_types));
        Self::build(config, registrar)
    }

    /// Creates a registry with its own registrar sized by `config`.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`] if `config` fails validation.
    pub fn with_config(config: RegistryConfig) -> EcsResult<Self> {
        config.validate()?;
        let registrar = Arc::new(ComponentRegistrar::new(config.max_component_types));
        Ok(Self::build(config, registrar))
    }

    /// Creates a registry that shares a designated registrar.
    ///
    /// The registrar's limit overrides `config.max_component_types` so that
    /// every signature built against it has the same width.
    ///
    /// # Errors
    ///
    /// [`EcsError::InvalidConfig`] if the resulting config fails validation,
    /// including a registrar with a limit of zero.
    pub fn with_registrar(
        mut config: RegistryConfig,
        registrar: Arc<ComponentRegistrar>,
    ) -> EcsResult<Self> {
        config.max_component_types = registrar.limit();
        config.validate()?;
        Ok(Self::build(config, registrar))
    }

    fn build(config: RegistryConfig, registrar: Arc<ComponentRegistrar>) -> Self {
        let capacity = config.initial_entity_capacity;
        let width = registrar.limit();
        tracing::info!(
            component_limit = width,
            initial_capacity = capacity,
            "registry created"
        );

        Self {
            registrar,
            config,
            pools: Vec::new(),
            signatures: vec![Signature::new(width); capacity],
            slots: vec![Slot::default(); capacity],
            systems: HashMap::new(),
            unsynced_systems: Vec::new(),
            pending_add: BTreeSet::new(),
            pending_remove: BTreeSet::new(),
            dirty: BTreeSet::new(),
            free_ids: VecDeque::new(),
            next_index: 0,
            capacity,
            alive_count: 0,
            scopes: Vec::new(),
        }
    }

    /// The component registrar. Pass it to system constructors.
    #[inline]
    #[must_use]
    pub fn registrar(&self) -> &Arc<ComponentRegistrar> {
        &self.registrar
    }

    /// The sizing parameters in effect.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // =========================================================================
    // Barrier
    // =========================================================================

    /// Applies every staged structural change.
    ///
    /// Must be called exactly once per tick, before any system reads its
    /// member list for that tick. Calling it again with nothing staged
    /// changes nothing.
    ///
    /// # Panics
    ///
    /// Panics when called from inside [`system_scope`](Self::system_scope):
    /// the detached system would miss this barrier.
    pub fn update(&mut self) {
        self.assert_unscoped("update");
        let _span = tracing::trace_span!("registry_update").entered();

        // Systems registered since the last barrier pick up current live entities.
        for type_id in std::mem::take(&mut self.unsynced_systems) {
            let Some(system) = self.systems.get_mut(&type_id) else {
                continue;
            };
            let core = system.core_mut();
            for (index, slot) in self.slots.iter().enumerate().take(self.next_index as usize) {
                if matches!(slot.state, EntityState::Live | EntityState::PendingRemove)
                    && self.signatures[index].is_superset_of(core.signature())
                {
                    core.add(Entity::new(index as u32, slot.generation));
                }
            }
        }

        for index in std::mem::take(&mut self.pending_add) {
            let slot = &mut self.slots[index as usize];
            slot.state = EntityState::Live;
            let entity = Entity::new(index, slot.generation);
            let signature = &self.signatures[index as usize];

            for system in self.systems.values_mut() {
                if signature.is_superset_of(system.core().signature()) {
                    system.core_mut().add(entity);
                }
            }
            tracing::debug!(entity = %entity, "entity promoted");
        }

        for index in std::mem::take(&mut self.dirty) {
            let slot = self.slots[index as usize];
            if slot.state != EntityState::Live {
                continue;
            }
            let entity = Entity::new(index, slot.generation);
            let signature = &self.signatures[index as usize];

            for system in self.systems.values_mut() {
                let core = system.core_mut();
                if signature.is_superset_of(core.signature()) {
                    core.add(entity);
                } else {
                    core.remove(entity);
                }
            }
        }

        for index in std::mem::take(&mut self.pending_remove) {
            let slot = &mut self.slots[index as usize];
            let entity = Entity::new(index, slot.generation);

            for system in self.systems.values_mut() {
                system.core_mut().remove(entity);
            }

            self.signatures[index as usize].reset();
            slot.state = EntityState::Unused;
            slot.generation = slot.generation.wrapping_add(1);
            self.free_ids.push_back(index);
            self.alive_count -= 1;
            tracing::debug!(entity = %entity, "entity recycled");
        }
    }

    // =========================================================================
    // Entity management
    // =========================================================================

    /// Creates an entity.
    ///
    /// Recycled indices are reused first-in first-out before fresh ones are
    /// handed out. The entity is staged for addition: components may be
    /// attached right away, but no system sees it until the next
    /// [`update`](Self::update).
    ///
    /// # Panics
    ///
    /// Panics if all 2^32 - 1 indices are in use.
    pub fn create_entity(&mut self) -> Entity {
        let index = if let Some(index) = self.free_ids.pop_front() {
            index
        } else {
            assert!(self.next_index < u32::MAX, "entity index space exhausted");
            let index = self.next_index;
            self.next_index += 1;
            self.grow_to(index as usize + 1);
            index
        };

        let slot = &mut self.slots[index as usize];
        slot.state = EntityState::PendingAdd;
        let entity = Entity::new(index, slot.generation);
        self.pending_add.insert(index);
        self.alive_count += 1;

        tracing::debug!(entity = %entity, "entity created");
        entity
    }

    /// Stages `entity` for removal.
    ///
    /// Signatures, pools and system membership are untouched until the next
    /// [`update`](Self::update). An entity killed before it was ever
    /// promoted is never matched into any system.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`] if the handle was recycled.
    pub fn kill_entity(&mut self, entity: Entity) -> EcsResult<()> {
        let index = entity.index();
        match self.slot(entity)?.state {
            EntityState::PendingAdd => {
                self.pending_add.remove(&index);
            }
            EntityState::Live => {
                self.dirty.remove(&index);
            }
            EntityState::PendingRemove => {
                tracing::warn!(entity = %entity, "entity already pending removal");
                return Ok(());
            }
            EntityState::Unused => unreachable!("slot() rejects unused indices"),
        }

        self.slots[index as usize].state = EntityState::PendingRemove;
        self.pending_remove.insert(index);
        tracing::debug!(entity = %entity, "entity killed");
        Ok(())
    }

    /// Whether `entity` refers to a created, not yet recycled entity.
    #[must_use]
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.slot(entity).is_ok()
    }

    /// Lifecycle state of `entity`; `Unused` for stale handles.
    #[must_use]
    pub fn entity_state(&self, entity: Entity) -> EntityState {
        self.slot(entity).map_or(EntityState::Unused, |slot| slot.state)
    }

    /// The component signature of `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`] if the handle was recycled.
    pub fn signature(&self, entity: Entity) -> EcsResult<&Signature> {
        self.slot(entity)?;
        Ok(&self.signatures[entity.slot()])
    }

    /// Borrow-checked handle view exposing per-entity operations.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`] if the handle was recycled.
    pub fn entity_mut(&mut self, entity: Entity) -> EcsResult<EntityMut<'_>> {
        self.slot(entity)?;
        Ok(EntityMut {
            registry: self,
            entity,
        })
    }

    // =========================================================================
    // Component management
    // =========================================================================

    /// Attaches `component` to `entity`, overwriting any previous value.
    ///
    /// Valid on pending and live entities. On a live entity the change in
    /// system membership is applied at the next barrier.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`] for recycled handles,
    /// [`EcsError::ComponentLimit`] if `C` is new and the registrar is full.
    pub fn add_component<C: Component>(&mut self, entity: Entity, component: C) -> EcsResult<()> {
        let state = self.slot(entity)?.state;
        let id = self.registrar.id_of::<C>()?;
        let index = entity.slot();

        self.pool_or_insert::<C>(id)?.set(index, component);
        self.signatures[index].set(id);
        if state == EntityState::Live {
            self.dirty.insert(entity.index());
        }

        tracing::debug!(
            component = type_name::<C>(),
            component_id = id.index(),
            entity = %entity,
            "component added"
        );
        Ok(())
    }

    /// Detaches `C` from `entity`.
    ///
    /// Only the signature bit is cleared; the pool slot keeps its stale value
    /// until overwritten, and [`get_component`](Self::get_component) refuses
    /// to return it.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`] if the handle was recycled.
    pub fn remove_component<C: Component>(&mut self, entity: Entity) -> EcsResult<()> {
        let state = self.slot(entity)?.state;
        let Some(id) = self.registrar.lookup::<C>() else {
            return Ok(());
        };

        self.signatures[entity.slot()].unset(id);
        if state == EntityState::Live {
            self.dirty.insert(entity.index());
        }

        tracing::debug!(
            component = type_name::<C>(),
            component_id = id.index(),
            entity = %entity,
            "component removed"
        );
        Ok(())
    }

    /// Whether `entity` currently carries `C`.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`] if the handle was recycled.
    pub fn has_component<C: Component>(&self, entity: Entity) -> EcsResult<bool> {
        self.slot(entity)?;
        Ok(self
            .registrar
            .lookup::<C>()
            .is_some_and(|id| self.signatures[entity.slot()].test(id)))
    }

    /// The `C` value of `entity`.
    ///
    /// # Errors
    ///
    /// [`EcsError::StaleEntity`] for recycled handles,
    /// [`EcsError::MissingComponent`] if `entity` does not carry `C`.
    pub fn get_component<C: Component>(&self, entity: Entity) -> EcsResult<&C> {
        let id = self.present_id::<C>(entity)?;
        Ok(self.pool::<C>(id)?.get(entity.slot()))
    }

    /// The `C` value of `entity`, mutably.
    ///
    /// # Errors
    ///
    /// Same as [`get_component`](Self::get_component).
    pub fn get_component_mut<C: Component>(&mut self, entity: Entity) -> EcsResult<&mut C> {
        let id = self.present_id::<C>(entity)?;
        Ok(self.pool_mut::<C>(id)?.get_mut(entity.slot()))
    }

    // =========================================================================
    // System management
    // =========================================================================

    /// Registers `system` as the singleton of its type.
    ///
    /// Entities that are already live join it at the next barrier.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemAlreadyRegistered`] if one of type `S` exists,
    /// including one detached by [`system_scope`](Self::system_scope).
    pub fn add_system<S: System>(&mut self, system: S) -> EcsResult<()> {
        let type_id = TypeId::of::<S>();
        let scoped = self.scopes.iter().any(|&(t, _)| t == type_id);
        if scoped || self.systems.contains_key(&type_id) {
            return Err(EcsError::SystemAlreadyRegistered {
                system: type_name::<S>(),
            });
        }

        tracing::info!(system = type_name::<S>(), "system added");
        self.systems.insert(type_id, Box::new(system));
        self.unsynced_systems.push(type_id);
        Ok(())
    }

    /// Unregisters the system of type `S`, returning it.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotFound`] if none is registered.
    pub fn remove_system<S: System>(&mut self) -> EcsResult<Box<S>> {
        let type_id = TypeId::of::<S>();
        let boxed = self.systems.remove(&type_id).ok_or(EcsError::SystemNotFound {
            system: type_name::<S>(),
        })?;
        self.unsynced_systems.retain(|&t| t != type_id);
        tracing::info!(system = type_name::<S>(), "system removed");

        let any: Box<dyn std::any::Any> = AsAny::into_any(boxed);
        any.downcast::<S>().map_err(|_| EcsError::SystemNotFound {
            system: type_name::<S>(),
        })
    }

    /// Whether a system of type `S` is registered.
    #[must_use]
    pub fn has_system<S: System>(&self) -> bool {
        self.systems.contains_key(&TypeId::of::<S>())
    }

    /// The system of type `S`.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotFound`] if none is registered.
    pub fn get_system<S: System>(&self) -> EcsResult<&S> {
        let boxed = self.systems.get(&TypeId::of::<S>()).ok_or(EcsError::SystemNotFound {
            system: type_name::<S>(),
        })?;
        let system: &dyn System = &**boxed;
        system
            .as_any()
            .downcast_ref::<S>()
            .ok_or(EcsError::SystemNotFound {
                system: type_name::<S>(),
            })
    }

    /// The system of type `S`, mutably.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotFound`] if none is registered.
    pub fn get_system_mut<S: System>(&mut self) -> EcsResult<&mut S> {
        let boxed = self
            .systems
            .get_mut(&TypeId::of::<S>())
            .ok_or(EcsError::SystemNotFound {
                system: type_name::<S>(),
            })?;
        let system: &mut dyn System = &mut **boxed;
        system
            .as_any_mut()
            .downcast_mut::<S>()
            .ok_or(EcsError::SystemNotFound {
                system: type_name::<S>(),
            })
    }

    /// Copy of the member list of system `S` for this tick.
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotFound`] if none is registered.
    pub fn system_entities<S: System>(&self) -> EcsResult<Vec<Entity>> {
        Ok(self.get_system::<S>()?.core().entities().to_vec())
    }

    /// Runs `f` with system `S` and the registry borrowed side by side.
    ///
    /// The system is detached from the registry for the duration of the
    /// call, so `f` may read and write components of the system's members.
    /// Scopes nest. Inside `f`, registering another `S` fails with
    /// [`EcsError::SystemAlreadyRegistered`] and removing `S` fails with
    /// [`EcsError::SystemNotFound`].
    ///
    /// # Errors
    ///
    /// [`EcsError::SystemNotFound`] if none is registered.
    ///
    /// # Panics
    ///
    /// If `f` calls [`update`](Self::update) or [`clear`](Self::clear).
    pub fn system_scope<S, R, F>(&mut self, f: F) -> EcsResult<R>
    where
        S: System,
        F: FnOnce(&mut S, &mut Self) -> R,
    {
        let type_id = TypeId::of::<S>();
        let mut boxed = self.systems.remove(&type_id).ok_or(EcsError::SystemNotFound {
            system: type_name::<S>(),
        })?;

        self.scopes.push((type_id, type_name::<S>()));
        let result = {
            let system: &mut dyn System = &mut *boxed;
            system
                .as_any_mut()
                .downcast_mut::<S>()
                .map(|system| f(system, self))
                .ok_or(EcsError::SystemNotFound {
                    system: type_name::<S>(),
                })
        };
        self.scopes.pop();

        self.systems.insert(type_id, boxed);
        result
    }

    /// Number of registered systems.
    #[must_use]
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Entities created and not yet recycled (pending, live or dying).
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Entities promoted and not killed.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .take(self.next_index as usize)
            .filter(|slot| slot.state == EntityState::Live)
            .count()
    }

    /// Distinct component types registered so far.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.registrar.len()
    }

    /// Entities waiting for promotion at the next barrier.
    #[must_use]
    pub fn pending_add_count(&self) -> usize {
        self.pending_add.len()
    }

    /// Entities waiting for removal at the next barrier.
    #[must_use]
    pub fn pending_remove_count(&self) -> usize {
        self.pending_remove.len()
    }

    /// Recycled indices waiting to be reused.
    #[must_use]
    pub fn free_id_count(&self) -> usize {
        self.free_ids.len()
    }

    /// Slots reserved in the signature table and in every pool.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of component types that have a pool.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.iter().filter(|p| p.is_some()).count()
    }

    /// Discards every entity and component, keeping registered systems.
    ///
    /// Handles issued before the call become stale. Systems are emptied.
    ///
    /// # Panics
    ///
    /// Panics when called from inside [`system_scope`](Self::system_scope).
    pub fn clear(&mut self) {
        self.assert_unscoped("clear");
        for slot in self.slots.iter_mut().take(self.next_index as usize) {
            if slot.state.is_occupied() {
                slot.generation = slot.generation.wrapping_add(1);
            }
            slot.state = EntityState::Unused;
        }
        for signature in &mut self.signatures {
            signature.reset();
        }
        for pool in self.pools.iter_mut().flatten() {
            pool.clear();
            pool.ensure_capacity(self.capacity);
        }
        for system in self.systems.values_mut() {
            system.core_mut().clear();
        }

        self.pending_add.clear();
        self.pending_remove.clear();
        self.dirty.clear();
        self.unsynced_systems.clear();
        self.free_ids = (0..self.next_index).collect();
        self.alive_count = 0;
        tracing::info!("registry cleared");
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Barrier-level operations would leave a detached system out of date.
    fn assert_unscoped(&self, operation: &str) {
        if let Some(&(_, system)) = self.scopes.last() {
            panic!("Registry::{operation} called inside system_scope of {system}");
        }
    }

    /// Validates a handle against its slot.
    fn slot(&self, entity: Entity) -> EcsResult<Slot> {
        self.slots
            .get(entity.slot())
            .copied()
            .filter(|slot| {
                entity.index() < self.next_index
                    && slot.generation == entity.generation()
                    && slot.state.is_occupied()
            })
            .ok_or(EcsError::StaleEntity {
                index: entity.index(),
                generation: entity.generation(),
            })
    }

    /// Id of `C` if `entity` carries it.
    fn present_id<C: Component>(&self, entity: Entity) -> EcsResult<ComponentId> {
        self.slot(entity)?;
        self.registrar
            .lookup::<C>()
            .filter(|&id| self.signatures[entity.slot()].test(id))
            .ok_or(EcsError::MissingComponent {
                component: type_name::<C>(),
                index: entity.index(),
            })
    }

    /// Grows signatures, slots and every pool to cover `needed` indices.
    fn grow_to(&mut self, needed: usize) {
        if needed <= self.capacity {
            return;
        }
        let capacity = needed.max(self.capacity * 2);
        let width = self.registrar.limit();

        self.signatures.resize(capacity, Signature::new(width));
        self.slots.resize(capacity, Slot::default());
        for pool in self.pools.iter_mut().flatten() {
            pool.ensure_capacity(capacity);
        }
        self.capacity = capacity;
        tracing::trace!(capacity, "registry grown");
    }

    fn pool<C: Component>(&self, id: ComponentId) -> EcsResult<&Pool<C>> {
        self.pools
            .get(id.index())
            .and_then(Option::as_ref)
            .and_then(|pool| {
                let pool: &dyn ErasedPool = &**pool;
                pool.as_any().downcast_ref::<Pool<C>>()
            })
            .ok_or(EcsError::PoolTypeMismatch {
                component: type_name::<C>(),
            })
    }

    fn pool_mut<C: Component>(&mut self, id: ComponentId) -> EcsResult<&mut Pool<C>> {
        self.pools
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .and_then(|pool| {
                let pool: &mut dyn ErasedPool = &mut **pool;
                pool.as_any_mut().downcast_mut::<Pool<C>>()
            })
            .ok_or(EcsError::PoolTypeMismatch {
                component: type_name::<C>(),
            })
    }

    /// The pool for `C`, created on first use.
    fn pool_or_insert<C: Component>(&mut self, id: ComponentId) -> EcsResult<&mut Pool<C>> {
        let index = id.index();
        if index >= self.pools.len() {
            self.pools.resize_with(index + 1, || None);
        }
        if self.pools[index].is_none() {
            tracing::debug!(component = type_name::<C>(), "pool created");
            self.pools[index] = Some(Box::new(Pool::<C>::new(self.capacity)));
        }
        self.pool_mut::<C>(id)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        tracing::info!(alive = self.alive_count, "registry dropped");
    }
}

/// Mutable view of one entity, bound to its registry for a borrow.
///
/// Offers the per-handle surface (`add_component`, `get_component`, ...)
/// without the handle itself pointing back at the registry.
pub struct EntityMut<'r> {
    registry: &'r mut Registry,
    entity: Entity,
}

impl EntityMut<'_> {
    /// The viewed handle.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> Entity {
        self.entity
    }

    /// See [`Registry::add_component`].
    ///
    /// # Errors
    ///
    /// Same as [`Registry::add_component`].
    pub fn add_component<C: Component>(&mut self, component: C) -> EcsResult<&mut Self> {
        self.registry.add_component(self.entity, component)?;
        Ok(self)
    }

    /// See [`Registry::remove_component`].
    ///
    /// # Errors
    ///
    /// Same as [`Registry::remove_component`].
    pub fn remove_component<C: Component>(&mut self) -> EcsResult<&mut Self> {
        self.registry.remove_component::<C>(self.entity)?;
        Ok(self)
    }

    /// See [`Registry::has_component`].
    ///
    /// # Errors
    ///
    /// Same as [`Registry::has_component`].
    pub fn has_component<C: Component>(&self) -> EcsResult<bool> {
        self.registry.has_component::<C>(self.entity)
    }

    /// See [`Registry::get_component`].
    ///
    /// # Errors
    ///
    /// Same as [`Registry::get_component`].
    pub fn get_component<C: Component>(&self) -> EcsResult<&C> {
        self.registry.get_component::<C>(self.entity)
    }

    /// See [`Registry::get_component_mut`].
    ///
    /// # Errors
    ///
    /// Same as [`Registry::get_component_mut`].
    pub fn get_component_mut<C: Component>(&mut self) -> EcsResult<&mut C> {
        self.registry.get_component_mut::<C>(self.entity)
    }

    /// See [`Registry::kill_entity`].
    ///
    /// # Errors
    ///
    /// Same as [`Registry::kill_entity`].
    pub fn kill(self) -> EcsResult<()> {
        self.registry.kill_entity(self.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::system::SystemCore;

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    impl Component for Position {}

    #[derive(Clone, Copy, Debug, Default, PartialEq)]
    struct Velocity {
        x: f32,
        y: f32,
    }
    impl Component for Velocity {}

    struct MovementSystem {
        core: SystemCore,
    }

    impl MovementSystem {
        fn new(registrar: &ComponentRegistrar) -> EcsResult<Self> {
            let core = SystemCore::new(registrar)
                .with::<Position>(registrar)?
                .with::<Velocity>(registrar)?;
            Ok(Self { core })
        }
    }

    impl System for MovementSystem {
        fn core(&self) -> &SystemCore {
            &self.core
        }

        fn core_mut(&mut self) -> &mut SystemCore {
            &mut self.core
        }
    }

    fn registry_with_movement() -> Registry {
        let mut registry = Registry::new();
        let system = MovementSystem::new(registry.registrar()).unwrap();
        registry.add_system(system).unwrap();
        registry
    }

    #[test]
    fn test_registry_creation() {
        let registry = Registry::new();
        assert_eq!(registry.alive_count(), 0);
        assert_eq!(registry.capacity(), 100);
        assert_eq!(registry.system_count(), 0);
    }

    #[test]
    fn test_create_is_pending_until_update() {
        let mut registry = Registry::new();
        let e = registry.create_entity();
        assert_eq!(e.index(), 0);
        assert_eq!(registry.entity_state(e), EntityState::PendingAdd);
        assert_eq!(registry.pending_add_count(), 1);

        registry.update();
        assert_eq!(registry.entity_state(e), EntityState::Live);
        assert_eq!(registry.pending_add_count(), 0);
    }

    #[test]
    fn test_kill_and_recycle() {
        let mut registry = Registry::new();
        let e1 = registry.create_entity();
        registry.update();

        registry.kill_entity(e1).unwrap();
        assert_eq!(registry.entity_state(e1), EntityState::PendingRemove);
        assert!(registry.is_alive(e1));

        registry.update();
        assert!(!registry.is_alive(e1));
        assert_eq!(registry.free_id_count(), 1);

        let e2 = registry.create_entity();
        assert_eq!(e2.index(), e1.index());
        assert_ne!(e2.generation(), e1.generation());
        assert!(registry.signature(e2).unwrap().is_empty());
    }

    #[test]
    fn test_stale_handle_is_rejected() {
        let mut registry = Registry::new();
        let e = registry.create_entity();
        registry.kill_entity(e).unwrap();
        registry.update();

        let err = registry.add_component(e, Position::default()).unwrap_err();
        assert_eq!(
            err,
            EcsError::StaleEntity {
                index: 0,
                generation: 0
            }
        );
        assert!(registry.kill_entity(e).is_err());
        assert!(registry.has_component::<Position>(e).is_err());
    }

    #[test]
    fn test_component_roundtrip() {
        let mut registry = Registry::new();
        let e = registry.create_entity();
        registry
            .add_component(e, Position { x: 1.0, y: 2.0 })
            .unwrap();

        assert!(registry.has_component::<Position>(e).unwrap());
        assert!(!registry.has_component::<Velocity>(e).unwrap());
        assert_eq!(
            *registry.get_component::<Position>(e).unwrap(),
            Position { x: 1.0, y: 2.0 }
        );

        registry.get_component_mut::<Position>(e).unwrap().x = 5.0;
        assert!((registry.get_component::<Position>(e).unwrap().x - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_get_after_remove_is_an_error() {
        let mut registry = Registry::new();
        let e = registry.create_entity();
        registry.add_component(e, Position::default()).unwrap();
        registry.remove_component::<Position>(e).unwrap();

        let err = registry.get_component::<Position>(e).unwrap_err();
        assert!(matches!(err, EcsError::MissingComponent { index: 0, .. }));
    }

    #[test]
    fn test_system_sees_entity_after_barrier() {
        let mut registry = registry_with_movement();
        let e = registry.create_entity();
        registry.add_component(e, Position::default()).unwrap();
        registry.add_component(e, Velocity::default()).unwrap();

        assert!(registry.system_entities::<MovementSystem>().unwrap().is_empty());
        registry.update();
        assert_eq!(registry.system_entities::<MovementSystem>().unwrap(), vec![e]);
    }

    #[test]
    fn test_kill_before_promotion_never_joins_systems() {
        let mut registry = registry_with_movement();
        let e = registry.create_entity();
        registry.add_component(e, Position::default()).unwrap();
        registry.add_component(e, Velocity::default()).unwrap();
        registry.kill_entity(e).unwrap();

        registry.update();
        assert!(registry.system_entities::<MovementSystem>().unwrap().is_empty());
        assert_eq!(registry.alive_count(), 0);
        assert_eq!(registry.free_id_count(), 1);
    }

    #[test]
    fn test_live_signature_change_rematches() {
        let mut registry = registry_with_movement();
        let e = registry.create_entity();
        registry.add_component(e, Position::default()).unwrap();
        registry.update();
        assert!(registry.system_entities::<MovementSystem>().unwrap().is_empty());

        registry.add_component(e, Velocity::default()).unwrap();
        registry.update();
        assert_eq!(registry.system_entities::<MovementSystem>().unwrap(), vec![e]);

        registry.remove_component::<Velocity>(e).unwrap();
        // Still a member until the barrier runs.
        assert_eq!(registry.system_entities::<MovementSystem>().unwrap(), vec![e]);
        registry.update();
        assert!(registry.system_entities::<MovementSystem>().unwrap().is_empty());
    }

    #[test]
    fn test_late_system_is_backfilled() {
        let mut registry = Registry::new();
        let e = registry.create_entity();
        registry.add_component(e, Position::default()).unwrap();
        registry.add_component(e, Velocity::default()).unwrap();
        registry.update();

        let system = MovementSystem::new(registry.registrar()).unwrap();
        registry.add_system(system).unwrap();
        assert!(registry.system_entities::<MovementSystem>().unwrap().is_empty());

        registry.update();
        assert_eq!(registry.system_entities::<MovementSystem>().unwrap(), vec![e]);
    }

    #[test]
    fn test_system_registry_surface() {
        let mut registry = registry_with_movement();
        assert!(registry.has_system::<MovementSystem>());

        let system = MovementSystem::new(registry.registrar()).unwrap();
        assert!(matches!(
            registry.add_system(system),
            Err(EcsError::SystemAlreadyRegistered { .. })
        ));

        let removed = registry.remove_system::<MovementSystem>().unwrap();
        assert!(removed.entities().is_empty());
        assert!(!registry.has_system::<MovementSystem>());
        assert!(matches!(
            registry.get_system::<MovementSystem>(),
            Err(EcsError::SystemNotFound { .. })
        ));
    }

    #[test]
    fn test_system_scope_allows_component_writes() {
        let mut registry = registry_with_movement();
        let e = registry.create_entity();
        registry.add_component(e, Position { x: 1.0, y: 1.0 }).unwrap();
        registry.add_component(e, Velocity { x: 2.0, y: 0.0 }).unwrap();
        registry.update();

        registry
            .system_scope::<MovementSystem, _, _>(|system, registry| -> EcsResult<()> {
                for &entity in system.entities() {
                    let velocity = *registry.get_component::<Velocity>(entity)?;
                    let position = registry.get_component_mut::<Position>(entity)?;
                    position.x += velocity.x;
                    position.y += velocity.y;
                }
                Ok(())
            })
            .unwrap()
            .unwrap();

        assert_eq!(
            *registry.get_component::<Position>(e).unwrap(),
            Position { x: 3.0, y: 1.0 }
        );
        assert!(registry.has_system::<MovementSystem>());
    }

    #[test]
    fn test_scoped_system_keeps_its_slot_against_duplicates() {
        let mut registry = registry_with_movement();

        let err = registry
            .system_scope::<MovementSystem, _, _>(|_, registry| {
                let duplicate = MovementSystem::new(registry.registrar()).unwrap();
                registry.add_system(duplicate).unwrap_err()
            })
            .unwrap();
        assert!(matches!(err, EcsError::SystemAlreadyRegistered { .. }));

        let removed = registry
            .system_scope::<MovementSystem, _, _>(|_, registry| {
                registry.remove_system::<MovementSystem>().is_ok()
            })
            .unwrap();
        assert!(!removed);
        assert_eq!(registry.system_count(), 1);
    }

    #[test]
    #[should_panic(expected = "Registry::update called inside system_scope")]
    fn test_update_inside_system_scope_panics() {
        let mut registry = registry_with_movement();
        let old = registry.create_entity();
        registry.add_component(old, Position::default()).unwrap();
        registry.add_component(old, Velocity::default()).unwrap();
        registry.update();

        let _ = registry.system_scope::<MovementSystem, _, _>(|_, registry| {
            let fresh = registry.create_entity();
            registry.add_component(fresh, Position::default()).unwrap();
            registry.add_component(fresh, Velocity::default()).unwrap();
            registry.kill_entity(old).unwrap();
            registry.update();
        });
    }

    #[test]
    #[should_panic(expected = "Registry::clear called inside system_scope")]
    fn test_clear_inside_system_scope_panics() {
        let mut registry = registry_with_movement();
        let _ = registry.system_scope::<MovementSystem, _, _>(|_, registry| registry.clear());
    }

    #[test]
    fn test_nested_scopes_release_the_guard() {
        let mut registry = registry_with_movement();

        registry
            .system_scope::<MovementSystem, _, _>(|_, registry| {
                assert!(registry.system_scope::<MovementSystem, _, _>(|_, _| ()).is_err());
            })
            .unwrap();

        let e = registry.create_entity();
        registry.add_component(e, Position::default()).unwrap();
        registry.add_component(e, Velocity::default()).unwrap();
        registry.update();
        assert_eq!(registry.system_entities::<MovementSystem>().unwrap(), vec![e]);
    }

    #[test]
    fn test_get_system_mut_reaches_the_registered_instance() {
        let mut registry = registry_with_movement();
        let e = registry.create_entity();
        registry.add_component(e, Position::default()).unwrap();
        registry.add_component(e, Velocity::default()).unwrap();
        registry.update();

        let system = registry.get_system_mut::<MovementSystem>().unwrap();
        assert_eq!(system.entities(), &[e]);
        assert_eq!(system.core().signature().count(), 2);

        registry.remove_system::<MovementSystem>().unwrap();
        assert!(matches!(
            registry.get_system_mut::<MovementSystem>(),
            Err(EcsError::SystemNotFound { .. })
        ));
    }

    #[test]
    fn test_pools_are_created_lazily() {
        let mut registry = registry_with_movement();
        // The system registered both types but no entity carries them yet.
        assert_eq!(registry.component_count(), 2);
        assert_eq!(registry.pool_count(), 0);

        let e = registry.create_entity();
        registry.add_component(e, Position::default()).unwrap();
        assert_eq!(registry.pool_count(), 1);

        registry.add_component(e, Position { x: 1.0, y: 0.0 }).unwrap();
        assert_eq!(registry.pool_count(), 1);

        registry.add_component(e, Velocity::default()).unwrap();
        assert_eq!(registry.pool_count(), 2);
        assert_eq!(registry.component_count(), 2);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let zero_width = RegistryConfig {
            max_component_types: 0,
            ..RegistryConfig::default()
        };
        assert!(matches!(
            Registry::with_config(zero_width),
            Err(EcsError::InvalidConfig(_))
        ));

        let registrar = Arc::new(ComponentRegistrar::new(0));
        assert!(matches!(
            Registry::with_registrar(RegistryConfig::default(), registrar),
            Err(EcsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_entity_view() {
        let mut registry = Registry::new();
        let e = registry.create_entity();
        {
            let mut view = registry.entity_mut(e).unwrap();
            view.add_component(Position { x: 4.0, y: 0.0 })
                .unwrap()
                .add_component(Velocity::default())
                .unwrap();
            assert!(view.has_component::<Velocity>().unwrap());
            view.remove_component::<Velocity>().unwrap();
            assert!(!view.has_component::<Velocity>().unwrap());
            assert_eq!(view.id(), e);
            view.kill().unwrap();
        }
        assert_eq!(registry.entity_state(e), EntityState::PendingRemove);
    }

    #[test]
    fn test_growth_keeps_pools_covering_all_indices() {
        let mut registry = Registry::with_config(RegistryConfig {
            initial_entity_capacity: 2,
            ..RegistryConfig::default()
        })
        .unwrap();
        let first = registry.create_entity();
        registry.add_component(first, Position { x: 7.0, y: 7.0 }).unwrap();

        let mut last = first;
        for _ in 0..10 {
            last = registry.create_entity();
        }
        assert!(registry.capacity() >= 11);
        registry.add_component(last, Position::default()).unwrap();
        assert_eq!(
            *registry.get_component::<Position>(first).unwrap(),
            Position { x: 7.0, y: 7.0 }
        );
    }

    #[test]
    fn test_clear_invalidates_handles_and_keeps_systems() {
        let mut registry = registry_with_movement();
        let e = registry.create_entity();
        registry.add_component(e, Position::default()).unwrap();
        registry.add_component(e, Velocity::default()).unwrap();
        registry.update();

        registry.clear();
        assert!(!registry.is_alive(e));
        assert!(registry.has_system::<MovementSystem>());
        assert!(registry.system_entities::<MovementSystem>().unwrap().is_empty());

        let reborn = registry.create_entity();
        assert_eq!(reborn.index(), e.index());
        assert!(!registry.has_component::<Position>(reborn).unwrap());
    }
}
