//! # Systems
//!
//! A system is a unit of per-tick logic interested in every entity whose
//! signature is a superset of the system's required signature.
//!
//! Concrete systems embed a [`SystemCore`] and implement [`System`] to expose
//! it. The registry's barrier is the only writer of the member list; systems
//! and client code only read it through [`SystemCore::entities`].

use std::any::Any;

use super::component::Component;
use super::entity::Entity;
use super::registrar::ComponentRegistrar;
use super::signature::Signature;
use crate::error::EcsResult;

/// Shared state of every system: what it requires and who currently matches.
#[derive(Debug, Clone)]
pub struct SystemCore {
    /// Components an entity must carry to be a member.
    required: Signature,
    /// Matching live entities, as of the last barrier.
    entities: Vec<Entity>,
}

impl SystemCore {
    /// Creates a core with an empty requirement, sized for `registrar`.
    #[must_use]
    pub fn new(registrar: &ComponentRegistrar) -> Self {
        Self {
            required: Signature::new(registrar.limit()),
            entities: Vec::new(),
        }
    }

    /// Adds `C` to the required signature.
    ///
    /// Only meant for system constructors, before the system is handed to
    /// the registry; the requirement never changes afterwards.
    ///
    /// # Errors
    ///
    /// Fails if `C` is new and the registrar is full.
    pub fn require<C: Component>(&mut self, registrar: &ComponentRegistrar) -> EcsResult<()> {
        let id = registrar.id_of::<C>()?;
        self.required.set(id);
        Ok(())
    }

    /// Builder form of [`require`](Self::require).
    ///
    /// # Errors
    ///
    /// Fails if `C` is new and the registrar is full.
    pub fn with<C: Component>(mut self, registrar: &ComponentRegistrar) -> EcsResult<Self> {
        self.require::<C>(registrar)?;
        Ok(self)
    }

    /// The required signature.
    #[inline]
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.required
    }

    /// The member entities for this tick.
    ///
    /// Stable between two barrier calls: kills and creations made while
    /// iterating do not show up here until the next `Registry::update`.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Whether `entity` is currently a member.
    #[must_use]
    pub fn contains(&self, entity: Entity) -> bool {
        self.entities.contains(&entity)
    }

    pub(crate) fn add(&mut self, entity: Entity) {
        if !self.contains(entity) {
            self.entities.push(entity);
        }
    }

    pub(crate) fn remove(&mut self, entity: Entity) {
        // Linear scan; member lists stay small enough in practice.
        self.entities.retain(|&e| e != entity);
    }

    pub(crate) fn clear(&mut self) {
        self.entities.clear();
    }
}

/// Base capability of every system stored in a registry.
///
/// Systems are singletons per concrete type within one registry.
///
/// # Example
///
/// ```rust
/// use tessera_core::{Component, ComponentRegistrar, EcsResult, System, SystemCore};
///
/// #[derive(Default)]
/// struct Position { x: f32 }
/// impl Component for Position {}
///
/// struct PrintSystem { core: SystemCore }
///
/// impl PrintSystem {
///     fn new(registrar: &ComponentRegistrar) -> EcsResult<Self> {
///         Ok(Self { core: SystemCore::new(registrar).with::<Position>(registrar)? })
///     }
/// }
///
/// impl System for PrintSystem {
///     fn core(&self) -> &SystemCore { &self.core }
///     fn core_mut(&mut self) -> &mut SystemCore { &mut self.core }
/// }
/// ```
pub trait System: AsAny {
    /// The embedded core.
    fn core(&self) -> &SystemCore;

    /// The embedded core, mutably. Used by the registry barrier.
    fn core_mut(&mut self) -> &mut SystemCore;

    /// Shorthand for `self.core().entities()`.
    fn entities(&self) -> &[Entity] {
        self.core().entities()
    }
}

/// Upcast to `Any` for checked downcasting of boxed systems.
pub trait AsAny: Any {
    /// Upcast.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Owning upcast.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}
