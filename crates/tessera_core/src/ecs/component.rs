//! # Component System
//!
//! Components are pure data containers with no behavior.
//! They must have a default value so pools can pre-fill slots.

use std::fmt;

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Default`: Pools grow by default-filling new slots
/// - `'static`: Component types are keyed by `TypeId`
///
/// # Example
///
/// ```rust
/// use tessera_core::Component;
///
/// #[derive(Clone, Copy, Default)]
/// struct Health {
///     hit_points: i32,
/// }
///
/// impl Component for Health {}
/// ```
pub trait Component: Default + 'static {}

/// Dense per-process index of a component type.
///
/// Assigned by a [`ComponentRegistrar`](super::ComponentRegistrar) in
/// first-use order starting at 0. Only meaningful inside the registrar that
/// issued it; never persist it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u32);

impl ComponentId {
    #[inline]
    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Returns the id as an index into pools and signatures.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
