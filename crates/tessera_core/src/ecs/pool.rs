//! # Component Pools
//!
//! Dense, per-type component storage indexed directly by entity index.
//!
//! The pool uses a dense array strategy:
//! - Slot `i` belongs to the entity with index `i`, whether or not it is set
//! - Access is O(1) via entity index
//! - The array only ever grows; it is never compacted
//!
//! Whether a slot holds a meaningful value is decided by the entity's
//! signature, not by the pool.

use std::any::{type_name, Any};

use super::component::Component;

/// Storage for a single component type.
///
/// # Type Parameters
///
/// * `C` - The component type to store
///
/// # Example
///
/// ```rust,ignore
/// let mut pool: Pool<Position> = Pool::new(100);
/// pool.ensure_capacity(200);
/// pool.set(150, Position::new(1.0, 2.0));
/// ```
pub struct Pool<C: Component> {
    /// The dense array of components.
    data: Vec<C>,
}

impl<C: Component> Pool<C> {
    /// Creates a pool with `size` default-filled slots.
    #[must_use]
    pub fn new(size: usize) -> Self {
        let mut data = Vec::with_capacity(size);
        data.resize_with(size, C::default);
        Self { data }
    }

    /// Number of slots (not the number of entities holding `C`).
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the pool has no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Grows the pool to at least `size` slots, default-filling new ones.
    ///
    /// Never shrinks.
    pub fn ensure_capacity(&mut self, size: usize) {
        if size > self.data.len() {
            self.data.resize_with(size, C::default);
        }
    }

    /// Overwrites the slot at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds; call
    /// [`ensure_capacity`](Self::ensure_capacity) first.
    #[inline]
    pub fn set(&mut self, index: usize, component: C) {
        self.data[index] = component;
    }

    /// Gets the slot at `index`.
    ///
    /// No existence check: the caller must have tested the entity's
    /// signature bit first.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> &C {
        &self.data[index]
    }

    /// Gets the slot at `index` mutably. Same contract as [`get`](Self::get).
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> &mut C {
        &mut self.data[index]
    }

    /// Discards all slots.
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

/// Non-generic handle over a [`Pool`] of any component type.
///
/// Lets pools of different types live in one `Vec` indexed by
/// [`ComponentId`](super::ComponentId). Typed access goes through a checked
/// downcast of [`as_any`](Self::as_any).
pub trait ErasedPool {
    /// Number of slots.
    fn len(&self) -> usize;

    /// Whether the pool has no slots.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grows the pool to at least `size` slots.
    fn ensure_capacity(&mut self, size: usize);

    /// Discards all slots.
    fn clear(&mut self);

    /// Type name of the stored component.
    fn component_name(&self) -> &'static str;

    /// Upcast for checked downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for checked downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedPool for Pool<C> {
    fn len(&self) -> usize {
        Pool::len(self)
    }

    fn ensure_capacity(&mut self, size: usize) {
        Pool::ensure_capacity(self, size);
    }

    fn clear(&mut self) {
        Pool::clear(self);
    }

    fn component_name(&self) -> &'static str {
        type_name::<C>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
