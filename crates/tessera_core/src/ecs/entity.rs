//! # Entity Handles
//!
//! Entities are lightweight value handles consisting of:
//! - An index into signatures and component pools
//! - A generation counter that detects use after recycling
//!
//! A handle holds no reference to its registry. Every operation takes the
//! registry explicitly, so a handle can never outlive or alias registry state.

use std::cmp::Ordering;
use std::fmt;

/// Handle to an entity owned by a [`Registry`](super::Registry).
///
/// The handle is split into two parts:
/// - Lower 32 bits: Index into signatures and component pools
/// - Upper 32 bits: Generation of the slot when the handle was issued
///
/// Two handles are equal only if both parts match, so a handle kept across
/// a recycle never compares equal to the entity that reuses its index.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct Entity(u64);

impl Entity {
    /// Creates a handle from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-1)
    /// * `generation` - The slot generation (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the handle.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the handle.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Returns the index as a `usize` for slot lookups.
    #[inline]
    #[must_use]
    pub const fn slot(self) -> usize {
        self.index() as usize
    }
}

impl PartialOrd for Entity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index()
            .cmp(&other.index())
            .then(self.generation().cmp(&other.generation()))
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index(), self.generation())
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index(), self.generation())
    }
}

/// Lifecycle state of one entity slot.
///
/// ```text
/// Unused -> (create) -> PendingAdd -> (update) -> Live
///        <- (update) <- PendingRemove <- (kill) <-
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EntityState {
    /// Free; the index may be handed out by the next create.
    #[default]
    Unused,
    /// Created this tick; not yet visible to any system.
    PendingAdd,
    /// Promoted by the barrier and matched into systems.
    Live,
    /// Killed; still visible to systems until the next barrier.
    PendingRemove,
}

impl EntityState {
    /// Whether a handle in this state may still be used for component access.
    #[inline]
    #[must_use]
    pub const fn is_occupied(self) -> bool {
        !matches!(self, Self::Unused)
    }
}
