//! # Entity Component System
//!
//! Entities are packed `(index, generation)` handles. Components live in
//! dense per-type pools indexed by entity index. Systems declare a required
//! signature and are handed the entities whose signature is a superset.
//!
//! ## Design Philosophy
//!
//! - Structural changes are staged and applied at one barrier per tick
//! - Every handle is checked against its slot generation before use
//! - Component types get dense ids on first use, per registrar
//! - Dynamic dispatch only at the pool and system seams

mod component;
mod entity;
mod pool;
mod registrar;
mod registry;
mod signature;
mod system;

pub use component::{Component, ComponentId};
pub use entity::{Entity, EntityState};
pub use pool::{ErasedPool, Pool};
pub use registrar::ComponentRegistrar;
pub use registry::{EntityMut, Registry};
pub use signature::Signature;
pub use system::{AsAny, System, SystemCore};
