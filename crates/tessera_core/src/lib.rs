//! # Tessera Core
//!
//! A small Entity Component System runtime:
//! - Typed component pools addressed by entity index
//! - Bitset signatures matched against per-system requirements
//! - A registry that defers creation, destruction and re-matching to a
//!   single `update()` barrier per tick
//!
//! ## Tick Contract
//!
//! 1. Call [`Registry::update`] once
//! 2. Run systems over their member lists
//! 3. Anything created or killed in step 2 shows up at the next barrier
//!
//! ## Example
//!
//! ```rust
//! use tessera_core::{Component, Registry};
//!
//! #[derive(Clone, Copy, Default)]
//! struct Health(u32);
//! impl Component for Health {}
//!
//! let mut registry = Registry::new();
//! let e = registry.create_entity();
//! registry.add_component(e, Health(10)).unwrap();
//! registry.update();
//!
//! assert_eq!(registry.get_component::<Health>(e).unwrap().0, 10);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod ecs;
pub mod error;

pub use config::RegistryConfig;
pub use ecs::{
    AsAny, Component, ComponentId, ComponentRegistrar, Entity, EntityMut, EntityState,
    ErasedPool, Pool, Registry, Signature, System, SystemCore,
};
pub use error::{EcsError, EcsResult};
