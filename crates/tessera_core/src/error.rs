//! # ECS Error Types
//!
//! Every contract violation the registry can detect. None of these are
//! retried: they are programmer errors and surface immediately.

use thiserror::Error;

/// Errors that can occur in the ECS core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The handle refers to an id that was recycled or never created.
    #[error("stale entity handle: index {index}, generation {generation}")]
    StaleEntity {
        /// Index carried by the handle.
        index: u32,
        /// Generation carried by the handle.
        generation: u32,
    },

    /// `get_component` on an entity whose signature lacks the component.
    #[error("entity {index} has no component {component}")]
    MissingComponent {
        /// Type name of the requested component.
        component: &'static str,
        /// Entity index.
        index: u32,
    },

    /// No system of this type is registered.
    #[error("system not registered: {system}")]
    SystemNotFound {
        /// Type name of the requested system.
        system: &'static str,
    },

    /// A system of this type is already registered.
    #[error("system already registered: {system}")]
    SystemAlreadyRegistered {
        /// Type name of the duplicate system.
        system: &'static str,
    },

    /// More distinct component types than the signature width allows.
    #[error("component limit {limit} reached, cannot register {component}")]
    ComponentLimit {
        /// Configured signature width.
        limit: usize,
        /// Type name of the rejected component.
        component: &'static str,
    },

    /// An erased pool did not hold the expected component type.
    #[error("pool for component {component} holds a different type")]
    PoolTypeMismatch {
        /// Type name the caller expected.
        component: &'static str,
    },

    /// Invalid registry configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for ECS operations.
pub type EcsResult<T> = Result<T, EcsError>;
