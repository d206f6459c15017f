//! # Core Error Types
//!
//! All errors that can occur while managing entities and components.

use thiserror::Error;

use crate::ecs::EntityId;

/// Errors that can occur in the entity-component core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// The world already holds its maximum number of entity slots.
    #[error("entity capacity exhausted: {capacity} slots in use")]
    CapacityExhausted {
        /// Configured maximum number of entities.
        capacity: usize,
    },

    /// The component type registry cannot assign another identifier.
    #[error("component type limit reached ({max}): cannot register `{type_name}`")]
    TypeCapacityExhausted {
        /// Name of the type that was refused.
        type_name: &'static str,
        /// Maximum number of distinct component types.
        max: usize,
    },

    /// The handle does not own its slot any more (destroyed or never issued).
    #[error("stale or dead entity handle {0}")]
    StaleEntity(EntityId),

    /// The entity is live but does not carry the requested component.
    #[error("entity {entity} has no `{type_name}` component")]
    MissingComponent {
        /// The entity that was queried.
        entity: EntityId,
        /// Name of the missing component type.
        type_name: &'static str,
    },

    /// Invalid world configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for core operations.
pub type EcsResult<T> = Result<T, EcsError>;
