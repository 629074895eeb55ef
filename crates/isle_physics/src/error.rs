//! Error types for the physics world

use isle_core::{EntityId, HostError};
use thiserror::Error;

/// Physics errors
#[derive(Debug, Error)]
pub enum PhysicsError {
    /// Entity has no physics representation
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Entity's body cannot take kinematic pushes
    #[error("Entity {0} is not kinematic")]
    NotKinematic(EntityId),

    /// Invalid configuration
    #[error("Invalid physics configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;

impl From<PhysicsError> for HostError {
    fn from(err: PhysicsError) -> Self {
        match err {
            PhysicsError::EntityNotFound(entity) => HostError::EntityNotFound(entity),
            PhysicsError::NotKinematic(entity) => HostError::Unsupported {
                entity,
                reason: "not kinematic".into(),
            },
            PhysicsError::InvalidConfig(reason) => HostError::Backend(reason),
        }
    }
}
