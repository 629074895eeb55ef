//! Error types for the host world boundary

use crate::id::EntityId;
use thiserror::Error;

/// Errors reported by a [`ZoneWorld`](crate::host::ZoneWorld) implementation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The entity is not (or no longer) present in the world
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The entity exists but cannot perform the request (e.g. not kinematic)
    #[error("Unsupported operation on {entity}: {reason}")]
    Unsupported { entity: EntityId, reason: String },

    /// Overlay handle is unknown
    #[error("Overlay not found: {0}")]
    OverlayNotFound(u64),

    /// Map asset could not be loaded
    #[error("Failed to load map '{0}'")]
    MapLoad(String),

    /// Any other failure inside the host backend
    #[error("Host backend error: {0}")]
    Backend(String),
}

/// Result type for host operations
pub type HostResult<T> = std::result::Result<T, HostError>;
