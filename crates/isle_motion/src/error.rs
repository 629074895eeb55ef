//! Error types for motion paths

use thiserror::Error;

/// Motion configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    /// A waypoint path needs a start and an end
    #[error("Waypoint path needs at least 2 points, got {0}")]
    TooFewWaypoints(usize),

    /// Speed must be positive and finite
    #[error("Invalid speed: {0}")]
    InvalidSpeed(f32),

    /// Spin axis has no direction
    #[error("Spin axis must be non-zero")]
    ZeroAxis,
}

/// Result type for motion operations
pub type Result<T> = std::result::Result<T, MotionError>;
