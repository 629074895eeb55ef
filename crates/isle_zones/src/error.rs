//! Zone error types

use isle_core::{HostError, ZoneId};
use thiserror::Error;

/// Zone errors
#[derive(Debug, Error)]
pub enum ZoneError {
    /// The same zone id was declared twice
    #[error("Zone declared twice: {0}")]
    DuplicateZone(ZoneId),

    /// No zone with this id exists
    #[error("Unknown zone: {0}")]
    UnknownZone(ZoneId),

    /// A descriptor failed validation
    #[error("Invalid zone {zone}: {reason}")]
    InvalidDescriptor { zone: ZoneId, reason: String },

    /// Descriptor document could not be parsed
    #[error("Failed to parse zone descriptor: {0}")]
    Parse(String),

    /// Host world error
    #[error("Host error: {0}")]
    Host(#[from] HostError),
}

/// Result type for zone operations
pub type Result<T> = std::result::Result<T, ZoneError>;
