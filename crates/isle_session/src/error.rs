//! Session error types

use isle_core::{HostError, PlayerId, ZoneId};
use isle_progress::{EconomyError, StoreError};
use isle_zones::ZoneError;
use thiserror::Error;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Unknown zone: {0}")]
    UnknownZone(ZoneId),

    #[error("Zone {0} is locked")]
    ZoneLocked(ZoneId),

    #[error("Player {0} is not in a zone")]
    NotInZone(PlayerId),

    #[error("No zones are configured")]
    NoZones,

    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    #[error(transparent)]
    Zone(#[from] ZoneError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Economy(#[from] EconomyError),

    #[error(transparent)]
    Host(#[from] HostError),
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
