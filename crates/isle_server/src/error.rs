//! Server error types

use isle_progress::StoreError;
use isle_session::SessionError;
use isle_zones::ZoneError;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration and catalogue errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid catalogue: {0}")]
    Catalog(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Catalogue declares no zones")]
    EmptyCatalog,

    #[error(transparent)]
    Zone(#[from] ZoneError),
}

/// Errors raised while building or running the server
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Zone(#[from] ZoneError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
