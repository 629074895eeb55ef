//! Zone and cosmetic catalogue
//!
//! The zone order in the document is the unlock order.

use crate::error::ConfigError;
use isle_progress::CosmeticCatalog;
use isle_zones::ZoneDescriptor;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the server hosts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub zones: Vec<ZoneDescriptor>,
    #[serde(default)]
    pub cosmetics: CosmeticCatalog,
}

impl Catalog {
    /// Read and validate a catalogue file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json(&content)?;
        log::info!(
            "Loaded catalogue from {}: {} zones, {} cosmetics",
            path.display(),
            catalog.zones.len(),
            catalog.cosmetics.all().len()
        );
        Ok(catalog)
    }

    /// Parse and validate a catalogue document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Check every descriptor; at least one zone is required
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zones.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        for zone in &self.zones {
            zone.validate()?;
        }
        if !self.cosmetics.all().iter().any(|c| c.default) {
            log::warn!("Catalogue has no default cosmetic; new players start without an effect");
        }
        Ok(())
    }
}
