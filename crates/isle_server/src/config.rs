//! Server Configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment variables: `ISLES_TICK_HZ`, `ISLES_STORE_DIR`, `ISLES_CATALOG`
//! 2. Config file: the path in `ISLES_CONFIG`, else `isles.toml`, else
//!    `config/isles.toml`
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! [server]
//! tick_hz = 60
//! catalog = "assets/catalog.json"
//!
//! [store]
//! dir = "data"       # omit to keep records in memory
//! format = "binary"  # json, binary
//!
//! [session]
//! fall_poll_ms = 1000
//! fall_threshold = -50.0
//! collectible_cooldown_ms = 10000
//!
//! [physics]
//! gravity = [0.0, -9.81, 0.0]
//! ```

use crate::error::ConfigError;
use isle_physics::PhysicsConfig;
use isle_progress::SaveFormat;
use isle_session::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config files probed when `ISLES_CONFIG` is unset
const DEFAULT_PATHS: &[&str] = &["isles.toml", "config/isles.toml"];

/// Tick loop and catalogue location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Zone ticks per second
    pub tick_hz: u32,
    /// Zone and cosmetic catalogue (JSON)
    pub catalog: PathBuf,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            tick_hz: 60,
            catalog: PathBuf::from("assets/catalog.json"),
        }
    }
}

/// Durable store location and format
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Record directory; records live in memory when unset
    pub dir: Option<PathBuf>,
    pub format: SaveFormat,
}

/// Complete server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub store: StoreSection,
    pub session: SessionConfig,
    pub physics: PhysicsConfig,
    /// File the config was read from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("ISLES_CONFIG").ok().map(PathBuf::from);

        let mut config = match explicit {
            // An explicit path must exist
            Some(path) => {
                let config = Self::load_from_file(&path)?;
                log::info!("Loaded server config from {}", path.display());
                config
            }
            None => {
                let found = DEFAULT_PATHS
                    .iter()
                    .map(Path::new)
                    .find(|p| p.is_file());
                match found {
                    Some(path) => {
                        let config = Self::load_from_file(path)?;
                        log::info!("Loaded server config from {}", path.display());
                        config
                    }
                    None => {
                        log::info!("No config file found, using defaults");
                        Self::default()
                    }
                }
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `ISLES_*` overrides read through `var`
    pub fn apply_overrides(
        &mut self,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(hz) = var("ISLES_TICK_HZ") {
            self.server.tick_hz = hz.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "ISLES_TICK_HZ".into(),
                value: hz.clone(),
            })?;
            log::info!("Tick rate from env: {}", self.server.tick_hz);
        }

        if let Some(dir) = var("ISLES_STORE_DIR") {
            if !dir.is_empty() {
                self.store.dir = Some(PathBuf::from(dir));
                log::info!("Store directory from env: {:?}", self.store.dir);
            }
        }

        if let Some(catalog) = var("ISLES_CATALOG") {
            if !catalog.is_empty() {
                self.server.catalog = PathBuf::from(catalog);
                log::info!("Catalogue from env: {}", self.server.catalog.display());
            }
        }

        Ok(())
    }

    /// Reject values the runtime cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.tick_hz == 0 || self.server.tick_hz > 1000 {
            return Err(ConfigError::InvalidValue {
                key: "server.tick_hz".into(),
                value: self.server.tick_hz.to_string(),
            });
        }
        if !(self.session.fall_poll_ms > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "session.fall_poll_ms".into(),
                value: self.session.fall_poll_ms.to_string(),
            });
        }
        self.physics
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: "physics".into(),
                value: e.to_string(),
            })
    }

    /// Wall-clock time between ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.server.tick_hz.max(1)))
    }

    /// Tick delta handed to the zones, in milliseconds
    pub fn tick_delta_ms(&self) -> f32 {
        1000.0 / self.server.tick_hz.max(1) as f32
    }

    /// Log the effective configuration
    pub fn log_summary(&self) {
        log::info!("Server configuration:");
        log::info!("  Tick rate: {} Hz", self.server.tick_hz);
        log::info!("  Catalogue: {}", self.server.catalog.display());
        match &self.store.dir {
            Some(dir) => log::info!("  Store: {} ({:?})", dir.display(), self.store.format),
            None => log::info!("  Store: in memory"),
        }
        log::info!(
            "  Fall recovery: every {} ms below {}",
            self.session.fall_poll_ms,
            self.session.fall_threshold
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.tick_hz, 60);
        assert_eq!(config.store.dir, None);
        assert_eq!(config.store.format, SaveFormat::Json);
        assert_eq!(config.session.fall_poll_ms, 1000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_file() {
        let config = ServerConfig::from_toml_str(
            r#"
            [server]
            tick_hz = 30

            [store]
            dir = "data"
            format = "binary"

            [session]
            collectible_cooldown_ms = 2500
            "#,
        )
        .unwrap();

        assert_eq!(config.server.tick_hz, 30);
        assert_eq!(config.server.catalog, PathBuf::from("assets/catalog.json"));
        assert_eq!(config.store.dir, Some(PathBuf::from("data")));
        assert_eq!(config.store.format, SaveFormat::Binary);
        assert_eq!(config.session.collectible_cooldown_ms, 2500.0);
        assert_eq!(config.session.fall_threshold, -50.0);
    }

    #[test]
    fn test_env_overrides() {
        let env = vars(&[
            ("ISLES_TICK_HZ", "20"),
            ("ISLES_STORE_DIR", "/var/lib/isles"),
            ("ISLES_CATALOG", "zones.json"),
        ]);
        let mut config = ServerConfig::default();
        config.apply_overrides(|k| env.get(k).cloned()).unwrap();

        assert_eq!(config.server.tick_hz, 20);
        assert_eq!(config.store.dir, Some(PathBuf::from("/var/lib/isles")));
        assert_eq!(config.server.catalog, PathBuf::from("zones.json"));
    }

    #[test]
    fn test_bad_tick_override() {
        let env = vars(&[("ISLES_TICK_HZ", "fast")]);
        let mut config = ServerConfig::default();
        let err = config.apply_overrides(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_validate_rejects_zero_tick() {
        let mut config = ServerConfig::default();
        config.server.tick_hz = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tick_delta() {
        let mut config = ServerConfig::default();
        config.server.tick_hz = 50;
        assert_eq!(config.tick_delta_ms(), 20.0);
        assert_eq!(config.tick_interval(), Duration::from_millis(20));
    }

    #[test]
    fn test_load_from_missing_file() {
        let err = ServerConfig::load_from_file("/nonexistent/isles.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
