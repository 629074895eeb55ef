//! Durable key-value stores
//!
//! Two scopes are kept apart: per-player records and global records (zone
//! leaderboards). Values are JSON documents so records can grow fields
//! without breaking older saves.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Deserialization error
    #[error("Deserialization error: {0}")]
    Deserialization(String),
    /// Record written by a newer build
    #[error("Version mismatch: record version {0}, current version {1}")]
    VersionMismatch(u32, u32),
    /// Backend refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Record scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Keyed by player identity
    Player,
    /// Keyed by arbitrary string
    Global,
}

impl Scope {
    fn dir_name(&self) -> &'static str {
        match self {
            Self::Player => "players",
            Self::Global => "global",
        }
    }
}

/// Durable key-value backend.
///
/// Calls are synchronous; callers keep fetch → merge → write inside one
/// call so nothing else runs between the read and the write.
pub trait KeyValueStore: Send + Sync {
    /// Read a value
    fn get(&self, scope: Scope, key: &str) -> StoreResult<Option<Value>>;

    /// Write a value
    fn set(&self, scope: Scope, key: &str, value: Value) -> StoreResult<()>;

    /// Remove a value; missing keys are not an error
    fn remove(&self, scope: Scope, key: &str) -> StoreResult<()>;
}

/// Store shared between the services of one process
pub type SharedStore = Arc<dyn KeyValueStore>;

/// In-memory store
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<(Scope, String), Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored values across both scopes
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, scope: Scope, key: &str) -> StoreResult<Option<Value>> {
        Ok(self.values.read().get(&(scope, key.to_string())).cloned())
    }

    fn set(&self, scope: Scope, key: &str, value: Value) -> StoreResult<()> {
        self.values.write().insert((scope, key.to_string()), value);
        Ok(())
    }

    fn remove(&self, scope: Scope, key: &str) -> StoreResult<()> {
        self.values.write().remove(&(scope, key.to_string()));
        Ok(())
    }
}

/// On-disk format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    /// JSON (human readable)
    #[default]
    Json,
    /// Binary (compact)
    Binary,
}

impl SaveFormat {
    fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Binary => "rec",
        }
    }
}

/// Envelope written around every record on disk.
///
/// The JSON format stores the value inline; the binary format stores the
/// value's JSON bytes, since bincode cannot carry a self-describing value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord<P> {
    /// Envelope version
    pub version: u32,
    /// Unix timestamp of the write
    pub written_at: u64,
    pub payload: P,
}

/// Current envelope version
pub const RECORD_VERSION: u32 = 1;

/// Seconds since the Unix epoch
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// File store: one file per key under `players/` and `global/`
pub struct FileStore {
    root: PathBuf,
    format: SaveFormat,
    version: u32,
    /// Serializes writers so a read never sees a half-written file
    lock: RwLock<()>,
}

impl FileStore {
    /// Create a file store rooted at a directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            format: SaveFormat::Json,
            version: RECORD_VERSION,
            lock: RwLock::new(()),
        }
    }

    /// Set save format
    pub fn with_format(mut self, format: SaveFormat) -> Self {
        self.format = format;
        self
    }

    /// Set version
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ensure both scope directories exist
    pub fn ensure_dirs(&self) -> StoreResult<()> {
        for scope in [Scope::Player, Scope::Global] {
            fs::create_dir_all(self.root.join(scope.dir_name()))?;
        }
        Ok(())
    }

    fn path(&self, scope: Scope, key: &str) -> PathBuf {
        self.root
            .join(scope.dir_name())
            .join(format!("{}.{}", encode_key(key), self.format.extension()))
    }

    fn encode(&self, value: Value) -> StoreResult<Vec<u8>> {
        let written_at = unix_now();
        match self.format {
            SaveFormat::Json => serde_json::to_vec_pretty(&StoredRecord {
                version: self.version,
                written_at,
                payload: value,
            })
            .map_err(|e| StoreError::Serialization(e.to_string())),
            SaveFormat::Binary => {
                let payload =
                    serde_json::to_vec(&value).map_err(|e| StoreError::Serialization(e.to_string()))?;
                bincode::serialize(&StoredRecord {
                    version: self.version,
                    written_at,
                    payload,
                })
                .map_err(|e| StoreError::Serialization(e.to_string()))
            }
        }
    }

    fn decode(&self, bytes: &[u8]) -> StoreResult<Value> {
        let (version, value) = match self.format {
            SaveFormat::Json => {
                let record: StoredRecord<Value> = serde_json::from_slice(bytes)
                    .map_err(|e| StoreError::Deserialization(e.to_string()))?;
                (record.version, record.payload)
            }
            SaveFormat::Binary => {
                let record: StoredRecord<Vec<u8>> = bincode::deserialize(bytes)
                    .map_err(|e| StoreError::Deserialization(e.to_string()))?;
                let value = serde_json::from_slice(&record.payload)
                    .map_err(|e| StoreError::Deserialization(e.to_string()))?;
                (record.version, value)
            }
        };

        if version > self.version {
            return Err(StoreError::VersionMismatch(version, self.version));
        }

        Ok(value)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, scope: Scope, key: &str) -> StoreResult<Option<Value>> {
        let _guard = self.lock.read();
        let path = self.path(scope, key);

        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&path)?;
        self.decode(&bytes).map(Some)
    }

    fn set(&self, scope: Scope, key: &str, value: Value) -> StoreResult<()> {
        let bytes = self.encode(value)?;

        let _guard = self.lock.write();
        self.ensure_dirs()?;

        // Write then rename, so a crash never leaves a truncated record
        let path = self.path(scope, key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, scope: Scope, key: &str) -> StoreResult<()> {
        let _guard = self.lock.write();
        let path = self.path(scope, key);

        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// Make a key safe to use as a file name
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for b in key.bytes() {
        if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
