//! Declarative zone descriptions
//!
//! A descriptor is immutable once loaded. The order of `collectibles`
//! matters: the last entry finishes the zone.

use crate::error::{Result, ZoneError};
use glam::Vec3;
use isle_core::{Shape, Transform, ZoneId};
use isle_motion::MotionPath;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Static obstacle placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticPlacement {
    pub asset: String,
    #[serde(flatten)]
    pub transform: Transform,
    #[serde(default)]
    pub shape: Shape,
}

/// Collectible placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectiblePlacement {
    /// Stable id, unique within the zone
    pub id: String,
    #[serde(flatten)]
    pub transform: Transform,
    #[serde(default = "default_collectible_asset")]
    pub asset: String,
}

fn default_collectible_asset() -> String {
    "coin".to_string()
}

/// Hazard or moving platform placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoverPlacement {
    pub asset: String,
    #[serde(flatten)]
    pub transform: Transform,
    #[serde(default)]
    pub shape: Shape,
    /// Fixed path; a placement without one stays put
    #[serde(default)]
    pub motion: Option<MotionPath>,
}

impl MoverPlacement {
    /// Where the entity is spawned: the first waypoint if it has a path
    pub fn spawn_transform(&self) -> Transform {
        match self.motion.as_ref().and_then(|m| m.start_position()) {
            Some(start) => Transform::at(start).with_rotation(self.transform.rotation),
            None => self.transform,
        }
    }
}

/// Leaderboard board placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardPlacement {
    #[serde(default = "default_board_asset")]
    pub asset: String,
    #[serde(flatten)]
    pub transform: Transform,
}

fn default_board_asset() -> String {
    "leaderboard".to_string()
}

/// Everything needed to populate one zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneDescriptor {
    pub id: ZoneId,
    /// Display name; the id when empty
    #[serde(default)]
    pub name: String,
    /// Map asset loaded when the zone is created
    pub map: String,
    pub start_position: Vec3,
    /// Overrides the server-wide fall threshold
    #[serde(default)]
    pub fall_threshold: Option<f32>,
    /// Named teleport targets
    #[serde(default)]
    pub platforms: BTreeMap<String, Vec3>,
    #[serde(default)]
    pub obstacles: Vec<StaticPlacement>,
    #[serde(default)]
    pub collectibles: Vec<CollectiblePlacement>,
    #[serde(default)]
    pub movers: Vec<MoverPlacement>,
    #[serde(default)]
    pub boards: Vec<BoardPlacement>,
    /// Ambient music played for every player in the zone
    #[serde(default)]
    pub music: Option<String>,
}

impl ZoneDescriptor {
    /// Create an empty descriptor
    pub fn new(id: impl Into<ZoneId>, map: impl Into<String>, start_position: Vec3) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            map: map.into(),
            start_position,
            fall_threshold: None,
            platforms: BTreeMap::new(),
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            movers: Vec::new(),
            boards: Vec::new(),
            music: None,
        }
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ZoneError::Parse(e.to_string()))
    }

    /// Set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set fall threshold
    pub fn with_fall_threshold(mut self, threshold: f32) -> Self {
        self.fall_threshold = Some(threshold);
        self
    }

    /// Add a named platform
    pub fn with_platform(mut self, name: impl Into<String>, position: Vec3) -> Self {
        self.platforms.insert(name.into(), position);
        self
    }

    /// Add an obstacle
    pub fn with_obstacle(mut self, asset: impl Into<String>, transform: Transform) -> Self {
        self.obstacles.push(StaticPlacement {
            asset: asset.into(),
            transform,
            shape: Shape::default(),
        });
        self
    }

    /// Add a collectible
    pub fn with_collectible(mut self, id: impl Into<String>, position: Vec3) -> Self {
        self.collectibles.push(CollectiblePlacement {
            id: id.into(),
            transform: Transform::at(position),
            asset: default_collectible_asset(),
        });
        self
    }

    /// Add a mover
    pub fn with_mover(
        mut self,
        asset: impl Into<String>,
        transform: Transform,
        motion: Option<MotionPath>,
    ) -> Self {
        self.movers.push(MoverPlacement {
            asset: asset.into(),
            transform,
            shape: Shape::default(),
            motion,
        });
        self
    }

    /// Add a leaderboard board
    pub fn with_board(mut self, position: Vec3) -> Self {
        self.boards.push(BoardPlacement {
            asset: default_board_asset(),
            transform: Transform::at(position),
        });
        self
    }

    /// Set ambient music
    pub fn with_music(mut self, asset: impl Into<String>) -> Self {
        self.music = Some(asset.into());
        self
    }

    /// Name shown to players
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.id.as_str()
        } else {
            &self.name
        }
    }

    /// Zone-qualified key recorded in a player's collected set
    pub fn collectible_key(&self, collectible: &str) -> String {
        format!("{}/{}", self.id, collectible)
    }

    /// The collectible that finishes this zone
    pub fn last_collectible(&self) -> Option<&CollectiblePlacement> {
        self.collectibles.last()
    }

    /// Key of the collectible that finishes this zone
    pub fn last_collectible_key(&self) -> Option<String> {
        self.last_collectible().map(|c| self.collectible_key(&c.id))
    }

    pub fn is_last_collectible(&self, collectible: &str) -> bool {
        self.last_collectible().map(|c| c.id == collectible).unwrap_or(false)
    }

    pub fn collectible(&self, id: &str) -> Option<&CollectiblePlacement> {
        self.collectibles.iter().find(|c| c.id == id)
    }

    /// Named platform position
    pub fn platform(&self, name: &str) -> Option<Vec3> {
        self.platforms.get(name).copied()
    }

    /// Reject descriptors the loader cannot honour
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| ZoneError::InvalidDescriptor {
            zone: self.id.clone(),
            reason,
        };

        if self.id.as_str().is_empty() {
            return Err(invalid("empty zone id".into()));
        }
        if self.map.is_empty() {
            return Err(invalid("no map asset".into()));
        }
        if !self.start_position.is_finite() {
            return Err(invalid("start position is not finite".into()));
        }

        let mut seen = HashSet::new();
        for c in &self.collectibles {
            if c.id.is_empty() {
                return Err(invalid("collectible with empty id".into()));
            }
            if !seen.insert(c.id.as_str()) {
                return Err(invalid(format!("collectible '{}' declared twice", c.id)));
            }
        }

        Ok(())
    }
}
