//! Declarative motion paths, as written in zone descriptors

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Motion attached to a hazard or platform placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MotionPath {
    /// Travel between absolute waypoints at a constant linear speed
    /// (units per second). A looping path is closed: after the last
    /// waypoint it travels back to the first.
    Waypoints {
        points: Vec<Vec3>,
        speed: f32,
        #[serde(default)]
        looping: bool,
    },
    /// Rotate in place around an axis
    Spin { axis: Vec3, degrees_per_second: f32 },
}

impl MotionPath {
    /// Waypoint path
    pub fn waypoints(points: Vec<Vec3>, speed: f32, looping: bool) -> Self {
        Self::Waypoints {
            points,
            speed,
            looping,
        }
    }

    /// Spin path
    pub fn spin(axis: Vec3, degrees_per_second: f32) -> Self {
        Self::Spin {
            axis,
            degrees_per_second,
        }
    }

    /// Where the entity should be spawned, if the path dictates it
    pub fn start_position(&self) -> Option<Vec3> {
        match self {
            Self::Waypoints { points, .. } => points.first().copied(),
            Self::Spin { .. } => None,
        }
    }
}
