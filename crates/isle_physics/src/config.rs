//! Physics configuration

use serde::{Deserialize, Serialize};

/// Zone world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity vector (default: -9.81 in Y)
    pub gravity: [f32; 3],

    /// Fixed timestep in seconds
    pub timestep: f32,

    /// Maximum number of substeps per zone tick
    pub max_substeps: u32,

    /// Solver iterations for velocity
    pub velocity_iterations: usize,

    /// Avatar capsule half height
    pub avatar_half_height: f32,

    /// Avatar capsule radius
    pub avatar_radius: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: [0.0, -9.81, 0.0],
            timestep: 1.0 / 60.0,
            max_substeps: 4,
            velocity_iterations: 4,
            avatar_half_height: 0.5,
            avatar_radius: 0.4,
        }
    }
}

impl PhysicsConfig {
    /// Set gravity
    pub fn with_gravity(mut self, x: f32, y: f32, z: f32) -> Self {
        self.gravity = [x, y, z];
        self
    }

    /// Set timestep
    pub fn with_timestep(mut self, timestep: f32) -> Self {
        self.timestep = timestep;
        self
    }

    /// Check the values a world cannot run with
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(crate::error::PhysicsError::InvalidConfig(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.velocity_iterations == 0 || self.max_substeps == 0 {
            return Err(crate::error::PhysicsError::InvalidConfig(
                "iterations and substeps must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
