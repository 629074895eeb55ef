//! Session service configuration

use serde::{Deserialize, Serialize};

/// Tunables for the session layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Zone time between fallen-player scans
    pub fall_poll_ms: f32,
    /// Height below which an avatar is returned to the start position,
    /// unless the zone declares its own
    pub fall_threshold: f32,
    /// Time a collected item stays absent
    pub collectible_cooldown_ms: f32,
    /// Currency granted per collection
    pub currency_per_collectible: u64,
    /// Rows shown on leaderboard boards
    pub leaderboard_rows: usize,
    /// One-shot cue played where an item is collected
    pub pickup_sound: Option<String>,
    /// Avatar capsule half height
    pub avatar_half_height: f32,
    /// Avatar capsule radius
    pub avatar_radius: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            fall_poll_ms: 1000.0,
            fall_threshold: -50.0,
            collectible_cooldown_ms: 10_000.0,
            currency_per_collectible: 1,
            leaderboard_rows: 10,
            pickup_sound: Some("sfx/coin".to_string()),
            avatar_half_height: 0.5,
            avatar_radius: 0.4,
        }
    }
}

impl SessionConfig {
    /// Set collectible cooldown
    pub fn with_cooldown_ms(mut self, ms: f32) -> Self {
        self.collectible_cooldown_ms = ms;
        self
    }

    /// Set fall polling interval
    pub fn with_fall_poll_ms(mut self, ms: f32) -> Self {
        self.fall_poll_ms = ms;
        self
    }

    /// Set default fall threshold
    pub fn with_fall_threshold(mut self, threshold: f32) -> Self {
        self.fall_threshold = threshold;
        self
    }
}
