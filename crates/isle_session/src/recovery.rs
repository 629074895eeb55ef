//! Fallen-player recovery
//!
//! Polling runs on each zone's own tick clock: elapsed tick time is
//! accumulated per zone and a scan happens whenever the interval is
//! reached, so the cadence holds under any tick rate.

use glam::Vec3;
use isle_core::{EntityId, PlayerId, ZoneWorld};
use isle_zones::ZoneHandle;
use std::collections::HashMap;

/// Per-zone polling clocks
#[derive(Debug)]
pub struct FallRecovery {
    interval_ms: f32,
    elapsed: HashMap<ZoneHandle, f32>,
}

impl FallRecovery {
    pub fn new(interval_ms: f32) -> Self {
        Self {
            interval_ms: interval_ms.max(1.0),
            elapsed: HashMap::new(),
        }
    }

    /// Accumulate zone time; true when a scan is due
    pub fn poll(&mut self, zone: ZoneHandle, delta_ms: f32) -> bool {
        let elapsed = self.elapsed.entry(zone).or_insert(0.0);
        *elapsed += delta_ms.max(0.0);

        if *elapsed >= self.interval_ms {
            *elapsed %= self.interval_ms;
            true
        } else {
            false
        }
    }

    /// Return every avatar below the threshold to the start position.
    ///
    /// Returns the players that were moved.
    pub fn rescue(
        world: &mut dyn ZoneWorld,
        avatars: &[(PlayerId, EntityId)],
        threshold: f32,
        start: Vec3,
    ) -> Vec<PlayerId> {
        let mut rescued = Vec::new();

        for (player, avatar) in avatars {
            let Some(position) = world.position(*avatar) else {
                continue;
            };
            if position.y >= threshold {
                continue;
            }

            match world.teleport(*avatar, start) {
                Ok(()) => {
                    log::info!("Returned fallen player {} to the start position", player);
                    rescued.push(player.clone());
                }
                Err(e) => log::warn!("Could not return fallen player {}: {}", player, e),
            }
        }

        rescued
    }
}
