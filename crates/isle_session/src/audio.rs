//! Per-player audio handle cache

use isle_core::{AudioHandle, PlayerId};
use isle_zones::ZoneHandle;
use std::collections::HashMap;

/// Audio cues started for a player, so they can be stopped on leave
#[derive(Debug, Default)]
pub struct AudioCache {
    handles: HashMap<PlayerId, Vec<(ZoneHandle, AudioHandle)>>,
}

impl AudioCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, player: &PlayerId, zone: ZoneHandle, handle: AudioHandle) {
        self.handles
            .entry(player.clone())
            .or_default()
            .push((zone, handle));
    }

    /// Release every cached handle of a player
    pub fn take(&mut self, player: &PlayerId) -> Vec<(ZoneHandle, AudioHandle)> {
        self.handles.remove(player).unwrap_or_default()
    }

    pub fn count(&self, player: &PlayerId) -> usize {
        self.handles.get(player).map(|h| h.len()).unwrap_or(0)
    }
}
