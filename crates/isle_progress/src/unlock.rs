//! Zone unlock chain

use isle_core::{ZoneId, ZoneUnlockFlag};
use std::collections::BTreeSet;

/// Ordered zones and the collectible that finishes each one.
///
/// The first zone is always open. Any later zone opens once the player has
/// ever collected the finishing collectible of the zone before it. A zone
/// without collectibles imposes no gate of its own, so its successor
/// inherits its state.
#[derive(Debug, Clone, Default)]
pub struct UnlockChain {
    zones: Vec<(ZoneId, Option<String>)>,
}

impl UnlockChain {
    /// Build from `(zone, finishing collectible key)` in unlock order
    pub fn new(zones: Vec<(ZoneId, Option<String>)>) -> Self {
        Self { zones }
    }

    pub fn first_zone(&self) -> Option<&ZoneId> {
        self.zones.first().map(|(z, _)| z)
    }

    /// Position of a zone in unlock order
    pub fn position(&self, zone: &ZoneId) -> Option<usize> {
        self.zones.iter().position(|(z, _)| z == zone)
    }

    /// Pure function of the collected history; unknown zones are locked
    pub fn is_unlocked(&self, collected: &BTreeSet<String>, zone: &ZoneId) -> bool {
        match self.position(zone) {
            Some(index) => self.unlocked_at(collected, index),
            None => false,
        }
    }

    fn unlocked_at(&self, collected: &BTreeSet<String>, index: usize) -> bool {
        let mut index = index;
        while index > 0 {
            match &self.zones[index - 1].1 {
                Some(key) => return collected.contains(key),
                None => index -= 1,
            }
        }
        true
    }

    /// Unlock flag for every zone, in order
    pub fn flags(&self, collected: &BTreeSet<String>) -> Vec<ZoneUnlockFlag> {
        (0..self.zones.len())
            .map(|i| ZoneUnlockFlag {
                zone: self.zones[i].0.clone(),
                unlocked: self.unlocked_at(collected, i),
            })
            .collect()
    }
}
