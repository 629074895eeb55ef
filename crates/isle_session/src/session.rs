//! Per-zone session table

use isle_core::{EntityId, OverlayHandle, PlayerId};
use isle_zones::ZoneHandle;
use std::collections::{BTreeMap, HashMap};

/// Live per-zone resources of one player
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSession {
    pub player: PlayerId,
    /// Display name
    pub name: String,
    pub zone: ZoneHandle,
    pub avatar: EntityId,
    /// Cosmetic emitter following the avatar
    pub emitter: Option<EntityId>,
    /// Charge meter overlay
    pub overlay: Option<OverlayHandle>,
}

/// Active sessions, keyed by zone then player.
///
/// A player has at most one session across all zones; inserting a second
/// one is refused.
#[derive(Debug, Default)]
pub struct SessionTable {
    by_zone: HashMap<ZoneHandle, BTreeMap<PlayerId, PlayerSession>>,
    player_zone: HashMap<PlayerId, ZoneHandle>,
}

impl SessionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session; returns it back if the player already has one
    pub fn insert(&mut self, session: PlayerSession) -> Result<(), PlayerSession> {
        if self.player_zone.contains_key(&session.player) {
            return Err(session);
        }

        self.player_zone.insert(session.player.clone(), session.zone);
        self.by_zone
            .entry(session.zone)
            .or_default()
            .insert(session.player.clone(), session);
        Ok(())
    }

    /// Remove a player's session wherever it is
    pub fn remove(&mut self, player: &PlayerId) -> Option<PlayerSession> {
        let zone = self.player_zone.remove(player)?;
        let sessions = self.by_zone.get_mut(&zone)?;
        let session = sessions.remove(player);
        if sessions.is_empty() {
            self.by_zone.remove(&zone);
        }
        session
    }

    pub fn get(&self, player: &PlayerId) -> Option<&PlayerSession> {
        let zone = self.player_zone.get(player)?;
        self.by_zone.get(zone)?.get(player)
    }

    pub fn get_mut(&mut self, player: &PlayerId) -> Option<&mut PlayerSession> {
        let zone = self.player_zone.get(player)?;
        self.by_zone.get_mut(zone)?.get_mut(player)
    }

    /// Zone a player is currently in
    pub fn zone_of(&self, player: &PlayerId) -> Option<ZoneHandle> {
        self.player_zone.get(player).copied()
    }

    /// Sessions in one zone, in player order
    pub fn in_zone(&self, zone: ZoneHandle) -> impl Iterator<Item = &PlayerSession> {
        self.by_zone.get(&zone).into_iter().flat_map(|s| s.values())
    }

    /// (player, avatar) pairs of one zone
    pub fn avatars_in(&self, zone: ZoneHandle) -> Vec<(PlayerId, EntityId)> {
        self.in_zone(zone)
            .map(|s| (s.player.clone(), s.avatar))
            .collect()
    }

    pub fn count_in(&self, zone: ZoneHandle) -> usize {
        self.by_zone.get(&zone).map(|s| s.len()).unwrap_or(0)
    }

    /// Every player with a session, sorted
    pub fn players(&self) -> Vec<PlayerId> {
        let mut players: Vec<PlayerId> = self.player_zone.keys().cloned().collect();
        players.sort();
        players
    }

    pub fn len(&self) -> usize {
        self.player_zone.len()
    }

    pub fn is_empty(&self) -> bool {
        self.player_zone.is_empty()
    }
}
