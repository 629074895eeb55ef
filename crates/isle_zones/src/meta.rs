//! Entity metadata side-table
//!
//! Keyed by entity id and never owning: an entry carries no handle that
//! keeps the entity alive, and entries are dropped whenever their entity
//! is despawned.

use isle_core::{EntityId, PlayerId, Transform, ZoneWorld};
use std::collections::HashMap;

/// What a spawned entity is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRole {
    /// Static obstacle
    Static,
    /// Collectible with its stable id
    Collectible(String),
    /// Hazard or moving platform
    Mover,
    /// Leaderboard board
    Board,
    /// Player avatar
    Avatar(PlayerId),
    /// Cosmetic emitter following a player's avatar
    Emitter(PlayerId),
}

/// Metadata for one entity
#[derive(Debug, Clone)]
pub struct EntityMeta {
    pub role: EntityRole,
    /// Transform the entity was spawned with
    pub origin: Transform,
}

/// Entity id → metadata map for one zone
#[derive(Debug, Default)]
pub struct EntityTable {
    entries: HashMap<EntityId, EntityMeta>,
}

impl EntityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: EntityId, role: EntityRole, origin: Transform) {
        self.entries.insert(entity, EntityMeta { role, origin });
    }

    pub fn remove(&mut self, entity: EntityId) -> Option<EntityMeta> {
        self.entries.remove(&entity)
    }

    pub fn get(&self, entity: EntityId) -> Option<&EntityMeta> {
        self.entries.get(&entity)
    }

    pub fn role(&self, entity: EntityId) -> Option<&EntityRole> {
        self.entries.get(&entity).map(|m| &m.role)
    }

    /// Collectible id, if the entity is a collectible
    pub fn collectible_id(&self, entity: EntityId) -> Option<&str> {
        match self.role(entity) {
            Some(EntityRole::Collectible(id)) => Some(id),
            _ => None,
        }
    }

    /// Owning player, if the entity is an avatar
    pub fn avatar_owner(&self, entity: EntityId) -> Option<&PlayerId> {
        match self.role(entity) {
            Some(EntityRole::Avatar(player)) => Some(player),
            _ => None,
        }
    }

    /// Entities with a given role, in id order
    pub fn with_role(&self, role: &EntityRole) -> Vec<EntityId> {
        let mut ids: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, m)| &m.role == role)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Drop entries whose entity is no longer in the world
    pub fn prune(&mut self, world: &dyn ZoneWorld) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| world.contains(*id));
        before - self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
