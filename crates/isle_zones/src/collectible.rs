//! Collectible visibility and cooldown lifecycle
//!
//! Each collectible is either visible (a live sensor entity) or cooling
//! down (absent from the world). Collecting despawns the sensor; when the
//! cooldown runs out a new sensor entity is spawned at the original
//! transform. The new entity gets a new id, so contacts addressed to the
//! old sensor no longer resolve.

use crate::descriptor::ZoneDescriptor;
use crate::error::Result;
use crate::meta::{EntityRole, EntityTable};
use glam::Vec3;
use isle_core::{
    BodyKind, CollisionGroups, EntityId, EntityKind, EntitySpec, Shape, Transform, ZoneWorld,
};
use std::collections::BTreeMap;

/// Sensor radius around a collectible
const PICKUP_RADIUS: f32 = 0.75;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollectibleState {
    /// In the world as this sensor entity
    Visible(EntityId),
    /// Absent; respawns after the remaining time
    CoolingDown { remaining_ms: f32 },
}

#[derive(Debug, Clone)]
struct Slot {
    asset: String,
    key: String,
    is_last: bool,
    origin: Transform,
    state: CollectibleState,
    /// Number of sensors spawned so far
    generation: u32,
}

/// A successful collection
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub id: String,
    /// Zone-qualified key
    pub key: String,
    /// Finishes the zone
    pub is_last: bool,
    pub position: Vec3,
}

/// Collectibles of one zone
#[derive(Debug, Default)]
pub struct CollectibleTracker {
    slots: BTreeMap<String, Slot>,
    by_entity: BTreeMap<EntityId, String>,
}

impl CollectibleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn spawn_sensor(
        world: &mut dyn ZoneWorld,
        table: &mut EntityTable,
        id: &str,
        slot: &mut Slot,
    ) -> Result<EntityId> {
        let spec = EntitySpec::new(
            EntityKind::Model {
                asset: slot.asset.clone(),
            },
            slot.origin,
        )
        .with_body(BodyKind::Fixed)
        .with_shape(Shape::Ball {
            radius: PICKUP_RADIUS,
        })
        .as_sensor()
        .with_groups(CollisionGroups::pickup());

        let entity = world.spawn(spec)?;
        table.insert(entity, EntityRole::Collectible(id.to_string()), slot.origin);
        slot.state = CollectibleState::Visible(entity);
        slot.generation += 1;
        Ok(entity)
    }

    /// Spawn every collectible of a descriptor
    pub fn spawn_all(
        &mut self,
        world: &mut dyn ZoneWorld,
        table: &mut EntityTable,
        descriptor: &ZoneDescriptor,
    ) -> Result<usize> {
        for placement in &descriptor.collectibles {
            let mut slot = Slot {
                asset: placement.asset.clone(),
                key: descriptor.collectible_key(&placement.id),
                is_last: descriptor.is_last_collectible(&placement.id),
                origin: placement.transform,
                state: CollectibleState::CoolingDown { remaining_ms: 0.0 },
                generation: 0,
            };
            let entity = Self::spawn_sensor(world, table, &placement.id, &mut slot)?;
            self.by_entity.insert(entity, placement.id.clone());
            self.slots.insert(placement.id.clone(), slot);
        }
        Ok(descriptor.collectibles.len())
    }

    /// Despawn every visible collectible and forget them all
    pub fn despawn_all(&mut self, world: &mut dyn ZoneWorld, table: &mut EntityTable) {
        for (entity, _) in std::mem::take(&mut self.by_entity) {
            table.remove(entity);
            if world.contains(entity) {
                if let Err(e) = world.despawn(entity) {
                    log::debug!("Collectible {} already gone: {}", entity, e);
                }
            }
        }
        self.slots.clear();
    }

    /// Collectible id behind a sensor entity, if it is the live one
    pub fn id_for_entity(&self, entity: EntityId) -> Option<&str> {
        self.by_entity.get(&entity).map(|s| s.as_str())
    }

    /// Claim a collectible through its sensor entity.
    ///
    /// Returns `None` if the entity is not a live collectible sensor
    /// (cooling down, stale or unknown). On success the sensor is
    /// despawned and the cooldown starts.
    pub fn collect(
        &mut self,
        world: &mut dyn ZoneWorld,
        table: &mut EntityTable,
        sensor: EntityId,
        cooldown_ms: f32,
    ) -> Option<Pickup> {
        let id = self.by_entity.get(&sensor)?.clone();
        let slot = self.slots.get_mut(&id)?;

        if slot.state != CollectibleState::Visible(sensor) {
            return None;
        }

        self.by_entity.remove(&sensor);
        table.remove(sensor);
        if world.contains(sensor) {
            if let Err(e) = world.despawn(sensor) {
                log::debug!("Collectible sensor {} already gone: {}", sensor, e);
            }
        }
        slot.state = CollectibleState::CoolingDown {
            remaining_ms: cooldown_ms.max(0.0),
        };

        Some(Pickup {
            id,
            key: slot.key.clone(),
            is_last: slot.is_last,
            position: slot.origin.position,
        })
    }

    /// Advance cooldowns and respawn expired collectibles.
    ///
    /// Returns the ids respawned during this tick.
    pub fn tick(
        &mut self,
        world: &mut dyn ZoneWorld,
        table: &mut EntityTable,
        delta_ms: f32,
    ) -> Vec<String> {
        let mut respawned = Vec::new();

        for (id, slot) in self.slots.iter_mut() {
            let CollectibleState::CoolingDown { remaining_ms } = &mut slot.state else {
                continue;
            };

            *remaining_ms -= delta_ms;
            if *remaining_ms > 0.0 {
                continue;
            }

            match Self::spawn_sensor(world, table, id, slot) {
                Ok(entity) => {
                    self.by_entity.insert(entity, id.clone());
                    respawned.push(id.clone());
                }
                Err(e) => {
                    // Stay cooling down and try again next tick
                    log::warn!("Failed to respawn collectible {}: {}", slot.key, e);
                }
            }
        }

        respawned
    }

    pub fn state(&self, id: &str) -> Option<CollectibleState> {
        self.slots.get(id).map(|s| s.state)
    }

    pub fn is_visible(&self, id: &str) -> bool {
        matches!(self.state(id), Some(CollectibleState::Visible(_)))
    }

    /// Live sensor entity of a collectible
    pub fn entity_of(&self, id: &str) -> Option<EntityId> {
        match self.state(id) {
            Some(CollectibleState::Visible(entity)) => Some(entity),
            _ => None,
        }
    }

    /// How many sensors have been spawned for a collectible
    pub fn generation(&self, id: &str) -> u32 {
        self.slots.get(id).map(|s| s.generation).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
