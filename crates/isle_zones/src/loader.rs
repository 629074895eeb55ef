//! Zone content loading
//!
//! Populates a zone world with the static, moving, board and collectible
//! entities of a descriptor. Loading the zone that is already current is a
//! no-op: nothing is despawned or respawned.

use crate::collectible::CollectibleTracker;
use crate::descriptor::ZoneDescriptor;
use crate::error::Result;
use crate::meta::{EntityRole, EntityTable};
use isle_core::{
    BodyKind, CollisionGroups, EntityId, EntityKind, EntitySpec, Transform, ZoneId, ZoneWorld,
};
use isle_motion::MotionController;

/// Outcome of a load request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The zone was already current; nothing changed
    AlreadyLoaded,
    /// Content was (re)spawned
    Loaded { spawned: usize },
}

/// Content state of one zone world
#[derive(Default)]
pub struct ZoneContentLoader {
    current: Option<ZoneId>,
    /// Static, mover and board entities owned by the loaded content
    owned: Vec<EntityId>,
    boards: Vec<EntityId>,
    entities: EntityTable,
    motion: MotionController,
    collectibles: CollectibleTracker,
}

impl ZoneContentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently loaded zone
    pub fn current(&self) -> Option<&ZoneId> {
        self.current.as_ref()
    }

    pub fn is_loaded(&self, zone: &ZoneId) -> bool {
        self.current.as_ref() == Some(zone)
    }

    /// Load a descriptor's content, replacing any previous content
    pub fn load(
        &mut self,
        world: &mut dyn ZoneWorld,
        descriptor: &ZoneDescriptor,
    ) -> Result<LoadOutcome> {
        if self.is_loaded(&descriptor.id) {
            log::debug!("Zone {} already loaded, skipping", descriptor.id);
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        self.unload(world);

        let mut spawned = 0;

        for obstacle in &descriptor.obstacles {
            let spec = EntitySpec::new(
                EntityKind::Model {
                    asset: obstacle.asset.clone(),
                },
                obstacle.transform,
            )
            .with_shape(obstacle.shape)
            .with_groups(CollisionGroups::environment());
            self.spawn_owned(world, spec, EntityRole::Static)?;
            spawned += 1;
        }

        for mover in &descriptor.movers {
            let origin = mover.spawn_transform();
            let spec = EntitySpec::new(
                EntityKind::Model {
                    asset: mover.asset.clone(),
                },
                origin,
            )
            .with_body(BodyKind::Kinematic)
            .with_shape(mover.shape)
            .with_groups(CollisionGroups::mover());
            let entity = self.spawn_owned(world, spec, EntityRole::Mover)?;
            spawned += 1;

            if let Some(path) = &mover.motion {
                if let Err(e) = self.motion.attach(entity, path, origin) {
                    log::warn!(
                        "Motion disabled for {} in zone {}: {}",
                        mover.asset,
                        descriptor.id,
                        e
                    );
                }
            }
        }

        for board in &descriptor.boards {
            let spec = EntitySpec::new(
                EntityKind::Display {
                    asset: board.asset.clone(),
                },
                board.transform,
            )
            .with_groups(CollisionGroups::decoration());
            let entity = self.spawn_owned(world, spec, EntityRole::Board)?;
            self.boards.push(entity);
            spawned += 1;
        }

        spawned += self
            .collectibles
            .spawn_all(world, &mut self.entities, descriptor)?;

        self.current = Some(descriptor.id.clone());
        log::info!("Loaded zone {} ({} entities)", descriptor.id, spawned);

        Ok(LoadOutcome::Loaded { spawned })
    }

    fn spawn_owned(
        &mut self,
        world: &mut dyn ZoneWorld,
        spec: EntitySpec,
        role: EntityRole,
    ) -> Result<EntityId> {
        let origin: Transform = spec.transform;
        let entity = world.spawn(spec)?;
        self.owned.push(entity);
        self.entities.insert(entity, role, origin);
        Ok(entity)
    }

    /// Despawn all loaded content.
    ///
    /// Entities that are already gone are skipped.
    pub fn unload(&mut self, world: &mut dyn ZoneWorld) {
        if let Some(zone) = self.current.take() {
            log::debug!("Unloading zone {}", zone);
        }

        for entity in self.owned.drain(..) {
            self.entities.remove(entity);
            if world.contains(entity) {
                if let Err(e) = world.despawn(entity) {
                    log::debug!("Content entity {} already gone: {}", entity, e);
                }
            }
        }

        self.boards.clear();
        self.motion.clear();
        self.collectibles.despawn_all(world, &mut self.entities);
    }

    /// Advance movers and collectible cooldowns.
    ///
    /// Returns the collectible ids respawned during this tick.
    pub fn tick(&mut self, world: &mut dyn ZoneWorld, delta_ms: f32) -> Vec<String> {
        self.motion.tick(world, delta_ms);
        self.collectibles.tick(world, &mut self.entities, delta_ms)
    }

    /// Leaderboard board entities
    pub fn boards(&self) -> &[EntityId] {
        &self.boards
    }

    pub fn entities(&self) -> &EntityTable {
        &self.entities
    }

    pub fn entities_mut(&mut self) -> &mut EntityTable {
        &mut self.entities
    }

    pub fn motion(&self) -> &MotionController {
        &self.motion
    }

    pub fn collectibles(&self) -> &CollectibleTracker {
        &self.collectibles
    }

    /// Claim a collectible through its sensor entity
    pub fn collect(
        &mut self,
        world: &mut dyn ZoneWorld,
        sensor: EntityId,
        cooldown_ms: f32,
    ) -> Option<crate::collectible::Pickup> {
        self.collectibles
            .collect(world, &mut self.entities, sensor, cooldown_ms)
    }
}
