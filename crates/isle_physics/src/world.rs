//! Rapier-backed zone world

use crate::config::PhysicsConfig;
use crate::convert;
use crate::error::{PhysicsError, Result};
use crate::events::{to_contact, ChannelEventCollector};
use crate::outbox::{WorldOutput, ZoneOutput};
use crossbeam_channel::Sender;
use glam::{Quat, Vec3};
use isle_core::{
    AudioCue, AudioHandle, BodyKind, ContactEvent, EntityId, EntityIdAllocator, EntityKind,
    EntitySpec, HostError, HostResult, OverlayHandle, OverlayKind, PlayerId, Transform, UiMessage,
    ZoneId, ZoneWorld,
};
use rapier3d::prelude as rapier;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;

/// Physics-side record of a spawned entity
struct PhysicsEntity {
    kind: EntityKind,
    body: Option<rapier::RigidBodyHandle>,
    collider: Option<rapier::ColliderHandle>,
    /// Pose of entities without a body
    transform: Transform,
}

/// One isolated simulation world
pub struct PhysicsZoneWorld {
    config: PhysicsConfig,

    pipeline: rapier::PhysicsPipeline,
    gravity: rapier::Vector<f32>,
    integration_params: rapier::IntegrationParameters,
    islands: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    impulse_joints: rapier::ImpulseJointSet,
    multibody_joints: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
    bodies: rapier::RigidBodySet,
    colliders: rapier::ColliderSet,

    ids: EntityIdAllocator,
    entities: HashMap<EntityId, PhysicsEntity>,

    /// Accumulated seconds for the fixed timestep
    accumulated_time: f32,

    map: Option<String>,
    next_handle: u64,
    overlays: HashMap<OverlayHandle, EntityId>,
    /// Looping cues still playing; one-shots are never tracked
    audio: HashSet<AudioHandle>,
    /// Kinematic targets for the next step, reached over its substeps
    kinematic_targets: HashMap<rapier::RigidBodyHandle, rapier::Isometry<f32>>,
    outbox: Vec<WorldOutput>,
    /// Transport channel; outputs are buffered while unset
    forward: Option<(ZoneId, Sender<ZoneOutput>)>,
}

impl PhysicsZoneWorld {
    pub fn new(config: PhysicsConfig) -> Self {
        let gravity = rapier::Vector::new(config.gravity[0], config.gravity[1], config.gravity[2]);

        let mut integration_params = rapier::IntegrationParameters::default();
        integration_params.dt = config.timestep;
        integration_params.num_solver_iterations =
            NonZeroUsize::new(config.velocity_iterations).unwrap_or(NonZeroUsize::MIN);

        Self {
            config,
            pipeline: rapier::PhysicsPipeline::new(),
            gravity,
            integration_params,
            islands: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            impulse_joints: rapier::ImpulseJointSet::new(),
            multibody_joints: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
            bodies: rapier::RigidBodySet::new(),
            colliders: rapier::ColliderSet::new(),
            ids: EntityIdAllocator::new(),
            entities: HashMap::new(),
            accumulated_time: 0.0,
            map: None,
            next_handle: 0,
            overlays: HashMap::new(),
            audio: HashSet::new(),
            kinematic_targets: HashMap::new(),
            outbox: Vec::new(),
            forward: None,
        }
    }

    /// Send outputs tagged with the zone id to a transport channel
    pub fn with_forwarding(mut self, zone: ZoneId, sender: Sender<ZoneOutput>) -> Self {
        self.forward = Some((zone, sender));
        self
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Map asset loaded into this world
    pub fn map(&self) -> Option<&str> {
        self.map.as_deref()
    }

    /// Take every queued presentation output
    pub fn drain_outputs(&mut self) -> Vec<WorldOutput> {
        std::mem::take(&mut self.outbox)
    }

    fn emit(&mut self, output: WorldOutput) {
        let Some((zone, sender)) = &self.forward else {
            self.outbox.push(output);
            return;
        };

        let message = ZoneOutput {
            zone: zone.clone(),
            output,
        };
        if let Err(e) = sender.send(message) {
            // Transport gone; keep the output for drain_outputs
            log::debug!("Output channel closed for zone {}", zone);
            self.outbox.push(e.into_inner().output);
        }
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Looping cues that have not been stopped
    pub fn tracked_audio(&self) -> usize {
        self.audio.len()
    }

    /// Current linear velocity of an entity with a body
    pub fn linear_velocity(&self, entity: EntityId) -> Option<Vec3> {
        let body = self.entities.get(&entity)?.body?;
        self.bodies.get(body).map(|b| convert::vec3(b.linvel()))
    }

    /// Take the pending kinematic targets as (body, start, target)
    fn take_kinematic_paths(
        &mut self,
    ) -> Vec<(rapier::RigidBodyHandle, rapier::Isometry<f32>, rapier::Isometry<f32>)> {
        let targets = std::mem::take(&mut self.kinematic_targets);
        targets
            .into_iter()
            .filter_map(|(handle, target)| {
                let start = *self.bodies.get(handle)?.position();
                Some((handle, start, target))
            })
            .collect()
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn entity(&self, entity: EntityId) -> Result<&PhysicsEntity> {
        self.entities
            .get(&entity)
            .ok_or(PhysicsError::EntityNotFound(entity))
    }

    /// Current orientation of an entity
    pub fn rotation(&self, entity: EntityId) -> Option<Quat> {
        let e = self.entities.get(&entity)?;
        match e.body.and_then(|h| self.bodies.get(h)) {
            Some(body) => Some(convert::quat(body.rotation())),
            None => Some(e.transform.rotation),
        }
    }

    fn build_body(&mut self, spec: &EntitySpec) -> Option<rapier::RigidBodyHandle> {
        let body_type = convert::body_type(spec.body)?;
        let mut builder =
            rapier::RigidBodyBuilder::new(body_type).position(convert::transform_isometry(&spec.transform));

        if spec.body == BodyKind::Dynamic {
            // Avatars stay upright
            builder = builder.lock_rotations().ccd_enabled(true);
        }

        Some(self.bodies.insert(builder))
    }

    fn build_collider(
        &mut self,
        entity: EntityId,
        spec: &EntitySpec,
        body: Option<rapier::RigidBodyHandle>,
    ) -> Option<rapier::ColliderHandle> {
        if body.is_none() && !spec.sensor {
            return None;
        }

        let mut builder = rapier::ColliderBuilder::new(convert::shared_shape(&spec.shape))
            .sensor(spec.sensor)
            .collision_groups(convert::interaction_groups(&spec.groups))
            .user_data(convert::user_data(entity));

        if spec.sensor {
            builder = builder.active_events(rapier::ActiveEvents::COLLISION_EVENTS);
        }

        Some(match body {
            Some(parent) => self
                .colliders
                .insert_with_parent(builder, parent, &mut self.bodies),
            None => self
                .colliders
                .insert(builder.position(convert::transform_isometry(&spec.transform))),
        })
    }

    /// Advance one fixed timestep and collect sensor contacts
    fn step_internal(&mut self, contacts: &mut Vec<ContactEvent>) {
        let (collision_send, collision_recv) = crossbeam_channel::unbounded();
        let event_handler = ChannelEventCollector {
            collision_events: collision_send,
        };

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &event_handler,
        );

        while let Ok(event) = collision_recv.try_recv() {
            if let Some(contact) = to_contact(&self.colliders, event) {
                contacts.push(contact);
            }
        }
    }
}

impl Default for PhysicsZoneWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl ZoneWorld for PhysicsZoneWorld {
    fn load_map(&mut self, map: &str) -> HostResult<()> {
        if map.is_empty() {
            return Err(HostError::MapLoad(map.to_string()));
        }
        self.map = Some(map.to_string());
        self.emit(WorldOutput::MapLoaded {
            map: map.to_string(),
        });
        Ok(())
    }

    fn spawn(&mut self, spec: EntitySpec) -> HostResult<EntityId> {
        let entity = self.ids.allocate();
        let body = self.build_body(&spec);
        let collider = self.build_collider(entity, &spec, body);

        self.emit(WorldOutput::Spawned {
            entity,
            kind: spec.kind.clone(),
            transform: spec.transform,
        });
        self.entities.insert(
            entity,
            PhysicsEntity {
                kind: spec.kind,
                body,
                collider,
                transform: spec.transform,
            },
        );

        Ok(entity)
    }

    fn despawn(&mut self, entity: EntityId) -> HostResult<()> {
        let removed = self
            .entities
            .remove(&entity)
            .ok_or(HostError::EntityNotFound(entity))?;

        if let Some(body) = removed.body {
            self.kinematic_targets.remove(&body);
            self.bodies.remove(
                body,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        } else if let Some(collider) = removed.collider {
            self.colliders
                .remove(collider, &mut self.islands, &mut self.bodies, true);
        }

        self.emit(WorldOutput::Despawned { entity });
        Ok(())
    }

    fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    fn position(&self, entity: EntityId) -> Option<Vec3> {
        let e = self.entities.get(&entity)?;
        if let Some(body) = e.body.and_then(|h| self.bodies.get(h)) {
            return Some(convert::vec3(body.translation()));
        }
        if let EntityKind::Emitter { attached_to, .. } = &e.kind {
            if *attached_to != entity {
                if let Some(p) = self.position(*attached_to) {
                    return Some(p);
                }
            }
        }
        Some(e.transform.position)
    }

    fn teleport(&mut self, entity: EntityId, position: Vec3) -> HostResult<()> {
        let e = self
            .entities
            .get_mut(&entity)
            .ok_or(HostError::EntityNotFound(entity))?;

        match e.body.and_then(|h| self.bodies.get_mut(h)) {
            Some(body) => {
                body.set_translation(convert::vector(position), true);
                body.set_linvel(rapier::Vector::zeros(), true);
            }
            None => e.transform.position = position,
        }
        Ok(())
    }

    fn set_next_kinematic_pose(
        &mut self,
        entity: EntityId,
        position: Vec3,
        rotation: Quat,
    ) -> HostResult<()> {
        let handle = self
            .entity(entity)?
            .body
            .ok_or(PhysicsError::NotKinematic(entity))?;
        let body = self
            .bodies
            .get_mut(handle)
            .ok_or(PhysicsError::EntityNotFound(entity))?;

        if body.body_type() != rapier::RigidBodyType::KinematicPositionBased {
            return Err(PhysicsError::NotKinematic(entity).into());
        }

        self.kinematic_targets
            .insert(handle, convert::isometry(position, rotation));
        Ok(())
    }

    fn step(&mut self, delta_ms: f32) -> Vec<ContactEvent> {
        let timestep = self.config.timestep;
        self.accumulated_time += delta_ms.max(0.0) / 1000.0;

        let mut steps = 0;
        let mut remaining = self.accumulated_time;
        while remaining >= timestep && steps < self.config.max_substeps {
            remaining -= timestep;
            steps += 1;
        }

        // A push waits for the first tick that runs a substep
        let paths = if steps > 0 {
            self.take_kinematic_paths()
        } else {
            Vec::new()
        };

        let mut contacts = Vec::new();
        for i in 1..=steps {
            let fraction = i as f32 / steps as f32;
            for (handle, start, target) in &paths {
                if let Some(body) = self.bodies.get_mut(*handle) {
                    body.set_next_kinematic_position(start.lerp_slerp(target, fraction));
                }
            }
            self.step_internal(&mut contacts);
        }
        self.accumulated_time = remaining;

        // Drop backlog the substep cap could not absorb
        if steps == self.config.max_substeps && self.accumulated_time >= timestep {
            log::debug!(
                "Zone world dropping {:.3}s of simulation backlog",
                self.accumulated_time
            );
            self.accumulated_time %= timestep;
        }

        contacts
    }

    fn send_ui(&mut self, player: &PlayerId, message: UiMessage) {
        self.emit(WorldOutput::Ui {
            player: player.clone(),
            message,
        });
    }

    fn attach_overlay(
        &mut self,
        player: &PlayerId,
        avatar: EntityId,
        kind: OverlayKind,
    ) -> HostResult<OverlayHandle> {
        if !self.contains(avatar) {
            return Err(HostError::EntityNotFound(avatar));
        }

        let handle = OverlayHandle(self.next_handle());
        self.overlays.insert(handle, avatar);
        self.emit(WorldOutput::OverlayAttached {
            handle,
            player: player.clone(),
            avatar,
            kind,
        });
        Ok(handle)
    }

    fn remove_overlay(&mut self, overlay: OverlayHandle) -> HostResult<()> {
        self.overlays
            .remove(&overlay)
            .ok_or(HostError::OverlayNotFound(overlay.0))?;
        self.emit(WorldOutput::OverlayRemoved { handle: overlay });
        Ok(())
    }

    fn play_audio(&mut self, cue: AudioCue) -> AudioHandle {
        let handle = AudioHandle(self.next_handle());
        if cue.is_looping() {
            self.audio.insert(handle);
        }
        self.emit(WorldOutput::AudioStarted { handle, cue });
        handle
    }

    fn stop_audio(&mut self, handle: AudioHandle) {
        if self.audio.remove(&handle) {
            self.emit(WorldOutput::AudioStopped { handle });
        }
    }

    fn set_display_lines(&mut self, entity: EntityId, lines: &[String]) -> HostResult<()> {
        if !self.contains(entity) {
            return Err(HostError::EntityNotFound(entity));
        }
        self.emit(WorldOutput::DisplayLines {
            entity,
            lines: lines.to_vec(),
        });
        Ok(())
    }
}
