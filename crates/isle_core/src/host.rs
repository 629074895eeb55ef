//! Host world contract
//!
//! One [`ZoneWorld`] per zone. The host engine implements it on top of its
//! physics, replication and presentation layers; the orchestration crates
//! only consume it.

use crate::error::HostResult;
use crate::id::{EntityId, PlayerId};
use crate::layers::CollisionGroups;
use crate::transform::Transform;
use crate::ui::UiMessage;
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

/// How the physics step treats an entity's body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves
    Fixed,
    /// Moved only through next-kinematic-pose pushes
    Kinematic,
    /// Simulated (avatars)
    Dynamic,
    /// No body at all (attached emitters, boards)
    None,
}

/// Collision shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Shape {
    Cuboid { half_extents: Vec3 },
    Ball { radius: f32 },
    Capsule { half_height: f32, radius: f32 },
}

impl Default for Shape {
    fn default() -> Self {
        Self::Cuboid {
            half_extents: Vec3::splat(0.5),
        }
    }
}

/// What an entity is, as far as the host's presentation layer cares
#[derive(Debug, Clone, PartialEq)]
pub enum EntityKind {
    /// A placed model asset
    Model { asset: String },
    /// A player avatar
    Avatar { player: PlayerId },
    /// A particle emitter following another entity
    Emitter { effect: String, attached_to: EntityId },
    /// A text board
    Display { asset: String },
}

/// Everything the host needs to spawn an entity
#[derive(Debug, Clone)]
pub struct EntitySpec {
    pub kind: EntityKind,
    pub body: BodyKind,
    pub shape: Shape,
    /// Sensors report contacts but never push anything
    pub sensor: bool,
    pub transform: Transform,
    pub groups: CollisionGroups,
}

impl EntitySpec {
    /// Create a spec with a fixed body and default shape
    pub fn new(kind: EntityKind, transform: Transform) -> Self {
        Self {
            kind,
            body: BodyKind::Fixed,
            shape: Shape::default(),
            sensor: false,
            transform,
            groups: CollisionGroups::environment(),
        }
    }

    /// Set body kind
    pub fn with_body(mut self, body: BodyKind) -> Self {
        self.body = body;
        self
    }

    /// Set shape
    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = shape;
        self
    }

    /// Mark as sensor
    pub fn as_sensor(mut self) -> Self {
        self.sensor = true;
        self
    }

    /// Set collision groups
    pub fn with_groups(mut self, groups: CollisionGroups) -> Self {
        self.groups = groups;
        self
    }
}

/// Contact phase reported by a sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactPhase {
    Begin,
    End,
}

/// Contact between a sensor entity and another entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub sensor: EntityId,
    pub other: EntityId,
    pub phase: ContactPhase,
}

impl ContactEvent {
    pub fn begin(sensor: EntityId, other: EntityId) -> Self {
        Self {
            sensor,
            other,
            phase: ContactPhase::Begin,
        }
    }

    pub fn end(sensor: EntityId, other: EntityId) -> Self {
        Self {
            sensor,
            other,
            phase: ContactPhase::End,
        }
    }
}

/// Overlay widgets that can be attached to a player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverlayKind {
    /// Jump charge / progress meter above the avatar
    ChargeMeter,
}

/// Handle to an attached overlay widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayHandle(pub u64);

/// Handle to a playing audio cue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioHandle(pub u64);

/// An audio cue to play
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCue {
    /// One-shot at a world position
    At { asset: String, position: Vec3 },
    /// Looping, follows an entity
    Attached {
        asset: String,
        entity: EntityId,
        looping: bool,
    },
}

impl AudioCue {
    /// Plays until stopped; everything else ends on its own
    pub fn is_looping(&self) -> bool {
        matches!(self, Self::Attached { looping: true, .. })
    }
}

/// One isolated simulation world as provided by the host engine
pub trait ZoneWorld: Send {
    /// Load the zone's map asset
    fn load_map(&mut self, map: &str) -> HostResult<()>;

    /// Spawn an entity
    fn spawn(&mut self, spec: EntitySpec) -> HostResult<EntityId>;

    /// Despawn an entity; `EntityNotFound` if it is already gone
    fn despawn(&mut self, entity: EntityId) -> HostResult<()>;

    /// Check if an entity is present
    fn contains(&self, entity: EntityId) -> bool;

    /// Current position of an entity
    fn position(&self, entity: EntityId) -> Option<Vec3>;

    /// Instantly move an entity (avatars)
    fn teleport(&mut self, entity: EntityId, position: Vec3) -> HostResult<()>;

    /// Push the next pose of a kinematic body; the physics step derives
    /// contact velocities from it instead of teleporting
    fn set_next_kinematic_pose(
        &mut self,
        entity: EntityId,
        position: Vec3,
        rotation: Quat,
    ) -> HostResult<()>;

    /// Advance the simulation and collect sensor contacts
    fn step(&mut self, delta_ms: f32) -> Vec<ContactEvent>;

    /// Send a message to a player's UI channel
    fn send_ui(&mut self, player: &PlayerId, message: UiMessage);

    /// Attach an overlay widget to a player's avatar
    fn attach_overlay(
        &mut self,
        player: &PlayerId,
        avatar: EntityId,
        kind: OverlayKind,
    ) -> HostResult<OverlayHandle>;

    /// Remove an overlay widget
    fn remove_overlay(&mut self, overlay: OverlayHandle) -> HostResult<()>;

    /// Play an audio cue
    fn play_audio(&mut self, cue: AudioCue) -> AudioHandle;

    /// Stop an audio cue; unknown handles are ignored
    fn stop_audio(&mut self, handle: AudioHandle);

    /// Replace the text lines on a display entity
    fn set_display_lines(&mut self, entity: EntityId, lines: &[String]) -> HostResult<()>;
}
