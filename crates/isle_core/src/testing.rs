//! Recording in-memory world for tests
//!
//! `MockWorld` keeps every entity in a map, applies kinematic pushes
//! immediately and returns injected contacts from `step`. Everything it is
//! asked to do is recorded so tests can assert on it.

use crate::error::{HostError, HostResult};
use crate::host::{
    AudioCue, AudioHandle, ContactEvent, EntityKind, EntitySpec, OverlayHandle, OverlayKind,
    ZoneWorld,
};
use crate::id::{EntityId, EntityIdAllocator, PlayerId};
use crate::ui::UiMessage;
use glam::{Quat, Vec3};
use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;

/// A live entity in the mock world
#[derive(Debug, Clone)]
pub struct MockEntity {
    pub spec: EntitySpec,
    pub position: Vec3,
    pub rotation: Quat,
}

/// Recording [`ZoneWorld`] implementation
#[derive(Default)]
pub struct MockWorld {
    ids: EntityIdAllocator,
    entities: HashMap<EntityId, MockEntity>,
    spawn_log: Vec<EntityId>,
    despawn_log: Vec<EntityId>,
    kinematic_log: Vec<(EntityId, Vec3, Quat)>,
    ui_log: Vec<(PlayerId, UiMessage)>,
    overlays: HashMap<OverlayHandle, (PlayerId, EntityId, OverlayKind)>,
    next_handle: u64,
    audio: HashMap<AudioHandle, AudioCue>,
    displays: HashMap<EntityId, Vec<String>>,
    pending_contacts: Vec<ContactEvent>,
    maps: Vec<String>,
    elapsed_ms: f32,
    refuse_avatars: bool,
}

impl MockWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a contact to be reported by the next `step`
    pub fn push_contact(&mut self, event: ContactEvent) {
        self.pending_contacts.push(event);
    }

    /// Move an entity without going through the host API
    pub fn set_position(&mut self, entity: EntityId, position: Vec3) {
        if let Some(e) = self.entities.get_mut(&entity) {
            e.position = position;
        }
    }

    /// Make avatar spawns fail with a backend error
    pub fn refuse_avatars(&mut self, refuse: bool) {
        self.refuse_avatars = refuse;
    }

    /// Remove an entity behind the orchestrator's back
    pub fn remove_silently(&mut self, entity: EntityId) {
        self.entities.remove(&entity);
    }

    pub fn entity(&self, entity: EntityId) -> Option<&MockEntity> {
        self.entities.get(&entity)
    }

    /// Live entities matching a predicate on their kind
    pub fn find(&self, pred: impl Fn(&EntityKind) -> bool) -> Vec<EntityId> {
        let mut ids: Vec<_> = self
            .entities
            .iter()
            .filter(|(_, e)| pred(&e.spec.kind))
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    /// Live model entities using an asset
    pub fn models(&self, asset: &str) -> Vec<EntityId> {
        self.find(|k| matches!(k, EntityKind::Model { asset: a } if a == asset))
    }

    /// Live avatar of a player
    pub fn avatar_of(&self, player: &PlayerId) -> Option<EntityId> {
        self.find(|k| matches!(k, EntityKind::Avatar { player: p } if p == player))
            .into_iter()
            .next()
    }

    /// Live emitters
    pub fn emitters(&self) -> Vec<EntityId> {
        self.find(|k| matches!(k, EntityKind::Emitter { .. }))
    }

    pub fn live_count(&self) -> usize {
        self.entities.len()
    }

    pub fn spawn_count(&self) -> usize {
        self.spawn_log.len()
    }

    pub fn despawn_count(&self) -> usize {
        self.despawn_log.len()
    }

    pub fn kinematic_pushes(&self) -> &[(EntityId, Vec3, Quat)] {
        &self.kinematic_log
    }

    /// UI messages sent to a player, oldest first
    pub fn ui_for(&self, player: &PlayerId) -> Vec<&UiMessage> {
        self.ui_log
            .iter()
            .filter(|(p, _)| p == player)
            .map(|(_, m)| m)
            .collect()
    }

    pub fn clear_ui(&mut self) {
        self.ui_log.clear();
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn playing_audio(&self) -> usize {
        self.audio.len()
    }

    pub fn display_lines(&self, entity: EntityId) -> Option<&[String]> {
        self.displays.get(&entity).map(|l| l.as_slice())
    }

    pub fn loaded_maps(&self) -> &[String] {
        &self.maps
    }

    pub fn elapsed_ms(&self) -> f32 {
        self.elapsed_ms
    }
}

impl ZoneWorld for MockWorld {
    fn load_map(&mut self, map: &str) -> HostResult<()> {
        self.maps.push(map.to_string());
        Ok(())
    }

    fn spawn(&mut self, spec: EntitySpec) -> HostResult<EntityId> {
        if self.refuse_avatars && matches!(spec.kind, EntityKind::Avatar { .. }) {
            return Err(HostError::Backend("avatar spawns refused".into()));
        }
        let id = self.ids.allocate();
        let position = spec.transform.position;
        let rotation = spec.transform.rotation;
        self.entities.insert(
            id,
            MockEntity {
                spec,
                position,
                rotation,
            },
        );
        self.spawn_log.push(id);
        Ok(id)
    }

    fn despawn(&mut self, entity: EntityId) -> HostResult<()> {
        if self.entities.remove(&entity).is_none() {
            return Err(HostError::EntityNotFound(entity));
        }
        self.displays.remove(&entity);
        self.despawn_log.push(entity);
        Ok(())
    }

    fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.entities.get(&entity).map(|e| e.position)
    }

    fn teleport(&mut self, entity: EntityId, position: Vec3) -> HostResult<()> {
        let e = self
            .entities
            .get_mut(&entity)
            .ok_or(HostError::EntityNotFound(entity))?;
        e.position = position;
        Ok(())
    }

    fn set_next_kinematic_pose(
        &mut self,
        entity: EntityId,
        position: Vec3,
        rotation: Quat,
    ) -> HostResult<()> {
        let e = self
            .entities
            .get_mut(&entity)
            .ok_or(HostError::EntityNotFound(entity))?;
        e.position = position;
        e.rotation = rotation;
        self.kinematic_log.push((entity, position, rotation));
        Ok(())
    }

    fn step(&mut self, delta_ms: f32) -> Vec<ContactEvent> {
        self.elapsed_ms += delta_ms;
        std::mem::take(&mut self.pending_contacts)
    }

    fn send_ui(&mut self, player: &PlayerId, message: UiMessage) {
        self.ui_log.push((player.clone(), message));
    }

    fn attach_overlay(
        &mut self,
        player: &PlayerId,
        avatar: EntityId,
        kind: OverlayKind,
    ) -> HostResult<OverlayHandle> {
        if !self.entities.contains_key(&avatar) {
            return Err(HostError::EntityNotFound(avatar));
        }
        self.next_handle += 1;
        let handle = OverlayHandle(self.next_handle);
        self.overlays.insert(handle, (player.clone(), avatar, kind));
        Ok(handle)
    }

    fn remove_overlay(&mut self, overlay: OverlayHandle) -> HostResult<()> {
        self.overlays
            .remove(&overlay)
            .map(|_| ())
            .ok_or(HostError::OverlayNotFound(overlay.0))
    }

    fn play_audio(&mut self, cue: AudioCue) -> AudioHandle {
        self.next_handle += 1;
        let handle = AudioHandle(self.next_handle);
        self.audio.insert(handle, cue);
        handle
    }

    fn stop_audio(&mut self, handle: AudioHandle) {
        self.audio.remove(&handle);
    }

    fn set_display_lines(&mut self, entity: EntityId, lines: &[String]) -> HostResult<()> {
        if !self.entities.contains_key(&entity) {
            return Err(HostError::EntityNotFound(entity));
        }
        self.displays.insert(entity, lines.to_vec());
        Ok(())
    }
}

/// Cloneable handle to a [`MockWorld`].
///
/// Lets a test keep inspecting a world after handing it over as a
/// `Box<dyn ZoneWorld>`.
#[derive(Clone, Default)]
pub struct SharedMockWorld(Arc<Mutex<MockWorld>>);

impl SharedMockWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// A boxed world backed by the same state
    pub fn boxed(&self) -> Box<dyn ZoneWorld> {
        Box::new(self.clone())
    }

    pub fn lock(&self) -> MutexGuard<'_, MockWorld> {
        self.0.lock()
    }
}

impl ZoneWorld for SharedMockWorld {
    fn load_map(&mut self, map: &str) -> HostResult<()> {
        self.0.lock().load_map(map)
    }

    fn spawn(&mut self, spec: EntitySpec) -> HostResult<EntityId> {
        self.0.lock().spawn(spec)
    }

    fn despawn(&mut self, entity: EntityId) -> HostResult<()> {
        self.0.lock().despawn(entity)
    }

    fn contains(&self, entity: EntityId) -> bool {
        self.0.lock().contains(entity)
    }

    fn position(&self, entity: EntityId) -> Option<Vec3> {
        self.0.lock().position(entity)
    }

    fn teleport(&mut self, entity: EntityId, position: Vec3) -> HostResult<()> {
        self.0.lock().teleport(entity, position)
    }

    fn set_next_kinematic_pose(
        &mut self,
        entity: EntityId,
        position: Vec3,
        rotation: Quat,
    ) -> HostResult<()> {
        self.0.lock().set_next_kinematic_pose(entity, position, rotation)
    }

    fn step(&mut self, delta_ms: f32) -> Vec<ContactEvent> {
        self.0.lock().step(delta_ms)
    }

    fn send_ui(&mut self, player: &PlayerId, message: UiMessage) {
        self.0.lock().send_ui(player, message)
    }

    fn attach_overlay(
        &mut self,
        player: &PlayerId,
        avatar: EntityId,
        kind: OverlayKind,
    ) -> HostResult<OverlayHandle> {
        self.0.lock().attach_overlay(player, avatar, kind)
    }

    fn remove_overlay(&mut self, overlay: OverlayHandle) -> HostResult<()> {
        self.0.lock().remove_overlay(overlay)
    }

    fn play_audio(&mut self, cue: AudioCue) -> AudioHandle {
        self.0.lock().play_audio(cue)
    }

    fn stop_audio(&mut self, handle: AudioHandle) {
        self.0.lock().stop_audio(handle)
    }

    fn set_display_lines(&mut self, entity: EntityId, lines: &[String]) -> HostResult<()> {
        self.0.lock().set_display_lines(entity, lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Transform;

    #[test]
    fn test_despawn_twice_reports_missing() {
        let mut world = MockWorld::new();
        let id = world
            .spawn(EntitySpec::new(
                EntityKind::Model { asset: "rock".into() },
                Transform::default(),
            ))
            .unwrap();

        assert!(world.despawn(id).is_ok());
        assert_eq!(world.despawn(id), Err(HostError::EntityNotFound(id)));
    }

    #[test]
    fn test_step_drains_contacts() {
        let mut world = MockWorld::new();
        let a = EntityId::from_raw(1);
        let b = EntityId::from_raw(2);
        world.push_contact(ContactEvent::begin(a, b));

        assert_eq!(world.step(16.0).len(), 1);
        assert!(world.step(16.0).is_empty());
    }
}
