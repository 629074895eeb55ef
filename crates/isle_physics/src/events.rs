//! Sensor contact collection

use crate::convert::entity_from_user_data;
use isle_core::{ContactEvent, ContactPhase};
use rapier3d::prelude as rapier;

/// Channel-based event collector handed to the Rapier pipeline
pub(crate) struct ChannelEventCollector {
    pub(crate) collision_events: crossbeam_channel::Sender<rapier::CollisionEvent>,
}

impl rapier::EventHandler for ChannelEventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        event: rapier::CollisionEvent,
        _contact_pair: Option<&rapier::ContactPair>,
    ) {
        let _ = self.collision_events.send(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &rapier::RigidBodySet,
        _colliders: &rapier::ColliderSet,
        _contact_pair: &rapier::ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

/// Turn a Rapier collision event into a sensor contact.
///
/// Only pairs with exactly one sensor side are reported; contacts between
/// solid bodies are resolved by the solver and never surface. Pairs whose
/// collider was removed during the step are dropped.
pub(crate) fn to_contact(
    colliders: &rapier::ColliderSet,
    event: rapier::CollisionEvent,
) -> Option<ContactEvent> {
    let (h1, h2, phase) = match event {
        rapier::CollisionEvent::Started(h1, h2, _) => (h1, h2, ContactPhase::Begin),
        rapier::CollisionEvent::Stopped(h1, h2, _) => (h1, h2, ContactPhase::End),
    };

    let c1 = colliders.get(h1)?;
    let c2 = colliders.get(h2)?;

    let (sensor, other) = match (c1.is_sensor(), c2.is_sensor()) {
        (true, false) => (c1, c2),
        (false, true) => (c2, c1),
        _ => return None,
    };

    Some(ContactEvent {
        sensor: entity_from_user_data(sensor.user_data)?,
        other: entity_from_user_data(other.user_data)?,
        phase,
    })
}
