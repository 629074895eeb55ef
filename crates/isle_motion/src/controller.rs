//! Per-zone motion controller
//!
//! Owns every mover of one zone and advances them from that zone's tick.
//! A mover is dropped (its tick listener detached) as soon as its entity
//! is no longer present, or once a non-looping path completes.

use crate::error::Result;
use crate::mover::{KinematicMover, SpinMover};
use crate::path::MotionPath;
use glam::{Quat, Vec3};
use isle_core::{EntityId, Transform, ZoneWorld};
use std::collections::BTreeMap;

enum Mover {
    Path { mover: KinematicMover, rotation: Quat },
    Spin { mover: SpinMover, position: Vec3 },
}

/// Tick-driven motion for the movers of one zone
#[derive(Default)]
pub struct MotionController {
    movers: BTreeMap<EntityId, Mover>,
}

impl MotionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a motion path to a spawned kinematic entity.
    ///
    /// An invalid path is returned as an error and nothing is attached.
    pub fn attach(&mut self, entity: EntityId, path: &MotionPath, origin: Transform) -> Result<()> {
        let mover = match path {
            MotionPath::Waypoints {
                points,
                speed,
                looping,
            } => Mover::Path {
                mover: KinematicMover::new(points.clone(), *speed, *looping)?,
                rotation: origin.rotation,
            },
            MotionPath::Spin {
                axis,
                degrees_per_second,
            } => Mover::Spin {
                mover: SpinMover::new(*axis, *degrees_per_second, origin.rotation)?,
                position: origin.position,
            },
        };

        self.movers.insert(entity, mover);
        Ok(())
    }

    /// Detach a mover; returns whether one was attached
    pub fn detach(&mut self, entity: EntityId) -> bool {
        self.movers.remove(&entity).is_some()
    }

    /// Check if an entity has an active listener
    pub fn is_attached(&self, entity: EntityId) -> bool {
        self.movers.contains_key(&entity)
    }

    /// Number of active movers
    pub fn len(&self) -> usize {
        self.movers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movers.is_empty()
    }

    /// Drop every mover (zone content unloaded)
    pub fn clear(&mut self) {
        self.movers.clear();
    }

    /// Advance every mover and push its next kinematic pose.
    ///
    /// Returns the number of listeners detached during this tick.
    pub fn tick(&mut self, world: &mut dyn ZoneWorld, delta_ms: f32) -> usize {
        let mut detached = Vec::new();

        for (&entity, mover) in self.movers.iter_mut() {
            if !world.contains(entity) {
                detached.push(entity);
                continue;
            }

            let (position, rotation, done) = match mover {
                Mover::Path { mover, rotation } => {
                    let step = mover.advance(delta_ms);
                    (step.position(), *rotation, step.is_finished())
                }
                Mover::Spin { mover, position } => (*position, mover.advance(delta_ms), false),
            };

            if let Err(e) = world.set_next_kinematic_pose(entity, position, rotation) {
                log::warn!("Mover {} rejected its next pose: {}", entity, e);
                detached.push(entity);
                continue;
            }

            if done {
                detached.push(entity);
            }
        }

        for entity in &detached {
            self.movers.remove(entity);
            log::debug!("Detached motion listener for {}", entity);
        }

        detached.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use isle_core::testing::MockWorld;
    use isle_core::{BodyKind, EntityKind, EntitySpec};

    fn spawn_platform(world: &mut MockWorld) -> EntityId {
        world
            .spawn(
                EntitySpec::new(
                    EntityKind::Model {
                        asset: "platform".into(),
                    },
                    Transform::default(),
                )
                .with_body(BodyKind::Kinematic),
            )
            .unwrap()
    }

    #[test]
    fn test_line_reaches_end_and_detaches() {
        let mut world = MockWorld::new();
        let platform = spawn_platform(&mut world);

        let mut motion = MotionController::new();
        let path = MotionPath::waypoints(vec![Vec3::ZERO, Vec3::new(10.0, 0.0, 0.0)], 5.0, false);
        motion.attach(platform, &path, Transform::default()).unwrap();

        for _ in 0..10 {
            motion.tick(&mut world, 100.0);
        }
        assert_abs_diff_eq!(world.position(platform).unwrap().x, 5.0, epsilon = 1e-4);

        for _ in 0..10 {
            motion.tick(&mut world, 100.0);
        }
        assert_eq!(world.position(platform), Some(Vec3::new(10.0, 0.0, 0.0)));
        assert!(!motion.is_attached(platform));

        let pushes = world.kinematic_pushes().len();
        motion.tick(&mut world, 100.0);
        motion.tick(&mut world, 100.0);
        assert_eq!(world.kinematic_pushes().len(), pushes);
        assert_eq!(world.position(platform), Some(Vec3::new(10.0, 0.0, 0.0)));
    }

    #[test]
    fn test_moves_through_kinematic_pushes() {
        let mut world = MockWorld::new();
        let platform = spawn_platform(&mut world);

        let mut motion = MotionController::new();
        let path = MotionPath::waypoints(vec![Vec3::ZERO, Vec3::new(0.0, 4.0, 0.0)], 2.0, true);
        motion.attach(platform, &path, Transform::default()).unwrap();

        motion.tick(&mut world, 16.0);
        motion.tick(&mut world, 16.0);
        assert_eq!(world.kinematic_pushes().len(), 2);
        assert!(world.kinematic_pushes().iter().all(|(e, _, _)| *e == platform));
    }

    #[test]
    fn test_detaches_when_entity_is_gone() {
        let mut world = MockWorld::new();
        let platform = spawn_platform(&mut world);

        let mut motion = MotionController::new();
        motion
            .attach(platform, &MotionPath::spin(Vec3::Y, 45.0), Transform::default())
            .unwrap();

        world.remove_silently(platform);
        assert_eq!(motion.tick(&mut world, 16.0), 1);
        assert!(motion.is_empty());
        assert!(world.kinematic_pushes().is_empty());
    }

    #[test]
    fn test_invalid_path_is_not_attached() {
        let mut world = MockWorld::new();
        let platform = spawn_platform(&mut world);

        let mut motion = MotionController::new();
        let path = MotionPath::waypoints(vec![Vec3::ZERO], 5.0, false);
        assert!(motion.attach(platform, &path, Transform::default()).is_err());
        assert!(!motion.is_attached(platform));
    }
}
