//! Conversions between host types and Rapier types

use glam::{Quat, Vec3};
use isle_core::{BodyKind, CollisionGroups, EntityId, Shape, Transform};
use rapier3d::na::{Quaternion, UnitQuaternion};
use rapier3d::prelude as rapier;

pub fn vector(v: Vec3) -> rapier::Vector<f32> {
    rapier::Vector::new(v.x, v.y, v.z)
}

pub fn vec3(v: &rapier::Vector<f32>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

pub fn rotation(q: Quat) -> UnitQuaternion<f32> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

pub fn quat(q: &UnitQuaternion<f32>) -> Quat {
    Quat::from_xyzw(q.i, q.j, q.k, q.w)
}

pub fn isometry(position: Vec3, rot: Quat) -> rapier::Isometry<f32> {
    rapier::Isometry::from_parts(
        rapier::Translation::new(position.x, position.y, position.z),
        rotation(rot),
    )
}

pub fn transform_isometry(transform: &Transform) -> rapier::Isometry<f32> {
    isometry(transform.position, transform.rotation)
}

/// Body type, or `None` when the entity has no body
pub fn body_type(kind: BodyKind) -> Option<rapier::RigidBodyType> {
    match kind {
        BodyKind::Fixed => Some(rapier::RigidBodyType::Fixed),
        BodyKind::Kinematic => Some(rapier::RigidBodyType::KinematicPositionBased),
        BodyKind::Dynamic => Some(rapier::RigidBodyType::Dynamic),
        BodyKind::None => None,
    }
}

pub fn shared_shape(shape: &Shape) -> rapier::SharedShape {
    match *shape {
        Shape::Cuboid { half_extents } => {
            rapier::SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        Shape::Ball { radius } => rapier::SharedShape::ball(radius),
        Shape::Capsule {
            half_height,
            radius,
        } => rapier::SharedShape::capsule_y(half_height, radius),
    }
}

pub fn interaction_groups(groups: &CollisionGroups) -> rapier::InteractionGroups {
    rapier::InteractionGroups::new(
        rapier::Group::from_bits_truncate(groups.memberships),
        rapier::Group::from_bits_truncate(groups.filter),
    )
}

/// Entity ids ride in collider user data
pub fn user_data(entity: EntityId) -> u128 {
    entity.raw() as u128
}

pub fn entity_from_user_data(data: u128) -> Option<EntityId> {
    u64::try_from(data).ok().filter(|&raw| raw != 0).map(EntityId::from_raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rotation_round_trips() {
        let q = Quat::from_axis_angle(Vec3::Y, 1.2);
        let back = quat(&rotation(q));
        assert_abs_diff_eq!(back.dot(q).abs(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_user_data_skips_zero() {
        assert_eq!(entity_from_user_data(0), None);
        assert_eq!(
            entity_from_user_data(user_data(EntityId::from_raw(7))),
            Some(EntityId::from_raw(7))
        );
    }
}
