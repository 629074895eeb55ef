//! Collision layers and filtering

use serde::{Deserialize, Serialize};

/// A collision layer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollisionLayer(pub u32);

impl CollisionLayer {
    /// Static level geometry and obstacles
    pub const ENVIRONMENT: Self = Self(0);
    /// Player avatars
    pub const PLAYER: Self = Self(1);
    /// Kinematic hazards and moving platforms
    pub const MOVERS: Self = Self(2);
    /// Collectible sensors
    pub const PICKUPS: Self = Self(3);
    /// Non-colliding decoration (emitters, boards)
    pub const DECORATION: Self = Self(4);

    /// Get the layer as a bitmask
    pub fn as_mask(&self) -> u32 {
        1 << self.0
    }
}

/// Collision groups for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionGroups {
    /// Which groups this object belongs to (membership)
    pub memberships: u32,
    /// Which groups this object can collide with (filter)
    pub filter: u32,
}

impl CollisionGroups {
    /// Collide with everything
    pub const ALL: Self = Self {
        memberships: u32::MAX,
        filter: u32::MAX,
    };

    /// Collide with nothing
    pub const NONE: Self = Self {
        memberships: 0,
        filter: 0,
    };

    /// Create from a single layer that collides with specific layers
    pub fn from_layer(layer: CollisionLayer, collides_with: &[CollisionLayer]) -> Self {
        let memberships = layer.as_mask();
        let filter = collides_with.iter().fold(0u32, |acc, l| acc | l.as_mask());
        Self { memberships, filter }
    }

    /// Avatars touch the world, movers and pickups but never each other
    pub fn avatar() -> Self {
        Self::from_layer(
            CollisionLayer::PLAYER,
            &[
                CollisionLayer::ENVIRONMENT,
                CollisionLayer::MOVERS,
                CollisionLayer::PICKUPS,
            ],
        )
    }

    /// Static obstacles
    pub fn environment() -> Self {
        Self::from_layer(
            CollisionLayer::ENVIRONMENT,
            &[CollisionLayer::PLAYER, CollisionLayer::MOVERS],
        )
    }

    /// Kinematic hazards and platforms
    pub fn mover() -> Self {
        Self::from_layer(
            CollisionLayer::MOVERS,
            &[CollisionLayer::PLAYER, CollisionLayer::ENVIRONMENT],
        )
    }

    /// Collectible sensors only report players
    pub fn pickup() -> Self {
        Self::from_layer(CollisionLayer::PICKUPS, &[CollisionLayer::PLAYER])
    }

    /// Visual-only entities
    pub fn decoration() -> Self {
        Self::from_layer(CollisionLayer::DECORATION, &[])
    }

    /// Check if two groups can collide
    pub fn can_collide(&self, other: &CollisionGroups) -> bool {
        (self.memberships & other.filter) != 0 && (other.memberships & self.filter) != 0
    }
}

impl Default for CollisionGroups {
    fn default() -> Self {
        Self::ALL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatars_do_not_collide_with_each_other() {
        let a = CollisionGroups::avatar();
        let b = CollisionGroups::avatar();
        assert!(!a.can_collide(&b));
    }

    #[test]
    fn test_avatars_collide_with_world_and_movers() {
        let avatar = CollisionGroups::avatar();
        assert!(avatar.can_collide(&CollisionGroups::environment()));
        assert!(avatar.can_collide(&CollisionGroups::mover()));
        assert!(avatar.can_collide(&CollisionGroups::pickup()));
    }

    #[test]
    fn test_decoration_is_inert() {
        let deco = CollisionGroups::decoration();
        assert!(!deco.can_collide(&CollisionGroups::avatar()));
        assert!(!deco.can_collide(&CollisionGroups::environment()));
    }
}
