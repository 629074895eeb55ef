//! # Isle Physics
//!
//! A [`ZoneWorld`](isle_core::ZoneWorld) built on Rapier 3D. Each zone gets
//! its own [`PhysicsZoneWorld`], so zones never see each other's bodies.
//!
//! ## Features
//!
//! - Fixed-timestep simulation with an accumulator
//! - Kinematic position-based movers driven by next-pose pushes
//! - Dynamic capsule avatars with locked rotation
//! - Sensor colliders reporting contact begin/end per entity
//! - Presentation outbox (UI, overlays, audio, boards) for the transport
//!
//! ## Example
//!
//! ```ignore
//! use isle_physics::prelude::*;
//!
//! let mut world = PhysicsZoneWorld::new(PhysicsConfig::default());
//! let contacts = world.step(16.0);
//! for output in world.drain_outputs() {
//!     transport.replicate(output);
//! }
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod events;
pub mod outbox;
pub mod world;

pub mod prelude {
    pub use crate::config::PhysicsConfig;
    pub use crate::error::{PhysicsError, Result};
    pub use crate::outbox::{WorldOutput, ZoneOutput};
    pub use crate::world::PhysicsZoneWorld;
}

pub use prelude::*;
