//! Isle Motion - Kinematic Waypoint Motion
//!
//! Drives fixed-path entities (hazards, moving platforms) from a zone's tick
//! clock. Positions are pushed as next kinematic poses so the physics step
//! can carry and push players resting on a mover.
//!
//! # Example
//!
//! ```ignore
//! use isle_motion::prelude::*;
//!
//! let mut motion = MotionController::new();
//! motion.attach(platform, &MotionPath::waypoints(points, 5.0, true), origin)?;
//!
//! // every zone tick
//! motion.tick(&mut world, delta_ms);
//! ```

pub mod controller;
pub mod error;
pub mod mover;
pub mod path;

pub mod prelude {
    pub use crate::controller::MotionController;
    pub use crate::error::{MotionError, Result};
    pub use crate::mover::{KinematicMover, MotionStep, SpinMover};
    pub use crate::path::MotionPath;
}

pub use prelude::*;
