//! # isle_core - Isles Core
//!
//! Shared primitives for every other crate in the workspace:
//! - Identifiers for entities, players and zones
//! - Transforms and collision layers
//! - The [`ZoneWorld`] contract the host engine fulfils for each zone
//! - UI messages and contact events exchanged with the host
//!
//! ## Host boundary
//! Physics, replication, rendering and audio playback live in the host
//! engine. The orchestration crates only talk to a zone through
//! [`ZoneWorld`], which keeps them testable against [`testing::MockWorld`].

pub mod error;
pub mod host;
pub mod id;
pub mod layers;
pub mod transform;
pub mod ui;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::*;
pub use host::*;
pub use id::*;
pub use layers::*;
pub use transform::*;
pub use ui::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{HostError, HostResult};
    pub use crate::host::{
        AudioCue, AudioHandle, BodyKind, ContactEvent, ContactPhase, EntityKind, EntitySpec,
        OverlayHandle, OverlayKind, Shape, ZoneWorld,
    };
    pub use crate::id::{EntityId, EntityIdAllocator, PlayerId, ZoneId};
    pub use crate::layers::{CollisionGroups, CollisionLayer};
    pub use crate::transform::Transform;
    pub use crate::ui::{NoticeKind, UiMessage, ZoneUnlockFlag};
    pub use glam::{Quat, Vec3};
}
