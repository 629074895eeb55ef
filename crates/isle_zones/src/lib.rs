//! Isle Zones - Zone Registry and Content Loading
//!
//! One isolated world per declared zone, created once at startup.
//!
//! # Features
//!
//! - Declarative zone descriptors (JSON)
//! - Idempotent content loading per zone
//! - Collectible visibility and cooldown lifecycle
//! - Entity metadata side-table
//! - Bidirectional zone id ↔ handle lookup
//!
//! # Example
//!
//! ```ignore
//! use isle_zones::prelude::*;
//!
//! let mut zones = ZoneRegistry::initialize(descriptors, |_| Box::new(MockWorld::new()))?;
//! let meadow = ZoneId::new("meadow");
//! let handle = zones.require(&meadow)?;
//! if let Some(zone) = zones.get_mut(handle) {
//!     zone.load_content()?;
//! }
//! ```

pub mod collectible;
pub mod descriptor;
pub mod error;
pub mod loader;
pub mod meta;
pub mod registry;

pub mod prelude {
    pub use crate::collectible::{CollectibleState, CollectibleTracker, Pickup};
    pub use crate::descriptor::{
        BoardPlacement, CollectiblePlacement, MoverPlacement, StaticPlacement, ZoneDescriptor,
    };
    pub use crate::error::{Result, ZoneError};
    pub use crate::loader::{LoadOutcome, ZoneContentLoader};
    pub use crate::meta::{EntityMeta, EntityRole, EntityTable};
    pub use crate::registry::{ZoneHandle, ZoneInstance, ZoneRegistry};
}

pub use prelude::*;
