//! Isle Session - Player Session Orchestration
//!
//! Tracks each player's live resources in a zone and moves them between
//! zones.
//!
//! # Features
//!
//! - Join / leave / switch-zone lifecycle with synchronous teardown
//! - Collectible gating with once-per-player leaderboard admission
//! - Tick-accumulated fallen-player recovery
//! - Consume-once welcome messages after a transfer
//! - Tagged zone events for deterministic dispatch
//!
//! # Example
//!
//! ```ignore
//! use isle_session::prelude::*;
//!
//! let mut service = PlayerSessionService::new(config, zones, store, catalog);
//! service.join(&player, "Ada", &ZoneId::new("meadow"))?;
//!
//! loop {
//!     service.tick_all(16.0);
//!     for transfer in service.drain_transfers() {
//!         service.complete_transfer(&transfer)?;
//!     }
//! }
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod event;
pub mod gate;
pub mod pending;
pub mod recovery;
pub mod service;
pub mod session;

pub mod prelude {
    pub use crate::audio::AudioCache;
    pub use crate::config::SessionConfig;
    pub use crate::error::{Result, SessionError};
    pub use crate::event::ZoneEvent;
    pub use crate::gate::{refresh_boards, CollectibleGate, GateContext, GateOutcome};
    pub use crate::pending::{PendingMessages, TransferRequest};
    pub use crate::recovery::FallRecovery;
    pub use crate::service::PlayerSessionService;
    pub use crate::session::{PlayerSession, SessionTable};
}

pub use prelude::*;
