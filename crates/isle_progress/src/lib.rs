//! Isle Progress - Durable Player Progression
//!
//! This crate owns everything that outlives a session.
//!
//! # Features
//!
//! - Player records with default reconciliation on every read
//! - Key-value stores (in-memory and file backed, JSON or binary)
//! - Fetch → merge → write progression updates
//! - Per-zone finisher leaderboards with once-per-player admission
//! - Cosmetic catalogue and all-or-nothing purchases
//! - Zone unlock chain derived from collected-item history
//!
//! # Example
//!
//! ```ignore
//! use isle_progress::prelude::*;
//!
//! let store: SharedStore = Arc::new(MemoryStore::new());
//! let progression = ProgressionStore::new(store.clone(), catalog.record_defaults(first_zone));
//!
//! let outcome = progression.record_collection(&player, "meadow/c3", 1)?;
//! if outcome.first_time {
//!     leaderboards.admit(&zone, &player, "Ada")?;
//! }
//! ```

pub mod cosmetics;
pub mod leaderboard;
pub mod progression;
pub mod record;
pub mod store;
pub mod unlock;

pub mod prelude {
    pub use crate::cosmetics::{Cosmetic, CosmeticCatalog, CosmeticEconomy, EconomyError, Purchase};
    pub use crate::leaderboard::{Admission, LeaderboardAggregator, LeaderboardEntry};
    pub use crate::progression::{Collection, ProgressionStore};
    pub use crate::record::{PlayerRecord, RecordDefaults};
    pub use crate::store::{
        FileStore, KeyValueStore, MemoryStore, SaveFormat, Scope, SharedStore, StoreError,
        StoreResult, StoredRecord,
    };
    pub use crate::unlock::UnlockChain;
}

pub use prelude::*;
