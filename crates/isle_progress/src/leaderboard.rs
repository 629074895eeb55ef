//! Per-zone finisher leaderboards
//!
//! Each zone keeps one append-only ranked list in the global scope. Rank is
//! the order of admission.

use crate::store::{unix_now, Scope, SharedStore, StoreError, StoreResult};
use isle_core::{PlayerId, ZoneId};
use serde::{Deserialize, Serialize};

/// One finisher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player_id: PlayerId,
    /// Display name at admission time
    pub name: String,
    /// Unix timestamp
    pub admitted_at: u64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredBoard {
    #[serde(default)]
    entries: Vec<LeaderboardEntry>,
}

/// Outcome of an admission request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Appended at this 1-based rank
    Admitted { rank: usize },
    /// Already on the list at this rank; nothing written
    AlreadyListed { rank: usize },
}

impl Admission {
    pub fn rank(&self) -> usize {
        match *self {
            Self::Admitted { rank } | Self::AlreadyListed { rank } => rank,
        }
    }
}

/// Leaderboard access on top of the global store scope
pub struct LeaderboardAggregator {
    store: SharedStore,
}

impl LeaderboardAggregator {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    fn key(zone: &ZoneId) -> String {
        format!("leaderboard/{}", zone)
    }

    fn fetch(&self, zone: &ZoneId) -> StoreResult<StoredBoard> {
        match self.store.get(Scope::Global, &Self::key(zone))? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| StoreError::Deserialization(e.to_string())),
            None => Ok(StoredBoard::default()),
        }
    }

    /// Append a player to a zone's list unless they are already on it
    pub fn admit(&self, zone: &ZoneId, player: &PlayerId, name: &str) -> StoreResult<Admission> {
        let mut board = self.fetch(zone)?;

        if let Some(index) = board.entries.iter().position(|e| &e.player_id == player) {
            return Ok(Admission::AlreadyListed { rank: index + 1 });
        }

        board.entries.push(LeaderboardEntry {
            player_id: player.clone(),
            name: name.to_string(),
            admitted_at: unix_now(),
        });
        let rank = board.entries.len();

        let value =
            serde_json::to_value(&board).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.set(Scope::Global, &Self::key(zone), value)?;

        log::info!("{} admitted to the {} leaderboard at rank {}", name, zone, rank);
        Ok(Admission::Admitted { rank })
    }

    /// Ranked entries for a zone
    pub fn get(&self, zone: &ZoneId) -> StoreResult<Vec<LeaderboardEntry>> {
        Ok(self.fetch(zone)?.entries)
    }

    /// Check if a player is on a zone's list
    pub fn contains(&self, zone: &ZoneId, player: &PlayerId) -> StoreResult<bool> {
        Ok(self.fetch(zone)?.entries.iter().any(|e| &e.player_id == player))
    }

    /// Clear a zone's list
    pub fn reset(&self, zone: &ZoneId) -> StoreResult<()> {
        log::info!("Resetting the {} leaderboard", zone);
        self.store.remove(Scope::Global, &Self::key(zone))
    }

    /// Board text: `"<rank>. <name>"` for the first `limit` entries
    pub fn display_rows(entries: &[LeaderboardEntry], limit: usize) -> Vec<String> {
        entries
            .iter()
            .take(limit)
            .enumerate()
            .map(|(i, e)| format!("{}. {}", i + 1, e.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn aggregator() -> LeaderboardAggregator {
        LeaderboardAggregator::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_admit_once() {
        let boards = aggregator();
        let zone = ZoneId::new("meadow");
        let ada = PlayerId::new("ada");

        assert_eq!(
            boards.admit(&zone, &ada, "Ada").unwrap(),
            Admission::Admitted { rank: 1 }
        );
        assert_eq!(
            boards.admit(&zone, &ada, "Ada").unwrap(),
            Admission::AlreadyListed { rank: 1 }
        );
        assert_eq!(boards.get(&zone).unwrap().len(), 1);
    }

    #[test]
    fn test_ranks_follow_admission_order() {
        let boards = aggregator();
        let zone = ZoneId::new("meadow");

        boards.admit(&zone, &PlayerId::new("b"), "Bo").unwrap();
        boards.admit(&zone, &PlayerId::new("a"), "Ada").unwrap();

        let rows = LeaderboardAggregator::display_rows(&boards.get(&zone).unwrap(), 10);
        assert_eq!(rows, vec!["1. Bo".to_string(), "2. Ada".to_string()]);
        assert_eq!(LeaderboardAggregator::display_rows(&boards.get(&zone).unwrap(), 1).len(), 1);
    }

    #[test]
    fn test_zones_are_independent_and_resettable() {
        let boards = aggregator();
        let ada = PlayerId::new("ada");

        boards.admit(&ZoneId::new("meadow"), &ada, "Ada").unwrap();
        assert!(!boards.contains(&ZoneId::new("volcano"), &ada).unwrap());

        boards.reset(&ZoneId::new("meadow")).unwrap();
        assert!(boards.get(&ZoneId::new("meadow")).unwrap().is_empty());
        assert_eq!(
            boards.admit(&ZoneId::new("meadow"), &ada, "Ada").unwrap(),
            Admission::Admitted { rank: 1 }
        );
    }
}
