//! Read/merge/write of player records

use crate::record::{PlayerRecord, RecordDefaults};
use crate::store::{Scope, SharedStore, StoreError, StoreResult};
use isle_core::{PlayerId, ZoneId};

/// Result of recording a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    /// Balance after the reward
    pub balance: u64,
    /// The key was not in the collected set before this call
    pub first_time: bool,
}

/// Player record access on top of a [`crate::store::KeyValueStore`]
pub struct ProgressionStore {
    store: SharedStore,
    defaults: RecordDefaults,
}

impl ProgressionStore {
    pub fn new(store: SharedStore, defaults: RecordDefaults) -> Self {
        Self { store, defaults }
    }

    pub fn defaults(&self) -> &RecordDefaults {
        &self.defaults
    }

    /// Load a player's record, reconciled against the defaults.
    ///
    /// A player with no stored record gets a fresh one; nothing is written.
    pub fn load(&self, player: &PlayerId) -> StoreResult<PlayerRecord> {
        let mut record = match self.store.get(Scope::Player, player.as_str())? {
            Some(value) => serde_json::from_value::<PlayerRecord>(value)
                .map_err(|e| StoreError::Deserialization(e.to_string()))?,
            None => PlayerRecord::default(),
        };
        record.reconcile(&self.defaults);
        Ok(record)
    }

    /// Write a record as is
    pub fn save(&self, player: &PlayerId, record: &PlayerRecord) -> StoreResult<()> {
        let value =
            serde_json::to_value(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        self.store.set(Scope::Player, player.as_str(), value)
    }

    /// Fetch, mutate and write back in one call
    pub fn update<R>(
        &self,
        player: &PlayerId,
        f: impl FnOnce(&mut PlayerRecord) -> R,
    ) -> StoreResult<R> {
        let mut record = self.load(player)?;
        let out = f(&mut record);
        self.save(player, &record)?;
        Ok(out)
    }

    /// Fetch and mutate; the record is written only if the closure succeeds,
    /// so a rejected change leaves nothing behind
    pub fn try_update<R, E>(
        &self,
        player: &PlayerId,
        f: impl FnOnce(&mut PlayerRecord) -> Result<R, E>,
    ) -> Result<R, E>
    where
        E: From<StoreError>,
    {
        let mut record = self.load(player)?;
        let out = f(&mut record)?;
        self.save(player, &record)?;
        Ok(out)
    }

    /// Grant a collection reward and remember the collectible
    pub fn record_collection(
        &self,
        player: &PlayerId,
        collectible_key: &str,
        reward: u64,
    ) -> StoreResult<Collection> {
        self.update(player, |record| {
            record.balance = record.balance.saturating_add(reward);
            let first_time = record.collected.insert(collectible_key.to_string());
            Collection {
                balance: record.balance,
                first_time,
            }
        })
    }

    /// Remember the zone the player travels to
    pub fn set_selected_zone(&self, player: &PlayerId, zone: &ZoneId) -> StoreResult<()> {
        self.update(player, |record| record.selected_zone = Some(zone.clone()))
    }

    /// Zero the balance and send the player back to the first zone.
    ///
    /// Collected history and owned cosmetics are kept, so unlocks survive.
    pub fn reset_progress(&self, player: &PlayerId) -> StoreResult<PlayerRecord> {
        let first_zone = self.defaults.zone.clone();
        self.update(player, |record| {
            record.balance = 0;
            record.selected_zone = first_zone;
            record.clone()
        })
    }
}
