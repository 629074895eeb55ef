//! Persisted per-player record

use isle_core::ZoneId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Values every record is reconciled against when read
#[derive(Debug, Clone, Default)]
pub struct RecordDefaults {
    /// Cosmetics every player owns for free
    pub cosmetics: BTreeSet<String>,
    /// Cosmetic selected when the record has no valid selection
    pub selected_cosmetic: String,
    /// Zone selected when the record has none
    pub zone: Option<ZoneId>,
}

/// Durable progression of one player
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerRecord {
    /// Currency balance
    pub balance: u64,
    /// Every collectible key ever collected; append-only
    pub collected: BTreeSet<String>,
    /// Purchased cosmetics; never shrinks
    pub owned_cosmetics: BTreeSet<String>,
    /// Active cosmetic
    pub selected_cosmetic: String,
    /// Zone the player last travelled to
    pub selected_zone: Option<ZoneId>,
}

impl PlayerRecord {
    /// Fresh record already reconciled against the defaults
    pub fn new(defaults: &RecordDefaults) -> Self {
        let mut record = Self::default();
        record.reconcile(defaults);
        record
    }

    /// Merge defaults into the record.
    ///
    /// Default cosmetics are always owned, a selection that is not owned
    /// falls back to the default one, and a missing zone selection takes the
    /// default zone. Returns whether anything changed.
    pub fn reconcile(&mut self, defaults: &RecordDefaults) -> bool {
        let mut changed = false;

        for id in &defaults.cosmetics {
            changed |= self.owned_cosmetics.insert(id.clone());
        }

        if !self.owns(&self.selected_cosmetic) && self.selected_cosmetic != defaults.selected_cosmetic
        {
            self.selected_cosmetic = defaults.selected_cosmetic.clone();
            changed = true;
        }

        if self.selected_zone.is_none() && defaults.zone.is_some() {
            self.selected_zone = defaults.zone.clone();
            changed = true;
        }

        changed
    }

    /// Check if a cosmetic is owned
    pub fn owns(&self, cosmetic: &str) -> bool {
        self.owned_cosmetics.contains(cosmetic)
    }

    /// Check if a collectible has ever been collected
    pub fn has_collected(&self, key: &str) -> bool {
        self.collected.contains(key)
    }

    /// Owned cosmetics in stable order
    pub fn owned_list(&self) -> Vec<String> {
        self.owned_cosmetics.iter().cloned().collect()
    }
}
