//! Cosmetic catalogue and purchases

use crate::progression::ProgressionStore;
use crate::record::RecordDefaults;
use crate::store::StoreError;
use isle_core::{PlayerId, ZoneId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A purchasable avatar effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cosmetic {
    pub id: String,
    /// Display name
    pub name: String,
    /// Particle effect asset spawned on the avatar
    pub effect: String,
    #[serde(default)]
    pub price: u64,
    /// Free and always owned
    #[serde(default)]
    pub default: bool,
}

impl Cosmetic {
    pub fn new(id: impl Into<String>, effect: impl Into<String>, price: u64) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            effect: effect.into(),
            price,
            default: false,
        }
    }

    /// Set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Mark as a free default
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self.price = 0;
        self
    }
}

/// Every cosmetic known to the server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CosmeticCatalog {
    cosmetics: Vec<Cosmetic>,
}

impl CosmeticCatalog {
    pub fn new(cosmetics: Vec<Cosmetic>) -> Self {
        Self { cosmetics }
    }

    pub fn get(&self, id: &str) -> Option<&Cosmetic> {
        self.cosmetics.iter().find(|c| c.id == id)
    }

    pub fn is_default(&self, id: &str) -> bool {
        self.get(id).map(|c| c.default).unwrap_or(false)
    }

    pub fn all(&self) -> &[Cosmetic] {
        &self.cosmetics
    }

    /// Record defaults: every default cosmetic owned, the first one selected
    pub fn record_defaults(&self, first_zone: Option<ZoneId>) -> RecordDefaults {
        let defaults: Vec<_> = self.cosmetics.iter().filter(|c| c.default).collect();
        RecordDefaults {
            cosmetics: defaults.iter().map(|c| c.id.clone()).collect(),
            selected_cosmetic: defaults.first().map(|c| c.id.clone()).unwrap_or_default(),
            zone: first_zone,
        }
    }
}

/// Purchase failures
#[derive(Debug, Error)]
pub enum EconomyError {
    #[error("Unknown cosmetic: {0}")]
    UnknownCosmetic(String),
    #[error("Insufficient funds: price {price}, balance {balance}")]
    InsufficientFunds { price: u64, balance: u64 },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Successful purchase outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purchase {
    /// Default or previously bought; nothing charged
    AlreadyOwned { balance: u64 },
    /// Charged and granted
    Purchased { balance: u64 },
}

impl Purchase {
    pub fn balance(&self) -> u64 {
        match *self {
            Self::AlreadyOwned { balance } | Self::Purchased { balance } => balance,
        }
    }
}

/// Ownership checks and all-or-nothing debits
pub struct CosmeticEconomy {
    catalog: CosmeticCatalog,
}

impl CosmeticEconomy {
    pub fn new(catalog: CosmeticCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &CosmeticCatalog {
        &self.catalog
    }

    /// Buy a cosmetic, or confirm it is already owned.
    ///
    /// On `InsufficientFunds` the record is left exactly as it was.
    pub fn purchase(
        &self,
        progression: &ProgressionStore,
        player: &PlayerId,
        cosmetic_id: &str,
    ) -> Result<Purchase, EconomyError> {
        let cosmetic = self
            .catalog
            .get(cosmetic_id)
            .ok_or_else(|| EconomyError::UnknownCosmetic(cosmetic_id.to_string()))?;

        if cosmetic.default {
            let balance = progression.load(player)?.balance;
            return Ok(Purchase::AlreadyOwned { balance });
        }

        let price = cosmetic.price;
        let outcome = progression.try_update(player, |record| {
            if record.owns(cosmetic_id) {
                return Ok(Purchase::AlreadyOwned {
                    balance: record.balance,
                });
            }
            if record.balance < price {
                return Err(EconomyError::InsufficientFunds {
                    price,
                    balance: record.balance,
                });
            }

            record.balance -= price;
            record.owned_cosmetics.insert(cosmetic_id.to_string());
            Ok(Purchase::Purchased {
                balance: record.balance,
            })
        })?;

        if let Purchase::Purchased { balance } = outcome {
            log::info!("{} bought {} for {} (balance {})", player, cosmetic_id, price, balance);
        }
        Ok(outcome)
    }
}
