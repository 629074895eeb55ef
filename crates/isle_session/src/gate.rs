//! Collectible contact handling
//!
//! A contact-begin between a visible collectible sensor and an avatar
//! grants currency, remembers the collectible and, the first time a player
//! collects a zone's last collectible, admits them to that zone's
//! leaderboard. Store failures are logged and absorbed here; the pickup
//! itself is never rolled back.

use isle_core::{AudioCue, ContactEvent, ContactPhase, EntityId, PlayerId, UiMessage, ZoneId, ZoneWorld};
use isle_progress::{Admission, LeaderboardAggregator, ProgressionStore};
use isle_zones::{Pickup, ZoneContentLoader, ZoneDescriptor};
use std::collections::HashSet;

/// Borrowed zone and store state for one contact
pub struct GateContext<'a> {
    pub world: &'a mut dyn ZoneWorld,
    pub loader: &'a mut ZoneContentLoader,
    pub descriptor: &'a ZoneDescriptor,
    pub progression: &'a ProgressionStore,
    pub leaderboards: &'a LeaderboardAggregator,
}

/// What a contact resulted in
#[derive(Debug, Clone, PartialEq)]
pub struct GateOutcome {
    pub pickup: Pickup,
    /// New balance, if the reward was stored
    pub balance: Option<u64>,
    /// First collection of this collectible by this player
    pub first_time: bool,
    /// Leaderboard admission made or confirmed by this contact
    pub admission: Option<Admission>,
}

/// Collection rules for every zone
#[derive(Debug)]
pub struct CollectibleGate {
    reward: u64,
    cooldown_ms: f32,
    board_rows: usize,
    pickup_sound: Option<String>,
    /// Admissions whose durable write failed
    pending_admissions: HashSet<(ZoneId, PlayerId)>,
}

impl CollectibleGate {
    pub fn new(reward: u64, cooldown_ms: f32, board_rows: usize) -> Self {
        Self {
            reward,
            cooldown_ms,
            board_rows,
            pickup_sound: None,
            pending_admissions: HashSet::new(),
        }
    }

    /// Play this cue where items are picked up
    pub fn with_pickup_sound(mut self, asset: Option<String>) -> Self {
        self.pickup_sound = asset;
        self
    }

    /// Check if an admission is waiting for a retry
    pub fn has_pending_admission(&self, zone: &ZoneId, player: &PlayerId) -> bool {
        self.pending_admissions
            .contains(&(zone.clone(), player.clone()))
    }

    /// Handle one sensor contact already resolved to a player.
    ///
    /// Returns `None` for contact-end events and for sensors that are not a
    /// visible collectible.
    pub fn on_contact(
        &mut self,
        ctx: GateContext<'_>,
        event: &ContactEvent,
        player: &PlayerId,
        name: &str,
    ) -> Option<GateOutcome> {
        if event.phase != ContactPhase::Begin {
            return None;
        }

        let GateContext {
            world,
            loader,
            descriptor,
            progression,
            leaderboards,
        } = ctx;

        let pickup = loader.collect(world, event.sensor, self.cooldown_ms)?;
        let zone = descriptor.id.clone();
        log::debug!("{} collected {} in {}", player, pickup.id, zone);

        if let Some(asset) = &self.pickup_sound {
            world.play_audio(AudioCue::At {
                asset: asset.clone(),
                position: pickup.position,
            });
        }

        let collection = match progression.record_collection(player, &pickup.key, self.reward) {
            Ok(collection) => collection,
            Err(e) => {
                log::error!("Failed to store collection of {} for {}: {}", pickup.key, player, e);
                if pickup.is_last {
                    self.pending_admissions.insert((zone, player.clone()));
                }
                return Some(GateOutcome {
                    pickup,
                    balance: None,
                    first_time: false,
                    admission: None,
                });
            }
        };

        world.send_ui(
            player,
            UiMessage::Balance {
                coins: collection.balance,
            },
        );

        let key = (zone, player.clone());
        let admission = if pickup.is_last
            && (collection.first_time || self.pending_admissions.contains(&key))
        {
            self.admit(world, loader.boards(), leaderboards, &key.0, player, name, descriptor)
        } else {
            None
        };

        Some(GateOutcome {
            pickup,
            balance: Some(collection.balance),
            first_time: collection.first_time,
            admission,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn admit(
        &mut self,
        world: &mut dyn ZoneWorld,
        boards: &[EntityId],
        leaderboards: &LeaderboardAggregator,
        zone: &ZoneId,
        player: &PlayerId,
        name: &str,
        descriptor: &ZoneDescriptor,
    ) -> Option<Admission> {
        let key = (zone.clone(), player.clone());

        match leaderboards.admit(zone, player, name) {
            Ok(admission) => {
                self.pending_admissions.remove(&key);
                if let Admission::Admitted { rank } = admission {
                    world.send_ui(
                        player,
                        UiMessage::success(format!(
                            "You finished {}! Leaderboard rank #{}",
                            descriptor.display_name(),
                            rank
                        )),
                    );
                    refresh_boards(world, boards, leaderboards, zone, self.board_rows);
                }
                Some(admission)
            }
            Err(e) => {
                log::error!("Leaderboard admission of {} to {} failed: {}", player, zone, e);
                self.pending_admissions.insert(key);
                None
            }
        }
    }
}

/// Push a zone's ranked rows to its board entities
pub fn refresh_boards(
    world: &mut dyn ZoneWorld,
    boards: &[EntityId],
    leaderboards: &LeaderboardAggregator,
    zone: &ZoneId,
    rows: usize,
) {
    if boards.is_empty() {
        return;
    }

    let entries = match leaderboards.get(zone) {
        Ok(entries) => entries,
        Err(e) => {
            log::error!("Failed to read the {} leaderboard: {}", zone, e);
            return;
        }
    };
    let lines = LeaderboardAggregator::display_rows(&entries, rows);

    for &board in boards {
        if let Err(e) = world.set_display_lines(board, &lines) {
            log::debug!("Board {} not updated: {}", board, e);
        }
    }
}
