//! Player session orchestration
//!
//! [`PlayerSessionService`] is built once at startup and owns every piece
//! of mutable orchestration state: the zone registry, the session table,
//! pending welcomes, cached audio handles and the transfer queue. Host
//! callbacks reach it through [`PlayerSessionService::dispatch`].
//!
//! A player moves `Unassigned → InZone(a) → InZone(b) → … → Disconnected`.
//! Switching zones tears the outgoing session down before the transfer is
//! queued, and the welcome for the target zone is delivered when the join
//! there completes.

use crate::audio::AudioCache;
use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::event::ZoneEvent;
use crate::gate::{self, CollectibleGate, GateContext};
use crate::pending::{PendingMessages, TransferRequest};
use crate::recovery::FallRecovery;
use crate::session::{PlayerSession, SessionTable};
use isle_core::{
    AudioCue, BodyKind, CollisionGroups, ContactEvent, EntityId, EntityKind, EntitySpec,
    OverlayKind, PlayerId, Shape, Transform, UiMessage, ZoneId, ZoneWorld,
};
use isle_progress::{
    CosmeticCatalog, CosmeticEconomy, EconomyError, LeaderboardAggregator, LeaderboardEntry,
    PlayerRecord, ProgressionStore, Purchase, SharedStore, UnlockChain,
};
use isle_zones::{EntityRole, LoadOutcome, ZoneContentLoader, ZoneHandle, ZoneRegistry};

/// Top-level session orchestrator
pub struct PlayerSessionService {
    config: SessionConfig,
    zones: ZoneRegistry,
    sessions: SessionTable,
    progression: ProgressionStore,
    leaderboards: LeaderboardAggregator,
    economy: CosmeticEconomy,
    unlocks: UnlockChain,
    gate: CollectibleGate,
    recovery: FallRecovery,
    pending: PendingMessages,
    audio: AudioCache,
    transfers: Vec<TransferRequest>,
}

impl PlayerSessionService {
    /// Build the service over initialized zones and a durable store.
    ///
    /// Catalogue order of the zones is the unlock order.
    pub fn new(
        config: SessionConfig,
        zones: ZoneRegistry,
        store: SharedStore,
        catalog: CosmeticCatalog,
    ) -> Self {
        let unlocks = UnlockChain::new(
            zones
                .iter()
                .map(|z| (z.descriptor.id.clone(), z.descriptor.last_collectible_key()))
                .collect(),
        );
        let progression =
            ProgressionStore::new(store.clone(), catalog.record_defaults(zones.first().cloned()));
        let gate = CollectibleGate::new(
            config.currency_per_collectible,
            config.collectible_cooldown_ms,
            config.leaderboard_rows,
        )
        .with_pickup_sound(config.pickup_sound.clone());

        log::info!("Session service ready with {} zones", zones.len());

        Self {
            recovery: FallRecovery::new(config.fall_poll_ms),
            config,
            zones,
            sessions: SessionTable::new(),
            progression,
            leaderboards: LeaderboardAggregator::new(store),
            economy: CosmeticEconomy::new(catalog),
            unlocks,
            gate,
            pending: PendingMessages::new(),
            audio: AudioCache::new(),
            transfers: Vec::new(),
        }
    }

    // ----- lifecycle -----

    /// Join the zone stored in the player's record, falling back to the
    /// first zone when it is unknown or locked
    pub fn connect(&mut self, player: &PlayerId, name: &str) -> Result<ZoneId> {
        let record = self.progression.load(player)?;
        let zone = record
            .selected_zone
            .filter(|z| self.unlocks.is_unlocked(&record.collected, z))
            .or_else(|| self.zones.first().cloned())
            .ok_or(SessionError::NoZones)?;

        self.join(player, name, &zone)?;
        Ok(zone)
    }

    /// Create the player's session in a zone.
    ///
    /// Joining the zone the player is already in does nothing; joining
    /// another zone ends the current session first.
    pub fn join(&mut self, player: &PlayerId, name: &str, zone: &ZoneId) -> Result<()> {
        let handle = self
            .zones
            .zone_for_id(zone)
            .ok_or_else(|| SessionError::UnknownZone(zone.clone()))?;

        if let Some(current) = self.sessions.zone_of(player) {
            if current == handle {
                log::debug!("{} is already in {}", player, zone);
                return Ok(());
            }
            self.leave(player);
        }

        let record = self.progression.load(player)?;

        let instance = self
            .zones
            .get_mut(handle)
            .ok_or_else(|| SessionError::UnknownZone(zone.clone()))?;

        if let LoadOutcome::Loaded { .. } = instance.load_content()? {
            let (world, loader, _) = instance.parts_mut();
            gate::refresh_boards(
                world,
                loader.boards(),
                &self.leaderboards,
                zone,
                self.config.leaderboard_rows,
            );
        }

        let (world, loader, descriptor) = instance.parts_mut();
        let start = Transform::at(descriptor.start_position);

        let avatar = world.spawn(
            EntitySpec::new(
                EntityKind::Avatar {
                    player: player.clone(),
                },
                start,
            )
            .with_body(BodyKind::Dynamic)
            .with_shape(Shape::Capsule {
                half_height: self.config.avatar_half_height,
                radius: self.config.avatar_radius,
            })
            .with_groups(CollisionGroups::avatar()),
        )?;
        loader
            .entities_mut()
            .insert(avatar, EntityRole::Avatar(player.clone()), start);

        let emitter = spawn_emitter(
            world,
            loader,
            self.economy.catalog(),
            player,
            &record.selected_cosmetic,
            avatar,
        );

        let overlay = match world.attach_overlay(player, avatar, OverlayKind::ChargeMeter) {
            Ok(overlay) => Some(overlay),
            Err(e) => {
                log::warn!("No charge meter for {}: {}", player, e);
                None
            }
        };

        if let Some(music) = &descriptor.music {
            let cue = world.play_audio(AudioCue::Attached {
                asset: music.clone(),
                entity: avatar,
                looping: true,
            });
            self.audio.insert(player, handle, cue);
        }

        world.send_ui(
            player,
            UiMessage::Balance {
                coins: record.balance,
            },
        );
        world.send_ui(player, cosmetics_message(&record));
        world.send_ui(
            player,
            UiMessage::ZoneUnlocks {
                zones: self.unlocks.flags(&record.collected),
            },
        );
        for message in self.pending.take(player) {
            world.send_ui(player, message);
        }

        let session = PlayerSession {
            player: player.clone(),
            name: name.to_string(),
            zone: handle,
            avatar,
            emitter,
            overlay,
        };
        if self.sessions.insert(session).is_err() {
            log::error!("{} already had a session while joining {}", player, zone);
        }

        log::info!("{} ({}) joined {}", name, player, zone);
        Ok(())
    }

    /// End the player's session wherever it is.
    ///
    /// Safe to call repeatedly and when some resources are already gone.
    /// Returns whether a session existed.
    pub fn leave(&mut self, player: &PlayerId) -> bool {
        for (zone, cue) in self.audio.take(player) {
            if let Some(instance) = self.zones.get_mut(zone) {
                instance.world.stop_audio(cue);
            }
        }

        let Some(session) = self.sessions.remove(player) else {
            return false;
        };
        let Some(instance) = self.zones.get_mut(session.zone) else {
            return true;
        };
        let (world, loader, descriptor) = instance.parts_mut();

        if let Some(overlay) = session.overlay {
            if let Err(e) = world.remove_overlay(overlay) {
                log::debug!("Overlay of {} already removed: {}", player, e);
            }
        }

        for entity in session.emitter.into_iter().chain(Some(session.avatar)) {
            despawn_tracked(world, loader, entity);
        }

        log::info!("{} left {}", player, descriptor.id);
        true
    }

    /// Forget a player entirely: session, queued welcome and queued transfer
    pub fn disconnect(&mut self, player: &PlayerId) {
        self.leave(player);
        self.pending.clear(player);
        self.transfers.retain(|t| &t.player != player);
        log::info!("{} disconnected", player);
    }

    /// Move a player to another zone.
    ///
    /// A locked or unknown target is rejected with a single notice and the
    /// current session is left untouched.
    pub fn switch_zone(&mut self, player: &PlayerId, target: &ZoneId) -> Result<()> {
        let current = self
            .sessions
            .zone_of(player)
            .ok_or_else(|| SessionError::NotInZone(player.clone()))?;

        let Some(target_handle) = self.zones.zone_for_id(target) else {
            self.notify(current, player, UiMessage::error(format!("Unknown island: {}", target)));
            return Err(SessionError::UnknownZone(target.clone()));
        };
        let target_name = self
            .zones
            .descriptor(target_handle)
            .map(|d| d.display_name().to_string())
            .unwrap_or_else(|| target.to_string());

        if target_handle == current {
            self.notify(
                current,
                player,
                UiMessage::info(format!("You are already on {}", target_name)),
            );
            return Ok(());
        }

        if !self.has_unlocked(player, target)? {
            log::info!("{} tried to enter locked zone {}", player, target);
            self.notify(
                current,
                player,
                UiMessage::error(format!(
                    "{} is locked. Finish the previous island first!",
                    target_name
                )),
            );
            return Err(SessionError::ZoneLocked(target.clone()));
        }

        if let Err(e) = self.progression.set_selected_zone(player, target) {
            log::error!("Failed to store selected zone of {}: {}", player, e);
        }

        let name = self
            .sessions
            .get(player)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| player.to_string());
        let from = self
            .zones
            .id_for_zone(current)
            .cloned()
            .ok_or_else(|| SessionError::NotInZone(player.clone()))?;

        self.leave(player);

        self.pending
            .push(player, UiMessage::success(format!("Welcome to {}!", target_name)));
        self.transfers.push(TransferRequest {
            player: player.clone(),
            name,
            from: from.clone(),
            to: target.clone(),
        });

        log::info!("{} leaving {} for {}", player, from, target);
        Ok(())
    }

    /// Take every queued transfer
    pub fn drain_transfers(&mut self) -> Vec<TransferRequest> {
        std::mem::take(&mut self.transfers)
    }

    /// Perform the join half of a transfer.
    ///
    /// When the target zone cannot be joined the player is returned to the
    /// zone they left, told why, and the join error is passed back.
    pub fn complete_transfer(&mut self, transfer: &TransferRequest) -> Result<()> {
        let TransferRequest {
            player,
            name,
            from,
            to,
        } = transfer;

        let error = match self.join(player, name, to) {
            Ok(()) => return Ok(()),
            Err(e) => e,
        };
        log::warn!("{} could not join {}: {}; returning to {}", player, to, error, from);

        // The welcome was meant for the target zone
        self.pending.clear(player);
        if let Err(e) = self.progression.set_selected_zone(player, from) {
            log::error!("Failed to restore selected zone of {}: {}", player, e);
        }

        match self.join(player, name, from) {
            Ok(()) => self.notify_player(
                player,
                UiMessage::error(format!("Could not enter {}, returned to {}", to, from)),
            ),
            Err(e) => log::error!("{} could not return to {}: {}", player, from, e),
        }

        Err(error)
    }

    // ----- progression -----

    /// Check if a zone is open to a player; reads only
    pub fn has_unlocked(&self, player: &PlayerId, zone: &ZoneId) -> Result<bool> {
        let record = self.progression.load(player)?;
        Ok(self.unlocks.is_unlocked(&record.collected, zone))
    }

    /// Buy a cosmetic, or confirm it is already owned
    pub fn purchase(&mut self, player: &PlayerId, cosmetic: &str) -> Result<Purchase> {
        match self.economy.purchase(&self.progression, player, cosmetic) {
            Ok(outcome) => {
                if let Purchase::Purchased { .. } = outcome {
                    let name = self
                        .economy
                        .catalog()
                        .get(cosmetic)
                        .map(|c| c.name.clone())
                        .unwrap_or_else(|| cosmetic.to_string());
                    self.notify_player(player, UiMessage::success(format!("Bought {}", name)));
                }
                self.push_wallet(player);
                Ok(outcome)
            }
            Err(EconomyError::InsufficientFunds { price, balance }) => {
                log::info!(
                    "{} cannot afford {} (price {}, balance {})",
                    player,
                    cosmetic,
                    price,
                    balance
                );
                self.notify_player(
                    player,
                    UiMessage::error(format!(
                        "Insufficient funds: costs {}, you have {}",
                        price, balance
                    )),
                );
                Err(EconomyError::InsufficientFunds { price, balance }.into())
            }
            Err(EconomyError::UnknownCosmetic(id)) => {
                self.notify_player(player, UiMessage::error(format!("Unknown cosmetic: {}", id)));
                Err(EconomyError::UnknownCosmetic(id).into())
            }
            Err(e) => {
                log::error!("Purchase of {} by {} failed: {}", cosmetic, player, e);
                Err(e.into())
            }
        }
    }

    /// Buy if needed, then make a cosmetic the active one.
    ///
    /// The selection only changes when the purchase succeeds.
    pub fn equip_cosmetic(&mut self, player: &PlayerId, cosmetic: &str) -> Result<()> {
        self.purchase(player, cosmetic)?;

        let record = self.progression.update(player, |record| {
            record.selected_cosmetic = cosmetic.to_string();
            record.clone()
        })?;

        let Some(session) = self.sessions.get_mut(player) else {
            return Ok(());
        };
        let Some(instance) = self.zones.get_mut(session.zone) else {
            return Ok(());
        };
        let (world, loader, _) = instance.parts_mut();

        if let Some(old) = session.emitter.take() {
            despawn_tracked(world, loader, old);
        }
        session.emitter = spawn_emitter(
            world,
            loader,
            self.economy.catalog(),
            player,
            cosmetic,
            session.avatar,
        );
        world.send_ui(player, cosmetics_message(&record));

        log::info!("{} equipped {}", player, cosmetic);
        Ok(())
    }

    /// Zero the balance and point the player back at the first zone.
    ///
    /// Collected history is kept, so unlocks survive.
    pub fn reset_progress(&mut self, player: &PlayerId) -> Result<PlayerRecord> {
        let record = self.progression.reset_progress(player)?;
        log::info!("Progress of {} reset", player);

        self.notify_player(player, UiMessage::Balance { coins: 0 });
        self.notify_player(player, UiMessage::info("Your progress was reset"));
        Ok(record)
    }

    // ----- leaderboards -----

    /// Ranked finishers of a zone
    pub fn get_leaderboard(&self, zone: &ZoneId) -> Result<Vec<LeaderboardEntry>> {
        self.zones.require(zone)?;
        Ok(self.leaderboards.get(zone)?)
    }

    /// Send a zone's ranked rows to a player's UI
    pub fn show_leaderboard(&mut self, player: &PlayerId, zone: &ZoneId) -> Result<()> {
        let entries = self.get_leaderboard(zone)?;
        let rows = LeaderboardAggregator::display_rows(&entries, self.config.leaderboard_rows);
        self.notify_player(
            player,
            UiMessage::Leaderboard {
                zone: zone.clone(),
                rows,
            },
        );
        Ok(())
    }

    /// Clear a zone's leaderboard and blank its boards
    pub fn reset_leaderboard(&mut self, zone: &ZoneId) -> Result<()> {
        let handle = self.zones.require(zone)?;
        self.leaderboards.reset(zone)?;

        if let Some(instance) = self.zones.get_mut(handle) {
            let (world, loader, _) = instance.parts_mut();
            gate::refresh_boards(
                world,
                loader.boards(),
                &self.leaderboards,
                zone,
                self.config.leaderboard_rows,
            );
        }
        Ok(())
    }

    // ----- in-zone commands -----

    /// Move the player's avatar to a named platform of their zone
    pub fn teleport_to_platform(&mut self, player: &PlayerId, platform: &str) -> Result<()> {
        let session = self
            .sessions
            .get(player)
            .ok_or_else(|| SessionError::NotInZone(player.clone()))?;
        let instance = self
            .zones
            .get_mut(session.zone)
            .ok_or_else(|| SessionError::NotInZone(player.clone()))?;

        match instance.descriptor.platform(platform) {
            Some(position) => {
                instance.world.teleport(session.avatar, position)?;
                log::info!("{} teleported to {}", player, platform);
                Ok(())
            }
            None => {
                instance
                    .world
                    .send_ui(player, UiMessage::error(format!("Unknown platform: {}", platform)));
                Err(SessionError::UnknownPlatform(platform.to_string()))
            }
        }
    }

    // ----- ticking -----

    /// Advance one zone: motion and timers, then the world step and its
    /// contacts
    pub fn tick_zone(&mut self, zone: ZoneHandle, delta_ms: f32) {
        self.dispatch(zone, ZoneEvent::Tick { delta_ms });

        let contacts = match self.zones.get_mut(zone) {
            Some(instance) => instance.world.step(delta_ms),
            None => return,
        };
        for contact in contacts {
            self.dispatch(zone, ZoneEvent::Contact(contact));
        }
    }

    /// Advance every zone by the same delta
    pub fn tick_all(&mut self, delta_ms: f32) {
        let handles: Vec<ZoneHandle> = self.zones.all_zones().into_iter().map(|(h, _)| h).collect();
        for handle in handles {
            self.tick_zone(handle, delta_ms);
        }
    }

    /// Process one zone event. Never fails; problems are logged.
    pub fn dispatch(&mut self, zone: ZoneHandle, event: ZoneEvent) {
        match event {
            ZoneEvent::Tick { delta_ms } => self.on_tick(zone, delta_ms),
            ZoneEvent::Contact(contact) => self.on_contact(zone, contact),
        }
    }

    fn on_tick(&mut self, zone: ZoneHandle, delta_ms: f32) {
        let Some(instance) = self.zones.get_mut(zone) else {
            return;
        };
        let (world, loader, descriptor) = instance.parts_mut();

        let respawned = loader.tick(world, delta_ms);
        if !respawned.is_empty() {
            log::debug!("Respawned {:?} in {}", respawned, descriptor.id);
        }

        if self.recovery.poll(zone, delta_ms) {
            let avatars = self.sessions.avatars_in(zone);
            if !avatars.is_empty() {
                let threshold = descriptor
                    .fall_threshold
                    .unwrap_or(self.config.fall_threshold);
                FallRecovery::rescue(world, &avatars, threshold, descriptor.start_position);
            }
        }
    }

    fn on_contact(&mut self, zone: ZoneHandle, event: ContactEvent) {
        let Some(instance) = self.zones.get_mut(zone) else {
            return;
        };
        let (world, loader, descriptor) = instance.parts_mut();

        let Some(player) = loader.entities().avatar_owner(event.other).cloned() else {
            return;
        };
        let name = match self.sessions.get(&player) {
            Some(session) if session.zone == zone => session.name.clone(),
            _ => return,
        };

        let outcome = self.gate.on_contact(
            GateContext {
                world: &mut *world,
                loader,
                descriptor,
                progression: &self.progression,
                leaderboards: &self.leaderboards,
            },
            &event,
            &player,
            &name,
        );

        if let Some(outcome) = outcome {
            if outcome.pickup.is_last && outcome.first_time {
                match self.progression.load(&player) {
                    Ok(record) => world.send_ui(
                        &player,
                        UiMessage::ZoneUnlocks {
                            zones: self.unlocks.flags(&record.collected),
                        },
                    ),
                    Err(e) => log::error!("Failed to reload record of {}: {}", player, e),
                }
            }
        }
    }

    // ----- helpers -----

    fn notify(&mut self, zone: ZoneHandle, player: &PlayerId, message: UiMessage) {
        if let Some(instance) = self.zones.get_mut(zone) {
            instance.world.send_ui(player, message);
        }
    }

    /// Send to the player's current zone; dropped when they are in none
    fn notify_player(&mut self, player: &PlayerId, message: UiMessage) {
        if let Some(zone) = self.sessions.zone_of(player) {
            self.notify(zone, player, message);
        }
    }

    fn push_wallet(&mut self, player: &PlayerId) {
        match self.progression.load(player) {
            Ok(record) => {
                self.notify_player(
                    player,
                    UiMessage::Balance {
                        coins: record.balance,
                    },
                );
                self.notify_player(player, cosmetics_message(&record));
            }
            Err(e) => log::error!("Failed to reload record of {}: {}", player, e),
        }
    }

    // ----- accessors -----

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    pub fn zones_mut(&mut self) -> &mut ZoneRegistry {
        &mut self.zones
    }

    pub fn sessions(&self) -> &SessionTable {
        &self.sessions
    }

    pub fn session(&self, player: &PlayerId) -> Option<&PlayerSession> {
        self.sessions.get(player)
    }

    /// Zone id of the player's active session
    pub fn zone_of_player(&self, player: &PlayerId) -> Option<&ZoneId> {
        self.sessions
            .zone_of(player)
            .and_then(|h| self.zones.id_for_zone(h))
    }

    pub fn progression(&self) -> &ProgressionStore {
        &self.progression
    }

    pub fn leaderboards(&self) -> &LeaderboardAggregator {
        &self.leaderboards
    }

    pub fn economy(&self) -> &CosmeticEconomy {
        &self.economy
    }

    pub fn unlocks(&self) -> &UnlockChain {
        &self.unlocks
    }

    pub fn gate(&self) -> &CollectibleGate {
        &self.gate
    }

    pub fn pending(&self) -> &PendingMessages {
        &self.pending
    }

    pub fn audio(&self) -> &AudioCache {
        &self.audio
    }
}

fn cosmetics_message(record: &PlayerRecord) -> UiMessage {
    UiMessage::Cosmetics {
        owned: record.owned_list(),
        selected: record.selected_cosmetic.clone(),
    }
}

/// Spawn the emitter of a cosmetic on an avatar; cosmetics without an
/// effect get none
fn spawn_emitter(
    world: &mut dyn ZoneWorld,
    loader: &mut ZoneContentLoader,
    catalog: &CosmeticCatalog,
    player: &PlayerId,
    cosmetic: &str,
    avatar: EntityId,
) -> Option<EntityId> {
    let effect = catalog.get(cosmetic)?.effect.clone();
    if effect.is_empty() {
        return None;
    }

    let at = Transform::at(world.position(avatar).unwrap_or_default());
    let spec = EntitySpec::new(
        EntityKind::Emitter {
            effect,
            attached_to: avatar,
        },
        at,
    )
    .with_body(BodyKind::None)
    .with_groups(CollisionGroups::decoration());

    match world.spawn(spec) {
        Ok(emitter) => {
            loader
                .entities_mut()
                .insert(emitter, EntityRole::Emitter(player.clone()), at);
            Some(emitter)
        }
        Err(e) => {
            log::warn!("No emitter for {}: {}", player, e);
            None
        }
    }
}

/// Despawn a session entity, tolerating one that is already gone
fn despawn_tracked(world: &mut dyn ZoneWorld, loader: &mut ZoneContentLoader, entity: EntityId) {
    loader.entities_mut().remove(entity);
    if !world.contains(entity) {
        log::debug!("Entity {} already gone", entity);
        return;
    }
    if let Err(e) = world.despawn(entity) {
        log::debug!("Entity {} already gone: {}", entity, e);
    }
}
