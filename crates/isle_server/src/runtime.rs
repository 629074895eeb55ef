//! Server runtime
//!
//! Owns the session service, one physics world per zone, and the fixed-rate
//! tick loop. Commands arrive over a channel from the transport and are
//! applied between ticks; zone outputs leave over another channel.

use crate::catalog::Catalog;
use crate::command::HostCommand;
use crate::config::ServerConfig;
use crate::error::Result;
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use isle_core::ZoneWorld;
use isle_physics::{PhysicsZoneWorld, ZoneOutput};
use isle_progress::{FileStore, MemoryStore, SharedStore};
use isle_session::{PlayerSessionService, SessionError};
use isle_zones::ZoneRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counters for the log summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeStats {
    pub ticks: u64,
    pub commands: u64,
    pub rejected: u64,
    pub transfers: u64,
}

/// The running server
pub struct ServerRuntime {
    service: PlayerSessionService,
    commands: Receiver<HostCommand>,
    command_tx: Sender<HostCommand>,
    shutdown: Arc<AtomicBool>,
    tick_delta_ms: f32,
    tick_interval: Duration,
    stats: RuntimeStats,
}

impl ServerRuntime {
    /// Build the runtime with the store named in the config
    pub fn build(config: &ServerConfig, catalog: Catalog, outputs: Sender<ZoneOutput>) -> Result<Self> {
        let store = Self::open_store(config)?;
        Self::with_store(config, catalog, store, outputs)
    }

    /// Build the runtime over an existing store
    pub fn with_store(
        config: &ServerConfig,
        catalog: Catalog,
        store: SharedStore,
        outputs: Sender<ZoneOutput>,
    ) -> Result<Self> {
        let Catalog { zones, cosmetics } = catalog;

        let physics = config.physics.clone();
        let registry = ZoneRegistry::initialize(zones, |descriptor| {
            let world = PhysicsZoneWorld::new(physics.clone())
                .with_forwarding(descriptor.id.clone(), outputs.clone());
            Box::new(world) as Box<dyn ZoneWorld>
        })?;

        let service =
            PlayerSessionService::new(config.session.clone(), registry, store, cosmetics);
        let (command_tx, commands) = crossbeam_channel::unbounded();

        Ok(Self {
            service,
            commands,
            command_tx,
            shutdown: Arc::new(AtomicBool::new(false)),
            tick_delta_ms: config.tick_delta_ms(),
            tick_interval: config.tick_interval(),
            stats: RuntimeStats::default(),
        })
    }

    /// File store when a directory is configured, memory otherwise
    pub fn open_store(config: &ServerConfig) -> Result<SharedStore> {
        match &config.store.dir {
            Some(dir) => {
                let store = FileStore::new(dir).with_format(config.store.format);
                store.ensure_dirs()?;
                log::info!("Records stored under {}", dir.display());
                Ok(Arc::new(store))
            }
            None => {
                log::warn!("No store directory configured; records are kept in memory");
                Ok(Arc::new(MemoryStore::new()))
            }
        }
    }

    /// Channel end handed to the transport
    pub fn command_sender(&self) -> Sender<HostCommand> {
        self.command_tx.clone()
    }

    /// Flag that stops [`run`](Self::run) when set
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    pub fn service(&self) -> &PlayerSessionService {
        &self.service
    }

    pub fn service_mut(&mut self) -> &mut PlayerSessionService {
        &mut self.service
    }

    pub fn stats(&self) -> RuntimeStats {
        self.stats
    }

    /// Apply one command to the session layer.
    ///
    /// Rejections have already been reported to the player's UI when this
    /// returns an error.
    pub fn apply(&mut self, command: HostCommand) -> std::result::Result<(), SessionError> {
        self.stats.commands += 1;

        match command {
            HostCommand::Connect { player, name } => {
                let zone = self.service.connect(&player, &name)?;
                log::info!("{} ({}) connected to {}", name, player, zone);
            }
            HostCommand::Disconnect { player } => {
                self.service.disconnect(&player);
            }
            HostCommand::SwitchZone { player, zone } => {
                self.service.switch_zone(&player, &zone)?;
            }
            HostCommand::Purchase { player, cosmetic } => {
                self.service.purchase(&player, &cosmetic)?;
            }
            HostCommand::Equip { player, cosmetic } => {
                self.service.equip_cosmetic(&player, &cosmetic)?;
            }
            HostCommand::Teleport { player, platform } => {
                self.service.teleport_to_platform(&player, &platform)?;
            }
            HostCommand::ResetProgress { player } => {
                self.service.reset_progress(&player)?;
            }
            HostCommand::ShowLeaderboard { player, zone } => {
                self.service.show_leaderboard(&player, &zone)?;
            }
            HostCommand::Shutdown => {
                log::info!("Shutdown requested by transport");
                self.shutdown.store(true, Ordering::Relaxed);
            }
        }

        Ok(())
    }

    /// Apply every queued command; returns how many were applied
    pub fn process_commands(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.commands.try_recv() {
                Ok(command) => {
                    applied += 1;
                    if let Err(e) = self.apply(command) {
                        self.stats.rejected += 1;
                        log::info!("Command rejected: {}", e);
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// One server frame: commands, zone ticks, then queued transfers
    pub fn tick(&mut self) {
        self.process_commands();
        self.service.tick_all(self.tick_delta_ms);
        self.complete_transfers();
        self.stats.ticks += 1;
    }

    fn complete_transfers(&mut self) {
        for transfer in self.service.drain_transfers() {
            match self.service.complete_transfer(&transfer) {
                Ok(()) => {
                    self.stats.transfers += 1;
                    log::info!(
                        "{} moved from {} to {}",
                        transfer.player,
                        transfer.from,
                        transfer.to
                    );
                }
                Err(e) => {
                    log::error!("Transfer of {} to {} failed: {}", transfer.player, transfer.to, e);
                }
            }
        }
    }

    /// Tick at the configured rate until shutdown is requested
    pub fn run(&mut self) {
        log::info!(
            "Running {} zones at {:.1} ms per tick",
            self.service.zones().len(),
            self.tick_delta_ms
        );

        while !self.shutdown_requested() {
            let frame_start = Instant::now();

            self.tick();

            let frame_duration = frame_start.elapsed();
            if frame_duration < self.tick_interval {
                std::thread::sleep(self.tick_interval - frame_duration);
            } else {
                log::debug!("Tick overran by {:?}", frame_duration - self.tick_interval);
            }
        }

        self.graceful_shutdown();
    }

    /// Close every open session
    pub fn graceful_shutdown(&mut self) {
        let players = self.service.sessions().players();
        log::info!("Shutting down, closing {} sessions", players.len());
        for player in players {
            self.service.disconnect(&player);
        }
        log::info!(
            "Stopped after {} ticks ({} commands, {} rejected, {} transfers)",
            self.stats.ticks,
            self.stats.commands,
            self.stats.rejected,
            self.stats.transfers
        );
    }
}
