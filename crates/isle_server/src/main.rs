//! Isles game server
//!
//! Run with: cargo run -p isle_server --bin isles
//!
//! Until a network transport is attached, commands are read from stdin as
//! one JSON object per line, e.g. `{"cmd":"connect","player":"p1","name":"Ada"}`,
//! and zone outputs are logged at debug level.

use crossbeam_channel::{Receiver, Sender};
use isle_physics::ZoneOutput;
use isle_server::{Catalog, HostCommand, ServerConfig, ServerError, ServerRuntime};
use std::io::BufRead;
use std::sync::atomic::Ordering;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("PANIC: {}", panic_info);
    }));

    if let Err(e) = run() {
        log::error!("Server failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), ServerError> {
    let config = ServerConfig::load()?;
    config.log_summary();

    let catalog = Catalog::load(&config.server.catalog)?;
    let (output_tx, output_rx) = crossbeam_channel::unbounded();
    let mut runtime = ServerRuntime::build(&config, catalog, output_tx)?;

    let shutdown = runtime.shutdown_flag();
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        shutdown.store(true, Ordering::Relaxed);
    })?;

    spawn_stdin_reader(runtime.command_sender());
    spawn_output_logger(output_rx);

    runtime.run();
    Ok(())
}

/// Feed JSON commands from stdin into the runtime
fn spawn_stdin_reader(commands: Sender<HostCommand>) {
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("stdin closed: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match HostCommand::from_json(&line) {
                Ok(command) => {
                    if commands.send(command).is_err() {
                        break;
                    }
                }
                Err(e) => log::warn!("Ignoring malformed command: {}", e),
            }
        }
        log::debug!("Command reader stopped");
    });
}

/// Drain zone outputs so the channel never grows unbounded
fn spawn_output_logger(outputs: Receiver<ZoneOutput>) {
    std::thread::spawn(move || {
        for ZoneOutput { zone, output } in outputs.iter() {
            log::debug!("[{}] {:?}", zone, output);
        }
    });
}
