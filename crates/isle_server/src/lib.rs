//! Isle Server - Game Server Runtime
//!
//! Loads the server configuration and the zone catalogue, builds one physics
//! world per zone and drives the session layer at a fixed tick rate.
//!
//! # Example
//!
//! ```ignore
//! use isle_server::prelude::*;
//!
//! let config = ServerConfig::load()?;
//! let catalog = Catalog::load(&config.server.catalog)?;
//! let (outputs, replicated) = crossbeam_channel::unbounded();
//!
//! let mut runtime = ServerRuntime::build(&config, catalog, outputs)?;
//! let commands = runtime.command_sender();
//! commands.send(HostCommand::Connect { player: "p1".into(), name: "Ada".into() })?;
//! runtime.run();
//! ```

pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod runtime;

pub mod prelude {
    pub use crate::catalog::Catalog;
    pub use crate::command::HostCommand;
    pub use crate::config::{ServerConfig, ServerSection, StoreSection};
    pub use crate::error::{ConfigError, Result, ServerError};
    pub use crate::runtime::{RuntimeStats, ServerRuntime};
}

pub use prelude::*;
