//! Commands delivered by the transport
//!
//! The transport decodes client requests into [`HostCommand`]s and sends
//! them over a channel; the runtime applies them between ticks.

use isle_core::{PlayerId, ZoneId};
use serde::{Deserialize, Serialize};

/// A request for the session layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum HostCommand {
    /// Player connected; joins their selected zone
    Connect { player: PlayerId, name: String },
    /// Player left the server
    Disconnect { player: PlayerId },
    SwitchZone { player: PlayerId, zone: ZoneId },
    Purchase { player: PlayerId, cosmetic: String },
    Equip { player: PlayerId, cosmetic: String },
    Teleport { player: PlayerId, platform: String },
    ResetProgress { player: PlayerId },
    ShowLeaderboard { player: PlayerId, zone: ZoneId },
    /// Stop the tick loop
    Shutdown,
}

impl HostCommand {
    /// Player the command acts for
    pub fn player(&self) -> Option<&PlayerId> {
        match self {
            Self::Connect { player, .. }
            | Self::Disconnect { player }
            | Self::SwitchZone { player, .. }
            | Self::Purchase { player, .. }
            | Self::Equip { player, .. }
            | Self::Teleport { player, .. }
            | Self::ResetProgress { player }
            | Self::ShowLeaderboard { player, .. } => Some(player),
            Self::Shutdown => None,
        }
    }

    /// Decode one JSON command
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_switch() {
        let cmd =
            HostCommand::from_json(r#"{"cmd":"switch_zone","player":"p1","zone":"volcano"}"#)
                .unwrap();
        assert_eq!(
            cmd,
            HostCommand::SwitchZone {
                player: PlayerId::new("p1"),
                zone: ZoneId::new("volcano"),
            }
        );
        assert_eq!(cmd.player(), Some(&PlayerId::new("p1")));
    }

    #[test]
    fn test_decode_shutdown() {
        let cmd = HostCommand::from_json(r#"{"cmd":"shutdown"}"#).unwrap();
        assert_eq!(cmd, HostCommand::Shutdown);
        assert!(cmd.player().is_none());
    }

    #[test]
    fn test_unknown_command_rejected() {
        assert!(HostCommand::from_json(r#"{"cmd":"fly","player":"p1"}"#).is_err());
    }
}
