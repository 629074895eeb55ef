//! Presentation outputs queued for the transport

use isle_core::{
    AudioCue, AudioHandle, EntityId, EntityKind, OverlayHandle, OverlayKind, PlayerId, Transform,
    UiMessage, ZoneId,
};

/// Something the transport must replicate to clients
#[derive(Debug, Clone, PartialEq)]
pub enum WorldOutput {
    MapLoaded {
        map: String,
    },
    Spawned {
        entity: EntityId,
        kind: EntityKind,
        transform: Transform,
    },
    Despawned {
        entity: EntityId,
    },
    Ui {
        player: PlayerId,
        message: UiMessage,
    },
    OverlayAttached {
        handle: OverlayHandle,
        player: PlayerId,
        avatar: EntityId,
        kind: OverlayKind,
    },
    OverlayRemoved {
        handle: OverlayHandle,
    },
    AudioStarted {
        handle: AudioHandle,
        cue: AudioCue,
    },
    AudioStopped {
        handle: AudioHandle,
    },
    DisplayLines {
        entity: EntityId,
        lines: Vec<String>,
    },
}

impl WorldOutput {
    /// Player this output is addressed to, if it is private
    pub fn recipient(&self) -> Option<&PlayerId> {
        match self {
            Self::Ui { player, .. } | Self::OverlayAttached { player, .. } => Some(player),
            _ => None,
        }
    }
}

/// An output tagged with the zone that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneOutput {
    pub zone: ZoneId,
    pub output: WorldOutput,
}
