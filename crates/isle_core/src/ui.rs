//! Messages pushed to a player's UI surface

use crate::id::ZoneId;
use serde::{Deserialize, Serialize};

/// Notice severity, drives the client-side styling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Per-zone unlock flag sent on join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneUnlockFlag {
    pub zone: ZoneId,
    pub unlocked: bool,
}

/// Structured message for the player's UI channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiMessage {
    /// Current currency balance
    Balance { coins: u64 },
    /// Owned cosmetics and the active selection
    Cosmetics { owned: Vec<String>, selected: String },
    /// Unlock state for every zone, in catalogue order
    ZoneUnlocks { zones: Vec<ZoneUnlockFlag> },
    /// Ranked finisher names for a zone
    Leaderboard { zone: ZoneId, rows: Vec<String> },
    /// One-line notice (rejections, welcomes, receipts)
    Notice { kind: NoticeKind, text: String },
}

impl UiMessage {
    /// Info notice
    pub fn info(text: impl Into<String>) -> Self {
        Self::Notice {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }

    /// Success notice
    pub fn success(text: impl Into<String>) -> Self {
        Self::Notice {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    /// Error notice
    pub fn error(text: impl Into<String>) -> Self {
        Self::Notice {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    /// Check if this is a notice of the given kind
    pub fn is_notice(&self, of: NoticeKind) -> bool {
        matches!(self, Self::Notice { kind, .. } if *kind == of)
    }
}
