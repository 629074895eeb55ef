//! Pending actions consumed on the next lifecycle event

use isle_core::{PlayerId, UiMessage, ZoneId};
use std::collections::HashMap;

/// Messages held for a player until their next join completes
#[derive(Debug, Default)]
pub struct PendingMessages {
    messages: HashMap<PlayerId, Vec<UiMessage>>,
}

impl PendingMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for delivery after the next join
    pub fn push(&mut self, player: &PlayerId, message: UiMessage) {
        self.messages.entry(player.clone()).or_default().push(message);
    }

    /// Take every queued message; a second call returns nothing
    pub fn take(&mut self, player: &PlayerId) -> Vec<UiMessage> {
        self.messages.remove(player).unwrap_or_default()
    }

    pub fn has_pending(&self, player: &PlayerId) -> bool {
        self.messages.contains_key(player)
    }

    /// Drop anything queued for a player
    pub fn clear(&mut self, player: &PlayerId) {
        self.messages.remove(player);
    }
}

/// A zone change waiting for the runtime to perform the join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub player: PlayerId,
    pub name: String,
    pub from: ZoneId,
    pub to: ZoneId,
}
