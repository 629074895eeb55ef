//! Zone events fed to the session service

use isle_core::ContactEvent;

/// Everything that can happen inside a zone between two service calls.
///
/// The runtime steps the world and feeds these to
/// [`PlayerSessionService::dispatch`](crate::service::PlayerSessionService::dispatch);
/// tests feed synthetic ones directly.
#[derive(Debug, Clone, PartialEq)]
pub enum ZoneEvent {
    /// Zone clock advanced
    Tick { delta_ms: f32 },
    /// Sensor contact reported by the world
    Contact(ContactEvent),
}

impl From<ContactEvent> for ZoneEvent {
    fn from(event: ContactEvent) -> Self {
        Self::Contact(event)
    }
}
