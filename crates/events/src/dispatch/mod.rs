//! Outbound notification transports.
//!
//! The lifecycle never calls a dispatcher directly: it publishes
//! [`PlatformEvent`]s and the [`DispatchWorker`](crate::DispatchWorker)
//! turns each one into a [`Notification`] for the configured transport.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lineup_core::notifications::NotificationKind;
use lineup_core::types::DbId;
use serde::Serialize;

use crate::bus::PlatformEvent;
use crate::error::DispatchError;

pub mod log;
pub mod webhook;

/// One message for one recipient about one entity.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub entity_type: String,
    pub entity_id: DbId,
    pub recipient_id: DbId,
    pub payload: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl Notification {
    /// Extract a notification from a bus event.
    ///
    /// Fails for events without a known kind, source entity, or recipient.
    pub fn from_event(event: &PlatformEvent) -> Result<Self, DispatchError> {
        let unroutable = || DispatchError::Unroutable(event.event_type.clone());
        let kind = event.kind().ok_or_else(unroutable)?;
        let entity_type = event.source_entity_type.clone().ok_or_else(unroutable)?;
        let entity_id = event.source_entity_id.ok_or_else(unroutable)?;
        let recipient_id = event.recipient_user_id.ok_or_else(unroutable)?;
        Ok(Self {
            kind,
            entity_type,
            entity_id,
            recipient_id,
            payload: event.payload.clone(),
            occurred_at: event.timestamp,
        })
    }
}

/// Sends a notification to its recipient. Implementations are stateless and
/// may be called concurrently.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), DispatchError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn spot_event_becomes_notification() {
        let event = PlatformEvent::for_spot(NotificationKind::SpotExpired, 5, 11)
            .with_payload(serde_json::json!({"event_id": 2}));
        let notification = Notification::from_event(&event).unwrap();
        assert_eq!(notification.kind, NotificationKind::SpotExpired);
        assert_eq!(notification.entity_type, "spot");
        assert_eq!(notification.entity_id, 5);
        assert_eq!(notification.recipient_id, 11);
        assert_eq!(notification.payload["event_id"], 2);
    }

    #[test]
    fn event_without_recipient_is_unroutable() {
        let event = PlatformEvent::new("spot.expired").with_source("spot", 5);
        assert_matches!(
            Notification::from_event(&event),
            Err(DispatchError::Unroutable(t)) if t == "spot.expired"
        );
    }
}
