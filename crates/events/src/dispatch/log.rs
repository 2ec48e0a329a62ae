use async_trait::async_trait;

use crate::dispatch::{Notification, NotificationDispatcher};
use crate::error::DispatchError;

/// Writes each notification as a structured `tracing` event.
///
/// The default transport when no webhook is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDispatcher;

#[async_trait]
impl NotificationDispatcher for LogDispatcher {
    async fn notify(&self, notification: &Notification) -> Result<(), DispatchError> {
        tracing::info!(
            kind = %notification.kind,
            entity_type = %notification.entity_type,
            entity_id = notification.entity_id,
            recipient_id = notification.recipient_id,
            payload = %notification.payload,
            "Notification dispatched"
        );
        Ok(())
    }
}
