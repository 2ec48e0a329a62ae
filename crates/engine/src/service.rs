use std::future::Future;
use std::sync::Arc;

use lineup_core::clock::Clock;
use lineup_core::types::{DbId, Timestamp};
use lineup_db::models::event::Event;
use lineup_db::store::{SpotStore, StoreError};
use lineup_events::{EventBus, PlatformEvent};

use crate::config::EngineConfig;

/// Entry point for every spot lifecycle operation.
///
/// Holds only shared handles; the operations live in the `assignment`,
/// `confirmation`, `sweeper`, `reminders`, `dashboard` and `extension`
/// modules.
pub struct SpotService {
    pub(crate) store: Arc<dyn SpotStore>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) bus: Arc<EventBus>,
    pub(crate) config: EngineConfig,
}

impl SpotService {
    pub fn new(
        store: Arc<dyn SpotStore>,
        clock: Arc<dyn Clock>,
        bus: Arc<EventBus>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            clock,
            bus,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn SpotStore> {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Publish a notification event stamped with the engine clock.
    ///
    /// Publishing never fails the calling operation.
    pub(crate) fn notify(&self, event: PlatformEvent) {
        tracing::debug!(
            event_type = %event.event_type,
            recipient_id = ?event.recipient_user_id,
            "Publishing notification"
        );
        self.bus.publish(event.at(self.now()));
    }

    /// Run a single-row store operation under the retry policy.
    pub(crate) async fn with_retry<T, F, Fut>(
        &self,
        op_name: &'static str,
        op: F,
    ) -> Result<T, StoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        self.config.retry.run(op_name, op).await
    }

    /// Look up an event for notification routing; failures are logged and
    /// treated as "no recipient".
    pub(crate) async fn event_for_notification(&self, event_id: DbId) -> Option<Event> {
        match self.store.find_event(event_id).await {
            Ok(Some(event)) => Some(event),
            Ok(None) => {
                tracing::warn!(event_id, "Event not found, promoter notification skipped");
                None
            }
            Err(e) => {
                tracing::warn!(
                    event_id,
                    error = %e,
                    "Event lookup failed, promoter notification skipped"
                );
                None
            }
        }
    }
}
