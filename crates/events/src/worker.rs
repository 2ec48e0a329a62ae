//! Background task draining the event bus into a dispatcher.
//!
//! [`DispatchWorker`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and hands every notification event to its [`NotificationDispatcher`],
//! retrying failed deliveries with exponential backoff (1 s, 2 s, 4 s).
//! Deliveries run as tasks, at most `max_in_flight` at once, so one slow
//! recipient does not stall the receive loop. It exits when the bus is
//! dropped or the cancellation token fires, after in-flight deliveries end.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::bus::PlatformEvent;
use crate::dispatch::{Notification, NotificationDispatcher};
use crate::error::DispatchError;

/// Default backoff between delivery attempts.
const RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(1),
    Duration::from_secs(2),
    Duration::from_secs(4),
];

/// Default cap on concurrently running deliveries.
const DEFAULT_MAX_IN_FLIGHT: usize = 32;

#[derive(Clone)]
pub struct DispatchWorker {
    dispatcher: Arc<dyn NotificationDispatcher>,
    retry_delays: Arc<[Duration]>,
    max_in_flight: usize,
}

impl DispatchWorker {
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self {
            dispatcher,
            retry_delays: RETRY_DELAYS.into(),
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }

    /// Replace the backoff schedule; one extra attempt follows the last delay.
    pub fn with_retry_delays(mut self, delays: Vec<Duration>) -> Self {
        self.retry_delays = delays.into();
        self
    }

    pub fn with_max_in_flight(mut self, max_in_flight: usize) -> Self {
        self.max_in_flight = max_in_flight.max(1);
        self
    }

    /// Run until the bus closes or `cancel` fires.
    pub async fn run(
        self,
        mut receiver: broadcast::Receiver<PlatformEvent>,
        cancel: CancellationToken,
    ) {
        tracing::info!("Notification dispatch worker started");
        let mut in_flight = JoinSet::new();
        loop {
            let received = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("Notification dispatch worker stopping");
                    break;
                }
                received = receiver.recv() => received,
            };

            match received {
                Ok(event) => {
                    let Some(notification) = routable(&event) else {
                        continue;
                    };
                    while in_flight.len() >= self.max_in_flight {
                        reap(in_flight.join_next().await);
                    }
                    let worker = self.clone();
                    in_flight.spawn(async move { worker.handle(notification).await });
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Dispatch worker lagged, some notifications were not sent"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, dispatch worker shutting down");
                    break;
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            reap(Some(joined));
        }
    }

    async fn handle(&self, notification: Notification) {
        if let Err(e) = self.deliver(&notification).await {
            tracing::error!(
                kind = %notification.kind,
                entity_id = notification.entity_id,
                recipient_id = notification.recipient_id,
                error = %e,
                "Notification delivery failed after all retries"
            );
        }
    }

    /// Deliver with bounded retry. Returns the last error when every
    /// attempt failed.
    pub async fn deliver(&self, notification: &Notification) -> Result<(), DispatchError> {
        for (attempt, delay) in self.retry_delays.iter().enumerate() {
            match self.dispatcher.notify(notification).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        kind = %notification.kind,
                        error = %e,
                        "Notification attempt failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                }
            }
        }
        self.dispatcher.notify(notification).await
    }
}

fn reap(joined: Option<Result<(), tokio::task::JoinError>>) {
    if let Some(Err(e)) = joined {
        tracing::error!(error = %e, "Notification delivery task failed");
    }
}

fn routable(event: &PlatformEvent) -> Option<Notification> {
    match Notification::from_event(event) {
        Ok(n) => Some(n),
        Err(e) => {
            tracing::debug!(error = %e, "Skipping non-notification event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use lineup_core::notifications::NotificationKind;
    use lineup_core::types::DbId;

    use super::*;
    use crate::bus::EventBus;

    /// Records deliveries; fails the first `failures` calls.
    #[derive(Default)]
    struct Recording {
        failures: AtomicU32,
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl NotificationDispatcher for Recording {
        async fn notify(&self, notification: &Notification) -> Result<(), DispatchError> {
            let remaining = self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
            if remaining.is_ok() {
                return Err(DispatchError::HttpStatus(503));
            }
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    fn no_delay(dispatcher: Arc<Recording>) -> DispatchWorker {
        DispatchWorker::new(dispatcher).with_retry_delays(vec![Duration::ZERO; 2])
    }

    #[tokio::test]
    async fn delivers_events_until_bus_closes() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        let recording = Arc::new(Recording::default());
        let worker = no_delay(recording.clone());

        bus.publish(PlatformEvent::for_spot(NotificationKind::SpotAssigned, 1, 10));
        bus.publish(PlatformEvent::new("unrelated.event"));
        bus.publish(PlatformEvent::for_spot(NotificationKind::SpotReopened, 1, 20));
        drop(bus);

        worker.run(rx, CancellationToken::new()).await;

        let sent = recording.sent.lock().unwrap();
        let mut recipients: Vec<_> = sent.iter().map(|n| n.recipient_id).collect();
        recipients.sort_unstable();
        assert_eq!(recipients, vec![10, 20]);
    }

    #[tokio::test]
    async fn retries_transient_failures() {
        let recording = Arc::new(Recording::default());
        recording.failures.store(2, Ordering::SeqCst);
        let worker = no_delay(recording.clone());
        let event = PlatformEvent::for_spot(NotificationKind::SpotExpired, 3, 30);

        worker
            .deliver(&Notification::from_event(&event).unwrap())
            .await
            .unwrap();
        assert_eq!(recording.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn gives_up_after_bounded_attempts() {
        let recording = Arc::new(Recording::default());
        recording.failures.store(10, Ordering::SeqCst);
        let worker = no_delay(recording.clone());
        let event = PlatformEvent::for_spot(NotificationKind::SpotExpired, 3, 30);

        let result = worker.deliver(&Notification::from_event(&event).unwrap()).await;
        assert!(result.is_err());
        assert_eq!(recording.failures.load(Ordering::SeqCst), 7);
    }

    /// Holds deliveries to recipient 10 until released.
    #[derive(Default)]
    struct Gated {
        gate: tokio::sync::Notify,
        sent: Mutex<Vec<DbId>>,
    }

    #[async_trait]
    impl NotificationDispatcher for Gated {
        async fn notify(&self, notification: &Notification) -> Result<(), DispatchError> {
            if notification.recipient_id == 10 {
                self.gate.notified().await;
            }
            self.sent.lock().unwrap().push(notification.recipient_id);
            Ok(())
        }
    }

    #[tokio::test]
    async fn slow_delivery_does_not_hold_up_later_ones() {
        let bus = EventBus::default();
        let rx = bus.subscribe();
        let gated = Arc::new(Gated::default());
        let worker = DispatchWorker::new(gated.clone()).with_retry_delays(Vec::new());

        bus.publish(PlatformEvent::for_spot(NotificationKind::SpotAssigned, 1, 10));
        bus.publish(PlatformEvent::for_spot(NotificationKind::SpotAssigned, 2, 20));
        let handle = tokio::spawn(worker.run(rx, CancellationToken::new()));

        tokio::time::timeout(Duration::from_secs(5), async {
            while !gated.sent.lock().unwrap().contains(&20) {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("second notification delivered while the first is held");

        gated.gate.notify_one();
        drop(bus);
        handle.await.unwrap();
        assert_eq!(*gated.sent.lock().unwrap(), vec![20, 10]);
    }

    #[tokio::test]
    async fn stops_on_cancel() {
        let bus = EventBus::default();
        let cancel = CancellationToken::new();
        let worker = no_delay(Arc::new(Recording::default()));
        let handle = tokio::spawn(worker.run(bus.subscribe(), cancel.clone()));

        cancel.cancel();
        handle.await.unwrap();
    }
}
