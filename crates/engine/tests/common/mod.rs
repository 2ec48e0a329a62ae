#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use lineup_core::clock::ManualClock;
use lineup_core::types::{DbId, Timestamp};
use lineup_db::models::event::{CreateEvent, Event};
use lineup_db::models::spot::{CreateSpot, Spot};
use lineup_db::store::{MemorySpotStore, SpotStore};
use lineup_engine::assignment::AssignmentRequest;
use lineup_engine::retry::RetryPolicy;
use lineup_engine::{EngineConfig, SpotService};
use lineup_events::{EventBus, PlatformEvent};
use tokio::sync::broadcast;

pub const PROMOTER: DbId = 100;

pub fn t0() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 6, 1, 15, 0, 0).unwrap()
}

pub struct Harness {
    pub store: Arc<MemorySpotStore>,
    pub clock: ManualClock,
    pub service: Arc<SpotService>,
    pub events: broadcast::Receiver<PlatformEvent>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(mut config: EngineConfig) -> Self {
        config.retry = RetryPolicy::default().with_initial_delay(Duration::ZERO);
        let store = Arc::new(MemorySpotStore::new());
        let clock = ManualClock::new(t0());
        let bus = Arc::new(EventBus::default());
        let events = bus.subscribe();
        let service = Arc::new(SpotService::new(
            store.clone(),
            Arc::new(clock.clone()),
            bus,
            config,
        ));
        Self {
            store,
            clock,
            service,
            events,
        }
    }

    /// An event a week out with one spot per entry of `spot_types`, in order.
    pub async fn event_with_spots(&self, spot_types: &[&str]) -> (Event, Vec<Spot>) {
        self.event_on(t0() + chrono::Duration::days(7), spot_types).await
    }

    pub async fn event_on(&self, date: Timestamp, spot_types: &[&str]) -> (Event, Vec<Spot>) {
        let event = self
            .store
            .create_event(&CreateEvent {
                promoter_id: PROMOTER,
                title: "Thursday Night Standup".into(),
                event_date: date,
            })
            .await
            .unwrap();
        let mut spots = Vec::new();
        for (order, spot_type) in spot_types.iter().enumerate() {
            spots.push(
                self.store
                    .create_spot(&CreateSpot {
                        event_id: event.id,
                        spot_type: (*spot_type).to_string(),
                        spot_order: order as i32,
                    })
                    .await
                    .unwrap(),
            );
        }
        (event, spots)
    }

    pub async fn spot(&self, spot_id: DbId) -> Spot {
        self.store.find_spot(spot_id).await.unwrap().unwrap()
    }

    /// Drain every event published so far.
    pub fn published(&mut self) -> Vec<PlatformEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            out.push(event);
        }
        out
    }
}

pub fn request(event_id: DbId, performer_id: DbId, spot_type: &str, hours: i64) -> AssignmentRequest {
    AssignmentRequest {
        event_id,
        performer_id,
        spot_type: spot_type.to_string(),
        deadline_hours: Some(hours),
    }
}

/// Structural invariants every spot must satisfy after any operation.
pub fn assert_invariants(spot: &Spot) {
    use lineup_core::spot_lifecycle::state_machine::{CONFIRMED, DECLINED, EXPIRED, PENDING};

    assert_eq!(
        spot.is_filled,
        spot.performer_id.is_some(),
        "is_filled must mirror performer_id on spot {}",
        spot.id
    );
    match spot.confirmation_status_id {
        PENDING => {
            assert!(spot.confirmation_deadline.is_some());
            assert!(spot.is_filled);
        }
        CONFIRMED => {
            assert!(spot.confirmed_at.is_some());
            assert!(spot.is_filled);
        }
        DECLINED | EXPIRED => {
            assert!(!spot.is_filled);
            assert!(spot.performer_id.is_none());
        }
        _ => {}
    }
}
