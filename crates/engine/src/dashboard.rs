//! Per-promoter deadline monitoring.
//!
//! A pure read over current spot state; nothing is cached between calls.

use std::collections::HashMap;

use lineup_core::types::{DbId, Timestamp};
use lineup_core::urgency::{hours_until, standing, start_of_day, DeadlineStanding, DeadlineStats};
use lineup_db::models::spot::Spot;
use serde::Serialize;

use crate::error::EngineError;
use crate::service::SpotService;

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub events: Vec<EventDeadlines>,
    pub stats: DeadlineStats,
    pub last_updated: Timestamp,
}

/// Pending spots of one upcoming event grouped by urgency.
#[derive(Debug, Clone, Serialize)]
pub struct EventDeadlines {
    pub event_id: DbId,
    pub title: String,
    pub event_date: Timestamp,
    pub total_spots: usize,
    pub confirmed_spots: usize,
    pub pending_spots: usize,
    pub critical: Vec<PendingSpot>,
    pub urgent: Vec<PendingSpot>,
    pub upcoming: Vec<PendingSpot>,
    /// Deadline passed; the next sweep will expire these.
    pub awaiting_sweep: Vec<PendingSpot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PendingSpot {
    pub spot_id: DbId,
    pub spot_type: String,
    pub spot_order: i32,
    pub performer_id: Option<DbId>,
    pub confirmation_deadline: Timestamp,
    pub hours_until_deadline: f64,
}

impl SpotService {
    /// Urgency buckets and confirmation statistics for the promoter's events
    /// dated today (UTC) or later.
    pub async fn get_dashboard(&self, promoter_id: DbId) -> Result<Dashboard, EngineError> {
        let now = self.now();
        let events = self
            .with_retry("list_upcoming_events_for_promoter", || {
                self.store
                    .list_upcoming_events_for_promoter(promoter_id, start_of_day(now))
            })
            .await?;

        let event_ids: Vec<DbId> = events.iter().map(|e| e.id).collect();
        let spots = self
            .with_retry("list_spots_for_events", || {
                self.store.list_spots_for_events(&event_ids)
            })
            .await?;

        let mut by_event: HashMap<DbId, Vec<Spot>> = HashMap::new();
        for spot in spots {
            by_event.entry(spot.event_id).or_default().push(spot);
        }

        let mut stats = DeadlineStats::default();
        let mut summaries = Vec::with_capacity(events.len());
        for event in events {
            let spots = by_event.remove(&event.id).unwrap_or_default();
            let mut summary = EventDeadlines {
                event_id: event.id,
                title: event.title,
                event_date: event.event_date,
                total_spots: spots.len(),
                confirmed_spots: 0,
                pending_spots: 0,
                critical: Vec::new(),
                urgent: Vec::new(),
                upcoming: Vec::new(),
                awaiting_sweep: Vec::new(),
            };

            for spot in spots {
                stats.record(
                    spot.confirmation_status_id,
                    spot.confirmation_deadline,
                    spot.confirmed_at,
                    spot.expired_at,
                    now,
                );
                if spot.is_live_hold() && !spot.is_pending() {
                    summary.confirmed_spots += 1;
                }
                if !spot.is_pending() {
                    continue;
                }
                summary.pending_spots += 1;
                let Some(deadline) = spot.confirmation_deadline else {
                    continue;
                };
                let pending = PendingSpot {
                    spot_id: spot.id,
                    spot_type: spot.spot_type,
                    spot_order: spot.spot_order,
                    performer_id: spot.performer_id,
                    confirmation_deadline: deadline,
                    hours_until_deadline: hours_until(deadline, now),
                };
                match standing(deadline, now) {
                    DeadlineStanding::AwaitingSweep => summary.awaiting_sweep.push(pending),
                    DeadlineStanding::Critical => summary.critical.push(pending),
                    DeadlineStanding::Urgent => summary.urgent.push(pending),
                    DeadlineStanding::Upcoming => summary.upcoming.push(pending),
                    DeadlineStanding::Later => {}
                }
            }

            for bucket in [
                &mut summary.critical,
                &mut summary.urgent,
                &mut summary.upcoming,
                &mut summary.awaiting_sweep,
            ] {
                bucket.sort_by_key(|p| (p.confirmation_deadline, p.spot_id));
            }
            summaries.push(summary);
        }

        Ok(Dashboard {
            events: summaries,
            stats,
            last_updated: now,
        })
    }
}
