use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use lineup_core::spot_lifecycle::application_statuses;
use lineup_core::spot_lifecycle::state_machine::{
    can_transition, is_live_hold, is_open, status_name, CONFIRMED, DECLINED, EXPIRED, PENDING,
    UNASSIGNED,
};
use lineup_core::types::{DbId, Timestamp};

use crate::models::application::{Application, CreateApplication};
use crate::models::deadline_extension::{DeadlineExtension, ExtendDeadline, ExtendOutcome};
use crate::models::event::{CreateEvent, Event};
use crate::models::spot::{
    ClaimOutcome, CreateSpot, DeadlineCursor, Resolution, Spot, SpotClaim,
};
use crate::store::{SpotStore, StoreError, StoreResult};

#[derive(Default)]
struct State {
    events: BTreeMap<DbId, Event>,
    spots: BTreeMap<DbId, Spot>,
    applications: BTreeMap<DbId, Application>,
    extensions: Vec<DeadlineExtension>,
    next_id: DbId,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

/// In-process [`SpotStore`] with the same conditional-write semantics as
/// the Postgres store.
///
/// Every operation runs under one mutex, which gives each call the
/// atomicity a single `UPDATE ... WHERE` (or a claim transaction) has in
/// Postgres. Failures can be injected to exercise retry and skip paths.
#[derive(Default)]
pub struct MemorySpotStore {
    state: Mutex<State>,
    fail_next: AtomicU32,
    failing_spots: Mutex<HashSet<DbId>>,
}

impl MemorySpotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` operations fail with a transient error.
    pub fn fail_next(&self, count: u32) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    /// Make every write that targets `spot_id` fail until cleared.
    pub fn fail_writes_for_spot(&self, spot_id: DbId) {
        lock(&self.failing_spots).insert(spot_id);
    }

    pub fn clear_failures(&self) {
        self.fail_next.store(0, Ordering::SeqCst);
        lock(&self.failing_spots).clear();
    }

    /// Audit rows recorded by [`SpotStore::extend_deadline`], oldest first.
    pub fn deadline_extensions(&self) -> Vec<DeadlineExtension> {
        self.state().extensions.clone()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    fn check_injected(&self) -> StoreResult<()> {
        let consumed = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if consumed.is_ok() {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }

    fn check_spot_write(&self, spot_id: DbId) -> StoreResult<()> {
        self.check_injected()?;
        if lock(&self.failing_spots).contains(&spot_id) {
            return Err(StoreError::Unavailable(format!(
                "injected failure for spot {spot_id}"
            )));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn release(spot: &mut Spot) {
    spot.is_filled = false;
    spot.performer_id = None;
    spot.confirmation_deadline = None;
    spot.last_reminder_hours = None;
}

/// Move `spot` to `to`; an illegal transition is a bug in the caller's guard.
fn transition(spot: &mut Spot, to: i16) {
    debug_assert!(
        can_transition(spot.confirmation_status_id, to),
        "illegal transition on spot {}: {} -> {}",
        spot.id,
        status_name(spot.confirmation_status_id),
        status_name(to)
    );
    spot.confirmation_status_id = to;
}

fn is_pending_for(spot: &Spot, performer_id: DbId) -> bool {
    spot.confirmation_status_id == PENDING && spot.performer_id == Some(performer_id)
}

#[async_trait]
impl SpotStore for MemorySpotStore {
    async fn health_check(&self) -> StoreResult<()> {
        self.check_injected()
    }

    async fn create_event(&self, input: &CreateEvent) -> StoreResult<Event> {
        self.check_injected()?;
        let mut state = self.state();
        let now = Utc::now();
        let event = Event {
            id: state.next_id(),
            promoter_id: input.promoter_id,
            title: input.title.clone(),
            event_date: input.event_date,
            created_at: now,
            updated_at: now,
        };
        state.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn find_event(&self, event_id: DbId) -> StoreResult<Option<Event>> {
        self.check_injected()?;
        Ok(self.state().events.get(&event_id).cloned())
    }

    async fn list_upcoming_events_for_promoter(
        &self,
        promoter_id: DbId,
        from: Timestamp,
    ) -> StoreResult<Vec<Event>> {
        self.check_injected()?;
        let mut events: Vec<Event> = self
            .state()
            .events
            .values()
            .filter(|e| e.promoter_id == promoter_id && e.event_date >= from)
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.event_date, e.id));
        Ok(events)
    }

    async fn create_spot(&self, input: &CreateSpot) -> StoreResult<Spot> {
        self.check_injected()?;
        let mut state = self.state();
        let now = Utc::now();
        let spot = Spot {
            id: state.next_id(),
            event_id: input.event_id,
            spot_type: input.spot_type.clone(),
            spot_order: input.spot_order,
            is_filled: false,
            performer_id: None,
            confirmation_status_id: UNASSIGNED,
            confirmation_deadline: None,
            confirmed_at: None,
            declined_at: None,
            expired_at: None,
            last_reminder_hours: None,
            created_at: now,
            updated_at: now,
        };
        state.spots.insert(spot.id, spot.clone());
        Ok(spot)
    }

    async fn find_spot(&self, spot_id: DbId) -> StoreResult<Option<Spot>> {
        self.check_injected()?;
        Ok(self.state().spots.get(&spot_id).cloned())
    }

    async fn list_spots_for_event(&self, event_id: DbId) -> StoreResult<Vec<Spot>> {
        self.list_spots_for_events(&[event_id]).await
    }

    async fn list_spots_for_events(&self, event_ids: &[DbId]) -> StoreResult<Vec<Spot>> {
        self.check_injected()?;
        let mut spots: Vec<Spot> = self
            .state()
            .spots
            .values()
            .filter(|s| event_ids.contains(&s.event_id))
            .cloned()
            .collect();
        spots.sort_by_key(|s| (s.event_id, s.spot_order, s.id));
        Ok(spots)
    }

    async fn claim_open_spot(&self, claim: &SpotClaim) -> StoreResult<ClaimOutcome> {
        self.check_injected()?;
        let mut state = self.state();

        let holds_live = state.spots.values().any(|s| {
            s.event_id == claim.event_id
                && s.performer_id == Some(claim.performer_id)
                && is_live_hold(s.confirmation_status_id)
        });
        if holds_live {
            return Ok(ClaimOutcome::AlreadyAssigned);
        }

        let open = state
            .spots
            .values_mut()
            .filter(|s| {
                s.event_id == claim.event_id
                    && s.spot_type == claim.spot_type
                    && is_open(s.confirmation_status_id)
            })
            .min_by_key(|s| (s.spot_order, s.id));
        let Some(spot) = open else {
            return Ok(ClaimOutcome::NoSpotsAvailable);
        };

        spot.performer_id = Some(claim.performer_id);
        spot.is_filled = true;
        transition(spot, PENDING);
        spot.confirmation_deadline = Some(claim.deadline);
        spot.confirmed_at = None;
        spot.declined_at = None;
        spot.expired_at = None;
        spot.last_reminder_hours = None;
        spot.updated_at = claim.assigned_at;
        Ok(ClaimOutcome::Claimed(spot.clone()))
    }

    async fn resolve_pending(
        &self,
        spot_id: DbId,
        performer_id: DbId,
        resolution: Resolution,
        at: Timestamp,
    ) -> StoreResult<Option<Spot>> {
        self.check_spot_write(spot_id)?;
        let mut state = self.state();
        let Some(spot) = state.spots.get_mut(&spot_id) else {
            return Ok(None);
        };
        if !is_pending_for(spot, performer_id) || spot.confirmation_deadline.map_or(true, |d| d <= at)
        {
            return Ok(None);
        }

        match resolution {
            Resolution::Confirm => {
                transition(spot, CONFIRMED);
                spot.confirmed_at = Some(at);
                spot.confirmation_deadline = None;
            }
            Resolution::Decline => {
                transition(spot, DECLINED);
                spot.declined_at = Some(at);
                release(spot);
            }
        }
        spot.updated_at = at;
        Ok(Some(spot.clone()))
    }

    async fn list_due_pending(
        &self,
        now: Timestamp,
        after: Option<DeadlineCursor>,
        limit: i64,
    ) -> StoreResult<Vec<Spot>> {
        self.check_injected()?;
        let mut due: Vec<Spot> = self
            .state()
            .spots
            .values()
            .filter(|s| {
                s.confirmation_status_id == PENDING
                    && s.confirmation_deadline.is_some_and(|d| {
                        d <= now && after.map_or(true, |c| c.precedes(d, s.id))
                    })
            })
            .cloned()
            .collect();
        due.sort_by_key(|s| (s.confirmation_deadline, s.id));
        due.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(due)
    }

    async fn expire_pending(
        &self,
        spot_id: DbId,
        performer_id: DbId,
        now: Timestamp,
    ) -> StoreResult<Option<Spot>> {
        self.check_spot_write(spot_id)?;
        let mut state = self.state();
        let Some(spot) = state.spots.get_mut(&spot_id) else {
            return Ok(None);
        };
        if !is_pending_for(spot, performer_id)
            || !spot.confirmation_deadline.is_some_and(|d| d <= now)
        {
            return Ok(None);
        }

        transition(spot, EXPIRED);
        spot.expired_at = Some(now);
        release(spot);
        spot.updated_at = now;
        Ok(Some(spot.clone()))
    }

    async fn list_pending_deadlines_between(
        &self,
        after: DeadlineCursor,
        until: Timestamp,
        limit: i64,
    ) -> StoreResult<Vec<Spot>> {
        self.check_injected()?;
        let mut spots: Vec<Spot> = self
            .state()
            .spots
            .values()
            .filter(|s| {
                s.confirmation_status_id == PENDING
                    && s.confirmation_deadline
                        .is_some_and(|d| d <= until && after.precedes(d, s.id))
            })
            .cloned()
            .collect();
        spots.sort_by_key(|s| (s.confirmation_deadline, s.id));
        spots.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(spots)
    }

    async fn mark_reminder_sent(
        &self,
        spot_id: DbId,
        threshold_hours: i32,
        at: Timestamp,
    ) -> StoreResult<Option<Spot>> {
        self.check_spot_write(spot_id)?;
        let mut state = self.state();
        let Some(spot) = state.spots.get_mut(&spot_id) else {
            return Ok(None);
        };
        let not_yet_sent = spot.last_reminder_hours.map_or(true, |h| h > threshold_hours);
        if spot.confirmation_status_id != PENDING || !not_yet_sent {
            return Ok(None);
        }
        spot.last_reminder_hours = Some(threshold_hours);
        spot.updated_at = at;
        Ok(Some(spot.clone()))
    }

    async fn extend_deadline(
        &self,
        input: &ExtendDeadline,
        at: Timestamp,
    ) -> StoreResult<ExtendOutcome> {
        self.check_spot_write(input.spot_id)?;
        let mut state = self.state();
        let Some(spot) = state.spots.get_mut(&input.spot_id) else {
            return Ok(ExtendOutcome::NotFound);
        };
        if spot.confirmation_status_id != PENDING {
            return Ok(ExtendOutcome::NotPending(spot.confirmation_status_id));
        }

        let previous_deadline = spot.confirmation_deadline;
        spot.confirmation_deadline = Some(input.new_deadline);
        spot.last_reminder_hours = None;
        spot.updated_at = at;
        let spot = spot.clone();

        let id = state.next_id();
        state.extensions.push(DeadlineExtension {
            id,
            spot_id: input.spot_id,
            previous_deadline,
            new_deadline: input.new_deadline,
            reason: input.reason.clone(),
            extended_by: input.extended_by,
            created_at: at,
        });

        Ok(ExtendOutcome::Extended {
            spot,
            previous_deadline,
        })
    }

    async fn create_application(&self, input: &CreateApplication) -> StoreResult<Application> {
        self.check_injected()?;
        let mut state = self.state();
        let now = Utc::now();
        let application = Application {
            id: state.next_id(),
            event_id: input.event_id,
            performer_id: input.performer_id,
            spot_type: input.spot_type.clone(),
            status: input.status.clone(),
            created_at: now,
            updated_at: now,
        };
        state.applications.insert(application.id, application.clone());
        Ok(application)
    }

    async fn list_unassigned_accepted_applications(
        &self,
        event_id: DbId,
    ) -> StoreResult<Vec<Application>> {
        self.check_injected()?;
        let state = self.state();
        let holds_live = |performer_id: DbId| {
            state.spots.values().any(|s| {
                s.event_id == event_id
                    && s.performer_id == Some(performer_id)
                    && is_live_hold(s.confirmation_status_id)
            })
        };
        let mut applications: Vec<Application> = state
            .applications
            .values()
            .filter(|a| {
                a.event_id == event_id
                    && a.status == application_statuses::ACCEPTED
                    && !holds_live(a.performer_id)
            })
            .cloned()
            .collect();
        applications.sort_by_key(|a| (a.created_at, a.id));
        Ok(applications)
    }
}
