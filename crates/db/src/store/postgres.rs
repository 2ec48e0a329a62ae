use async_trait::async_trait;
use lineup_core::types::{DbId, Timestamp};

use crate::models::application::{Application, CreateApplication};
use crate::models::deadline_extension::{ExtendDeadline, ExtendOutcome};
use crate::models::event::{CreateEvent, Event};
use crate::models::spot::{
    ClaimOutcome, CreateSpot, DeadlineCursor, Resolution, Spot, SpotClaim,
};
use crate::repositories::{ApplicationRepo, EventRepo, SpotRepo};
use crate::store::{SpotStore, StoreResult};
use crate::DbPool;

/// [`SpotStore`] backed by Postgres.
#[derive(Clone)]
pub struct PgSpotStore {
    pool: DbPool,
}

impl PgSpotStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl SpotStore for PgSpotStore {
    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn create_event(&self, input: &CreateEvent) -> StoreResult<Event> {
        Ok(EventRepo::create(&self.pool, input).await?)
    }

    async fn find_event(&self, event_id: DbId) -> StoreResult<Option<Event>> {
        Ok(EventRepo::find_by_id(&self.pool, event_id).await?)
    }

    async fn list_upcoming_events_for_promoter(
        &self,
        promoter_id: DbId,
        from: Timestamp,
    ) -> StoreResult<Vec<Event>> {
        Ok(EventRepo::list_upcoming_for_promoter(&self.pool, promoter_id, from).await?)
    }

    async fn create_spot(&self, input: &CreateSpot) -> StoreResult<Spot> {
        Ok(SpotRepo::create(&self.pool, input).await?)
    }

    async fn find_spot(&self, spot_id: DbId) -> StoreResult<Option<Spot>> {
        Ok(SpotRepo::find_by_id(&self.pool, spot_id).await?)
    }

    async fn list_spots_for_event(&self, event_id: DbId) -> StoreResult<Vec<Spot>> {
        Ok(SpotRepo::list_by_event(&self.pool, event_id).await?)
    }

    async fn list_spots_for_events(&self, event_ids: &[DbId]) -> StoreResult<Vec<Spot>> {
        Ok(SpotRepo::list_by_events(&self.pool, event_ids).await?)
    }

    async fn claim_open_spot(&self, claim: &SpotClaim) -> StoreResult<ClaimOutcome> {
        Ok(SpotRepo::claim_open(&self.pool, claim).await?)
    }

    async fn resolve_pending(
        &self,
        spot_id: DbId,
        performer_id: DbId,
        resolution: Resolution,
        at: Timestamp,
    ) -> StoreResult<Option<Spot>> {
        Ok(SpotRepo::resolve_pending(&self.pool, spot_id, performer_id, resolution, at).await?)
    }

    async fn list_due_pending(
        &self,
        now: Timestamp,
        after: Option<DeadlineCursor>,
        limit: i64,
    ) -> StoreResult<Vec<Spot>> {
        Ok(SpotRepo::list_due_pending(&self.pool, now, after, limit).await?)
    }

    async fn expire_pending(
        &self,
        spot_id: DbId,
        performer_id: DbId,
        now: Timestamp,
    ) -> StoreResult<Option<Spot>> {
        Ok(SpotRepo::expire_pending(&self.pool, spot_id, performer_id, now).await?)
    }

    async fn list_pending_deadlines_between(
        &self,
        after: DeadlineCursor,
        until: Timestamp,
        limit: i64,
    ) -> StoreResult<Vec<Spot>> {
        Ok(SpotRepo::list_pending_deadlines_between(&self.pool, after, until, limit).await?)
    }

    async fn mark_reminder_sent(
        &self,
        spot_id: DbId,
        threshold_hours: i32,
        at: Timestamp,
    ) -> StoreResult<Option<Spot>> {
        Ok(SpotRepo::mark_reminder_sent(&self.pool, spot_id, threshold_hours, at).await?)
    }

    async fn extend_deadline(
        &self,
        input: &ExtendDeadline,
        at: Timestamp,
    ) -> StoreResult<ExtendOutcome> {
        Ok(SpotRepo::extend_deadline(&self.pool, input, at).await?)
    }

    async fn create_application(&self, input: &CreateApplication) -> StoreResult<Application> {
        Ok(ApplicationRepo::create(&self.pool, input).await?)
    }

    async fn list_unassigned_accepted_applications(
        &self,
        event_id: DbId,
    ) -> StoreResult<Vec<Application>> {
        Ok(ApplicationRepo::list_unassigned_accepted(&self.pool, event_id).await?)
    }
}
