//! The storage seam the lifecycle engine is written against.
//!
//! [`PgSpotStore`] delegates to the repositories; [`MemorySpotStore`] keeps
//! rows behind a mutex with the same conditional-write semantics so the
//! engine and HTTP layers can be exercised without a database.

use async_trait::async_trait;
use lineup_core::types::{DbId, Timestamp};

use crate::models::application::{Application, CreateApplication};
use crate::models::deadline_extension::{ExtendDeadline, ExtendOutcome};
use crate::models::event::{CreateEvent, Event};
use crate::models::spot::{
    ClaimOutcome, CreateSpot, DeadlineCursor, Resolution, Spot, SpotClaim,
};

mod memory;
mod postgres;

pub use memory::MemorySpotStore;
pub use postgres::PgSpotStore;

/// Serialization failure.
const SQLSTATE_SERIALIZATION_FAILURE: &str = "40001";
/// Deadlock detected.
const SQLSTATE_DEADLOCK: &str = "40P01";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether retrying the same operation may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            StoreError::Unavailable(_) => true,
            StoreError::Database(sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) => true,
            StoreError::Database(sqlx::Error::Database(db_err)) => matches!(
                db_err.code().as_deref(),
                Some(SQLSTATE_SERIALIZATION_FAILURE | SQLSTATE_DEADLOCK)
            ),
            StoreError::Database(_) => false,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait SpotStore: Send + Sync {
    async fn health_check(&self) -> StoreResult<()>;

    async fn create_event(&self, input: &CreateEvent) -> StoreResult<Event>;
    async fn find_event(&self, event_id: DbId) -> StoreResult<Option<Event>>;
    /// Events of a promoter dated at or after `from`, soonest first.
    async fn list_upcoming_events_for_promoter(
        &self,
        promoter_id: DbId,
        from: Timestamp,
    ) -> StoreResult<Vec<Event>>;

    async fn create_spot(&self, input: &CreateSpot) -> StoreResult<Spot>;
    async fn find_spot(&self, spot_id: DbId) -> StoreResult<Option<Spot>>;
    async fn list_spots_for_event(&self, event_id: DbId) -> StoreResult<Vec<Spot>>;
    async fn list_spots_for_events(&self, event_ids: &[DbId]) -> StoreResult<Vec<Spot>>;

    /// Live-hold check, open-spot selection and bind as one atomic unit.
    async fn claim_open_spot(&self, claim: &SpotClaim) -> StoreResult<ClaimOutcome>;

    /// `pending -> confirmed|declined` for the bound performer while the
    /// deadline is still ahead of `at`. `None` when the row did not qualify.
    async fn resolve_pending(
        &self,
        spot_id: DbId,
        performer_id: DbId,
        resolution: Resolution,
        at: Timestamp,
    ) -> StoreResult<Option<Spot>>;

    /// Due pending spots in `(deadline, id)` order, after `after` when given.
    async fn list_due_pending(
        &self,
        now: Timestamp,
        after: Option<DeadlineCursor>,
        limit: i64,
    ) -> StoreResult<Vec<Spot>>;

    /// `pending -> expired` for a due spot still bound to `performer_id`.
    async fn expire_pending(
        &self,
        spot_id: DbId,
        performer_id: DbId,
        now: Timestamp,
    ) -> StoreResult<Option<Spot>>;

    /// Pending spots after `after` with a deadline at or before `until`.
    async fn list_pending_deadlines_between(
        &self,
        after: DeadlineCursor,
        until: Timestamp,
        limit: i64,
    ) -> StoreResult<Vec<Spot>>;

    /// Record a reminder at `threshold_hours` unless it or a tighter one
    /// was already recorded.
    async fn mark_reminder_sent(
        &self,
        spot_id: DbId,
        threshold_hours: i32,
        at: Timestamp,
    ) -> StoreResult<Option<Spot>>;

    async fn extend_deadline(
        &self,
        input: &ExtendDeadline,
        at: Timestamp,
    ) -> StoreResult<ExtendOutcome>;

    async fn create_application(&self, input: &CreateApplication) -> StoreResult<Application>;
    /// Accepted applications whose performer holds no live spot on the event.
    async fn list_unassigned_accepted_applications(
        &self,
        event_id: DbId,
    ) -> StoreResult<Vec<Application>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeout_and_unavailable_are_transient() {
        assert!(StoreError::Database(sqlx::Error::PoolTimedOut).is_transient());
        assert!(StoreError::Unavailable("down".into()).is_transient());
    }

    #[test]
    fn missing_row_is_not_transient() {
        assert!(!StoreError::Database(sqlx::Error::RowNotFound).is_transient());
    }
}
