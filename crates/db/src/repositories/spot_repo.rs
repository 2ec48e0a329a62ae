//! Repository for the `spots` table.
//!
//! Every lifecycle transition is a single conditional `UPDATE ... RETURNING`
//! keyed on the expected prior status (and, where it matters, the bound
//! performer and the deadline). Callers treat `None` as "lost the race or the
//! row no longer qualifies" and classify the failure with a fresh read.

use lineup_core::spot_lifecycle::state_machine::{
    CONFIRMED, DECLINED, EXPIRED, PENDING, UNASSIGNED,
};
use lineup_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::deadline_extension::{ExtendDeadline, ExtendOutcome};
use crate::models::spot::{
    ClaimOutcome, CreateSpot, DeadlineCursor, Resolution, Spot, SpotClaim,
};
use crate::repositories::DeadlineExtensionRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, event_id, spot_type, spot_order, is_filled, performer_id, \
                       confirmation_status_id, confirmation_deadline, confirmed_at, \
                       declined_at, expired_at, last_reminder_hours, created_at, updated_at";

/// Partial unique index backing the one-live-spot-per-performer rule.
pub const LIVE_PERFORMER_CONSTRAINT: &str = "uq_spots_live_performer";

pub struct SpotRepo;

impl SpotRepo {
    /// Insert an unassigned spot.
    pub async fn create(pool: &PgPool, input: &CreateSpot) -> Result<Spot, sqlx::Error> {
        let query = format!(
            "INSERT INTO spots (event_id, spot_type, spot_order, confirmation_status_id)
             VALUES ($1, $2, $3, {UNASSIGNED})
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Spot>(&query)
            .bind(input.event_id)
            .bind(&input.spot_type)
            .bind(input.spot_order)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Spot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM spots WHERE id = $1");
        sqlx::query_as::<_, Spot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All spots of an event in running order.
    pub async fn list_by_event(pool: &PgPool, event_id: DbId) -> Result<Vec<Spot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM spots
             WHERE event_id = $1
             ORDER BY spot_order ASC, id ASC"
        );
        sqlx::query_as::<_, Spot>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    /// All spots of several events, grouped by event then running order.
    pub async fn list_by_events(
        pool: &PgPool,
        event_ids: &[DbId],
    ) -> Result<Vec<Spot>, sqlx::Error> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {COLUMNS} FROM spots
             WHERE event_id = ANY($1)
             ORDER BY event_id ASC, spot_order ASC, id ASC"
        );
        sqlx::query_as::<_, Spot>(&query)
            .bind(event_ids)
            .fetch_all(pool)
            .await
    }

    /// Atomically bind a performer to the first open spot of a type.
    ///
    /// Claims on one event are serialized by a transaction-scoped advisory
    /// lock keyed on the event id, so the live-hold check and the bind cannot
    /// interleave with another claim for the same performer. The partial
    /// unique index on live holds backs this up at the row level.
    pub async fn claim_open(pool: &PgPool, claim: &SpotClaim) -> Result<ClaimOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(claim.event_id)
            .execute(&mut *tx)
            .await?;

        let held: Option<(DbId,)> = sqlx::query_as(&format!(
            "SELECT id FROM spots
             WHERE event_id = $1 AND performer_id = $2
               AND confirmation_status_id IN ({PENDING}, {CONFIRMED})
             LIMIT 1"
        ))
        .bind(claim.event_id)
        .bind(claim.performer_id)
        .fetch_optional(&mut *tx)
        .await?;
        if held.is_some() {
            return Ok(ClaimOutcome::AlreadyAssigned);
        }

        let query = format!(
            "UPDATE spots SET
                 performer_id = $2,
                 is_filled = true,
                 confirmation_status_id = {PENDING},
                 confirmation_deadline = $4,
                 confirmed_at = NULL,
                 declined_at = NULL,
                 expired_at = NULL,
                 last_reminder_hours = NULL,
                 updated_at = $5
             WHERE id = (
                 SELECT id FROM spots
                 WHERE event_id = $1 AND spot_type = $3 AND NOT is_filled
                 ORDER BY spot_order ASC, id ASC
                 LIMIT 1
                 FOR UPDATE SKIP LOCKED
             )
               AND NOT is_filled
             RETURNING {COLUMNS}"
        );
        let claimed = sqlx::query_as::<_, Spot>(&query)
            .bind(claim.event_id)
            .bind(claim.performer_id)
            .bind(&claim.spot_type)
            .bind(claim.deadline)
            .bind(claim.assigned_at)
            .fetch_optional(&mut *tx)
            .await;

        match claimed {
            Ok(Some(spot)) => {
                tx.commit().await?;
                Ok(ClaimOutcome::Claimed(spot))
            }
            Ok(None) => Ok(ClaimOutcome::NoSpotsAvailable),
            Err(sqlx::Error::Database(db_err))
                if db_err.constraint() == Some(LIVE_PERFORMER_CONSTRAINT) =>
            {
                Ok(ClaimOutcome::AlreadyAssigned)
            }
            Err(e) => Err(e),
        }
    }

    /// Resolve a pending spot on behalf of its bound performer.
    ///
    /// Only matches while the deadline is still ahead of `at`; a lapsed offer
    /// belongs to the sweeper.
    pub async fn resolve_pending(
        pool: &PgPool,
        spot_id: DbId,
        performer_id: DbId,
        resolution: Resolution,
        at: Timestamp,
    ) -> Result<Option<Spot>, sqlx::Error> {
        let set = match resolution {
            Resolution::Confirm => format!(
                "confirmation_status_id = {CONFIRMED},
                 confirmed_at = $3,
                 confirmation_deadline = NULL"
            ),
            Resolution::Decline => format!(
                "confirmation_status_id = {DECLINED},
                 declined_at = $3,
                 is_filled = false,
                 performer_id = NULL,
                 confirmation_deadline = NULL,
                 last_reminder_hours = NULL"
            ),
        };
        let query = format!(
            "UPDATE spots SET {set}, updated_at = $3
             WHERE id = $1
               AND performer_id = $2
               AND confirmation_status_id = {PENDING}
               AND confirmation_deadline > $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Spot>(&query)
            .bind(spot_id)
            .bind(performer_id)
            .bind(at)
            .fetch_optional(pool)
            .await
    }

    /// Pending spots whose deadline is at or before `now`, oldest deadline
    /// first, continuing after `after` when given.
    pub async fn list_due_pending(
        pool: &PgPool,
        now: Timestamp,
        after: Option<DeadlineCursor>,
        limit: i64,
    ) -> Result<Vec<Spot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM spots
             WHERE confirmation_status_id = {PENDING}
               AND confirmation_deadline <= $1
               AND ($2::timestamptz IS NULL OR (confirmation_deadline, id) > ($2, $3::bigint))
             ORDER BY confirmation_deadline ASC, id ASC
             LIMIT $4"
        );
        sqlx::query_as::<_, Spot>(&query)
            .bind(now)
            .bind(after.map(|c| c.deadline))
            .bind(after.map(|c| c.id))
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Expire one due spot and release it.
    ///
    /// Keyed on the performer observed by the scan so a spot that was
    /// declined and re-offered in between is left alone.
    pub async fn expire_pending(
        pool: &PgPool,
        spot_id: DbId,
        performer_id: DbId,
        now: Timestamp,
    ) -> Result<Option<Spot>, sqlx::Error> {
        let query = format!(
            "UPDATE spots SET
                 confirmation_status_id = {EXPIRED},
                 expired_at = $3,
                 is_filled = false,
                 performer_id = NULL,
                 confirmation_deadline = NULL,
                 last_reminder_hours = NULL,
                 updated_at = $3
             WHERE id = $1
               AND performer_id = $2
               AND confirmation_status_id = {PENDING}
               AND confirmation_deadline <= $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Spot>(&query)
            .bind(spot_id)
            .bind(performer_id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Pending spots positioned after `after` with `deadline <= until`,
    /// soonest first.
    pub async fn list_pending_deadlines_between(
        pool: &PgPool,
        after: DeadlineCursor,
        until: Timestamp,
        limit: i64,
    ) -> Result<Vec<Spot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM spots
             WHERE confirmation_status_id = {PENDING}
               AND (confirmation_deadline, id) > ($1, $2)
               AND confirmation_deadline <= $3
             ORDER BY confirmation_deadline ASC, id ASC
             LIMIT $4"
        );
        sqlx::query_as::<_, Spot>(&query)
            .bind(after.deadline)
            .bind(after.id)
            .bind(until)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Record that the reminder for `threshold_hours` went out.
    ///
    /// Matches only if no reminder at this threshold or a tighter one has
    /// been recorded, so two concurrent runs cannot both win.
    pub async fn mark_reminder_sent(
        pool: &PgPool,
        spot_id: DbId,
        threshold_hours: i32,
        at: Timestamp,
    ) -> Result<Option<Spot>, sqlx::Error> {
        let query = format!(
            "UPDATE spots SET last_reminder_hours = $2, updated_at = $3
             WHERE id = $1
               AND confirmation_status_id = {PENDING}
               AND (last_reminder_hours IS NULL OR last_reminder_hours > $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Spot>(&query)
            .bind(spot_id)
            .bind(threshold_hours)
            .bind(at)
            .fetch_optional(pool)
            .await
    }

    /// Move a pending spot's deadline and append the audit row, atomically.
    pub async fn extend_deadline(
        pool: &PgPool,
        input: &ExtendDeadline,
        at: Timestamp,
    ) -> Result<ExtendOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current = sqlx::query_as::<_, Spot>(&format!(
            "SELECT {COLUMNS} FROM spots WHERE id = $1 FOR UPDATE"
        ))
        .bind(input.spot_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(ExtendOutcome::NotFound);
        };
        if current.confirmation_status_id != PENDING {
            return Ok(ExtendOutcome::NotPending(current.confirmation_status_id));
        }

        let query = format!(
            "UPDATE spots SET
                 confirmation_deadline = $2,
                 last_reminder_hours = NULL,
                 updated_at = $3
             WHERE id = $1 AND confirmation_status_id = {PENDING}
             RETURNING {COLUMNS}"
        );
        let spot = sqlx::query_as::<_, Spot>(&query)
            .bind(input.spot_id)
            .bind(input.new_deadline)
            .bind(at)
            .fetch_one(&mut *tx)
            .await?;

        DeadlineExtensionRepo::insert(
            &mut *tx,
            input.spot_id,
            current.confirmation_deadline,
            input.new_deadline,
            input.reason.as_deref(),
            input.extended_by,
            at,
        )
        .await?;

        tx.commit().await?;
        Ok(ExtendOutcome::Extended {
            spot,
            previous_deadline: current.confirmation_deadline,
        })
    }
}
