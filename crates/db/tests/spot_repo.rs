//! Repository tests against a live Postgres. Run with
//! `cargo test -p lineup-db --features pg-tests` and `DATABASE_URL` set.
#![cfg(feature = "pg-tests")]

use assert_matches::assert_matches;
use chrono::{Duration, Utc};
use lineup_core::spot_lifecycle::state_machine::{CONFIRMED, DECLINED, EXPIRED, PENDING};
use lineup_core::types::{DbId, Timestamp};
use lineup_db::models::deadline_extension::{ExtendDeadline, ExtendOutcome};
use lineup_db::models::event::CreateEvent;
use lineup_db::models::spot::{ClaimOutcome, CreateSpot, DeadlineCursor, Resolution, SpotClaim};
use lineup_db::repositories::{DeadlineExtensionRepo, EventRepo, SpotRepo};
use sqlx::PgPool;

async fn seed_event(pool: &PgPool, spot_types: &[&str]) -> (DbId, Vec<DbId>) {
    let event = EventRepo::create(
        pool,
        &CreateEvent {
            promoter_id: 100,
            title: "Friday Showcase".into(),
            event_date: Utc::now() + Duration::days(3),
        },
    )
    .await
    .unwrap();

    let mut ids = Vec::new();
    for (order, spot_type) in spot_types.iter().enumerate() {
        let spot = SpotRepo::create(
            pool,
            &CreateSpot {
                event_id: event.id,
                spot_type: (*spot_type).to_string(),
                spot_order: order as i32,
            },
        )
        .await
        .unwrap();
        ids.push(spot.id);
    }
    (event.id, ids)
}

fn claim(event_id: DbId, performer_id: DbId, spot_type: &str, now: Timestamp) -> SpotClaim {
    SpotClaim {
        event_id,
        performer_id,
        spot_type: spot_type.to_string(),
        deadline: now + Duration::hours(48),
        assigned_at: now,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_lookup_seeded(pool: PgPool) {
    let rows: Vec<(i16, String)> =
        sqlx::query_as("SELECT id, name FROM spot_confirmation_statuses ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
    let names: Vec<&str> = rows.iter().map(|(_, n)| n.as_str()).collect();
    assert_eq!(names, ["unassigned", "pending", "confirmed", "declined", "expired"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_claim_then_double_hold_rejected(pool: PgPool) {
    let now = Utc::now();
    let (event_id, ids) = seed_event(&pool, &["Open", "MC"]).await;

    let outcome = SpotRepo::claim_open(&pool, &claim(event_id, 7, "Open", now))
        .await
        .unwrap();
    let spot = assert_matches!(outcome, ClaimOutcome::Claimed(s) => s);
    assert_eq!(spot.id, ids[0]);
    assert_eq!(spot.confirmation_status_id, PENDING);

    let second = SpotRepo::claim_open(&pool, &claim(event_id, 7, "MC", now))
        .await
        .unwrap();
    assert_eq!(second, ClaimOutcome::AlreadyAssigned);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_concurrent_claims_for_last_spot(pool: PgPool) {
    let now = Utc::now();
    let (event_id, _) = seed_event(&pool, &["MC"]).await;

    let (a, b) = tokio::join!(
        SpotRepo::claim_open(&pool, &claim(event_id, 1, "MC", now)),
        SpotRepo::claim_open(&pool, &claim(event_id, 2, "MC", now)),
    );
    let outcomes = [a.unwrap(), b.unwrap()];
    let claimed = outcomes
        .iter()
        .filter(|o| matches!(o, ClaimOutcome::Claimed(_)))
        .count();
    let empty = outcomes
        .iter()
        .filter(|o| matches!(o, ClaimOutcome::NoSpotsAvailable))
        .count();
    assert_eq!((claimed, empty), (1, 1));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_confirm_and_decline(pool: PgPool) {
    let now = Utc::now();
    let (event_id, ids) = seed_event(&pool, &["Open", "Open"]).await;
    SpotRepo::claim_open(&pool, &claim(event_id, 1, "Open", now)).await.unwrap();
    SpotRepo::claim_open(&pool, &claim(event_id, 2, "Open", now)).await.unwrap();

    let confirmed = SpotRepo::resolve_pending(&pool, ids[0], 1, Resolution::Confirm, now)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(confirmed.confirmation_status_id, CONFIRMED);
    assert!(confirmed.is_filled);
    assert_eq!(confirmed.confirmation_deadline, None);

    let declined = SpotRepo::resolve_pending(&pool, ids[1], 2, Resolution::Decline, now)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(declined.confirmation_status_id, DECLINED);
    assert!(!declined.is_filled);
    assert_eq!(declined.performer_id, None);

    let again = SpotRepo::resolve_pending(&pool, ids[0], 1, Resolution::Decline, now)
        .await
        .unwrap();
    assert!(again.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expire_due_spots(pool: PgPool) {
    let now = Utc::now();
    let (event_id, ids) = seed_event(&pool, &["MC"]).await;
    SpotRepo::claim_open(&pool, &claim(event_id, 1, "MC", now)).await.unwrap();

    let later = now + Duration::hours(49);
    let due = SpotRepo::list_due_pending(&pool, later, None, 10).await.unwrap();
    assert_eq!(due.len(), 1);

    let expired = SpotRepo::expire_pending(&pool, ids[0], 1, later)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(expired.confirmation_status_id, EXPIRED);
    assert_eq!(expired.performer_id, None);
    assert!(SpotRepo::list_due_pending(&pool, later, None, 10).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_keyset_paging_over_tied_deadlines(pool: PgPool) {
    let now = Utc::now();
    let (event_id, ids) = seed_event(&pool, &["Open", "Open", "Open"]).await;
    for performer in [1, 2, 3] {
        SpotRepo::claim_open(&pool, &claim(event_id, performer, "Open", now))
            .await
            .unwrap();
    }

    let first = SpotRepo::list_pending_deadlines_between(
        &pool,
        DeadlineCursor::past(now),
        now + Duration::hours(72),
        2,
    )
    .await
    .unwrap();
    assert_eq!(first.len(), 2);
    let cursor = DeadlineCursor::of(&first[1]).unwrap();
    let rest =
        SpotRepo::list_pending_deadlines_between(&pool, cursor, now + Duration::hours(72), 2)
            .await
            .unwrap();
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].id, ids[2]);

    let later = now + Duration::hours(49);
    let due = SpotRepo::list_due_pending(&pool, later, Some(cursor), 10)
        .await
        .unwrap();
    assert_eq!(due.iter().map(|s| s.id).collect::<Vec<_>>(), vec![ids[2]]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_extend_writes_audit_row(pool: PgPool) {
    let now = Utc::now();
    let (event_id, ids) = seed_event(&pool, &["MC"]).await;
    SpotRepo::claim_open(&pool, &claim(event_id, 1, "MC", now)).await.unwrap();

    let outcome = SpotRepo::extend_deadline(
        &pool,
        &ExtendDeadline {
            spot_id: ids[0],
            new_deadline: now + Duration::hours(72),
            reason: Some("flight delay".into()),
            extended_by: 100,
        },
        now,
    )
    .await
    .unwrap();
    assert_matches!(outcome, ExtendOutcome::Extended { .. });

    let history = DeadlineExtensionRepo::list_for_spot(&pool, ids[0]).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].reason.as_deref(), Some("flight delay"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_check_constraint_rejects_filled_without_performer(pool: PgPool) {
    let (_, ids) = seed_event(&pool, &["MC"]).await;
    let result = sqlx::query("UPDATE spots SET is_filled = true WHERE id = $1")
        .bind(ids[0])
        .execute(&pool)
        .await;
    assert!(result.is_err());
}
