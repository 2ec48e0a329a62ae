mod common;

use assert_matches::assert_matches;
use chrono::Duration;
use common::{assert_invariants, request, t0, Harness, PROMOTER};
use lineup_core::error::SpotError;
use lineup_core::notifications::NotificationKind;
use lineup_core::spot_lifecycle::state_machine::{CONFIRMED, DECLINED};
use lineup_engine::confirmation::{ConfirmRequest, AWAITING_EXPIRY};
use lineup_engine::EngineError;

fn accept(spot_id: i64, performer_id: i64) -> ConfirmRequest {
    ConfirmRequest {
        spot_id,
        performer_id,
        accepted: true,
        reason: None,
    }
}

fn decline(spot_id: i64, performer_id: i64, reason: Option<&str>) -> ConfirmRequest {
    ConfirmRequest {
        spot_id,
        performer_id,
        accepted: false,
        reason: reason.map(str::to_string),
    }
}

#[tokio::test]
async fn accept_confirms_and_notifies_promoter() {
    let mut h = Harness::new();
    let (event, spots) = h.event_with_spots(&["Headliner", "MC"]).await;
    h.service
        .assign_spot(&request(event.id, 1, "Headliner", 24), PROMOTER)
        .await
        .unwrap();
    h.published();

    h.clock.advance(Duration::hours(2));
    let spot = h.service.confirm(&accept(spots[0].id, 1)).await.unwrap();

    assert_eq!(spot.confirmation_status_id, CONFIRMED);
    assert_eq!(spot.confirmed_at, Some(t0() + Duration::hours(2)));
    assert_eq!(spot.confirmation_deadline, None);
    assert!(spot.is_filled);
    assert_invariants(&spot);

    let published = h.published();
    assert_eq!(published.len(), 1, "lineup is not complete yet");
    assert_eq!(published[0].kind(), Some(NotificationKind::SpotConfirmed));
    assert_eq!(published[0].recipient_user_id, Some(PROMOTER));
    assert_eq!(published[0].actor_user_id, Some(1));
}

#[tokio::test]
async fn decline_releases_spot_and_carries_reason() {
    let mut h = Harness::new();
    let (event, spots) = h.event_with_spots(&["Feature"]).await;
    h.service
        .assign_spot(&request(event.id, 1, "Feature", 24), PROMOTER)
        .await
        .unwrap();
    h.published();

    let spot = h
        .service
        .confirm(&decline(spots[0].id, 1, Some("Double booked")))
        .await
        .unwrap();

    assert_eq!(spot.confirmation_status_id, DECLINED);
    assert_eq!(spot.declined_at, Some(t0()));
    assert!(!spot.is_filled);
    assert_eq!(spot.performer_id, None);
    assert_eq!(spot.confirmation_deadline, None);
    assert_invariants(&spot);

    let published = h.published();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].kind(), Some(NotificationKind::SpotDeclined));
    assert_eq!(published[0].payload["reason"], "Double booked");
}

#[tokio::test]
async fn last_confirmation_announces_complete_lineup() {
    let mut h = Harness::new();
    let (event, spots) = h.event_with_spots(&["Headliner", "MC"]).await;
    h.service
        .assign_spot(&request(event.id, 1, "Headliner", 24), PROMOTER)
        .await
        .unwrap();
    h.service
        .assign_spot(&request(event.id, 2, "MC", 24), PROMOTER)
        .await
        .unwrap();
    h.service.confirm(&accept(spots[0].id, 1)).await.unwrap();
    h.published();

    h.service.confirm(&accept(spots[1].id, 2)).await.unwrap();

    let kinds: Vec<_> = h.published().iter().filter_map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![NotificationKind::SpotConfirmed, NotificationKind::LineupComplete]
    );
}

#[tokio::test]
async fn unknown_spot_is_not_found() {
    let h = Harness::new();
    let err = h.service.confirm(&accept(999, 1)).await.unwrap_err();
    assert_matches!(err, EngineError::Spot(SpotError::SpotNotFound(999)));
}

#[tokio::test]
async fn other_performer_is_unauthorized() {
    let h = Harness::new();
    let (event, spots) = h.event_with_spots(&["MC"]).await;
    h.service
        .assign_spot(&request(event.id, 1, "MC", 24), PROMOTER)
        .await
        .unwrap();

    let err = h.service.confirm(&accept(spots[0].id, 2)).await.unwrap_err();
    assert_matches!(err, EngineError::Spot(SpotError::Unauthorized(_)));
    assert_eq!(h.spot(spots[0].id).await.performer_id, Some(1));
}

#[tokio::test]
async fn resolved_or_unassigned_spot_is_not_pending() {
    let h = Harness::new();
    let (event, spots) = h.event_with_spots(&["MC", "Open"]).await;

    let err = h.service.confirm(&accept(spots[1].id, 1)).await.unwrap_err();
    assert_matches!(
        err,
        EngineError::Spot(SpotError::NotPending { status: "unassigned", .. })
    );

    h.service
        .assign_spot(&request(event.id, 1, "MC", 24), PROMOTER)
        .await
        .unwrap();
    h.service.confirm(&accept(spots[0].id, 1)).await.unwrap();

    let err = h
        .service
        .confirm(&decline(spots[0].id, 1, None))
        .await
        .unwrap_err();
    assert_matches!(
        err,
        EngineError::Spot(SpotError::NotPending { status: "confirmed", .. })
    );
}

#[tokio::test]
async fn lapsed_deadline_cannot_be_confirmed_before_sweep() {
    let h = Harness::new();
    let (event, spots) = h.event_with_spots(&["MC"]).await;
    h.service
        .assign_spot(&request(event.id, 1, "MC", 2), PROMOTER)
        .await
        .unwrap();

    h.clock.advance(Duration::hours(2));
    let err = h.service.confirm(&accept(spots[0].id, 1)).await.unwrap_err();
    assert_matches!(
        err,
        EngineError::Spot(SpotError::NotPending { status, .. }) if status == AWAITING_EXPIRY
    );
    assert!(h.spot(spots[0].id).await.is_pending());
}

#[tokio::test]
async fn expired_spot_is_not_pending() {
    let h = Harness::new();
    let (event, spots) = h.event_with_spots(&["MC"]).await;
    h.service
        .assign_spot(&request(event.id, 1, "MC", 1), PROMOTER)
        .await
        .unwrap();
    h.clock.advance(Duration::hours(3));
    h.service.sweep_expired().await.unwrap();

    let err = h.service.confirm(&accept(spots[0].id, 1)).await.unwrap_err();
    assert_matches!(
        err,
        EngineError::Spot(SpotError::NotPending { status: "expired", .. })
    );
}
