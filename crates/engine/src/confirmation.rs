//! Performer responses to a pending offer.

use lineup_core::error::SpotError;
use lineup_core::notifications::{NotificationKind, EVENT_ENTITY};
use lineup_core::spot_lifecycle::state_machine::CONFIRMED;
use lineup_core::types::{DbId, Timestamp};
use lineup_db::models::spot::{Resolution, Spot};
use lineup_events::PlatformEvent;

use crate::error::EngineError;
use crate::service::SpotService;

/// Status reported for a pending spot whose deadline passed before the
/// sweeper reached it.
pub const AWAITING_EXPIRY: &str = "awaiting_expiry";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub spot_id: DbId,
    pub performer_id: DbId,
    pub accepted: bool,
    pub reason: Option<String>,
}

impl SpotService {
    /// Accept or decline a pending spot on behalf of its bound performer.
    ///
    /// A decline releases the spot immediately. Returns the updated spot.
    pub async fn confirm(&self, request: &ConfirmRequest) -> Result<Spot, EngineError> {
        let at = self.now();
        let resolution = if request.accepted {
            Resolution::Confirm
        } else {
            Resolution::Decline
        };

        let resolved = self
            .with_retry("resolve_pending", || {
                self.store
                    .resolve_pending(request.spot_id, request.performer_id, resolution, at)
            })
            .await?;

        let Some(spot) = resolved else {
            return Err(self.classify_unresolved(request, at).await?.into());
        };

        tracing::info!(
            spot_id = spot.id,
            event_id = spot.event_id,
            performer_id = request.performer_id,
            accepted = request.accepted,
            "Spot confirmation recorded"
        );

        if let Some(event) = self.event_for_notification(spot.event_id).await {
            let kind = if request.accepted {
                NotificationKind::SpotConfirmed
            } else {
                NotificationKind::SpotDeclined
            };
            self.notify(
                PlatformEvent::for_spot(kind, spot.id, event.promoter_id)
                    .with_actor(request.performer_id)
                    .with_payload(serde_json::json!({
                        "event_id": spot.event_id,
                        "spot_type": spot.spot_type,
                        "performer_id": request.performer_id,
                        "reason": request.reason,
                    })),
            );

            if request.accepted {
                self.notify_if_lineup_complete(spot.event_id, event.promoter_id)
                    .await;
            }
        }

        Ok(spot)
    }

    /// Work out why the conditional write matched nothing.
    async fn classify_unresolved(
        &self,
        request: &ConfirmRequest,
        at: Timestamp,
    ) -> Result<SpotError, EngineError> {
        let spot = self
            .with_retry("find_spot", || self.store.find_spot(request.spot_id))
            .await?;
        let Some(spot) = spot else {
            return Ok(SpotError::SpotNotFound(request.spot_id));
        };
        if !spot.is_pending() {
            return Ok(SpotError::NotPending {
                spot_id: spot.id,
                status: spot.status_name(),
            });
        }
        if spot.performer_id != Some(request.performer_id) {
            return Ok(SpotError::Unauthorized(format!(
                "Performer {} is not assigned to spot {}",
                request.performer_id, spot.id
            )));
        }
        if spot.confirmation_deadline.is_some_and(|d| d <= at) {
            return Ok(SpotError::NotPending {
                spot_id: spot.id,
                status: AWAITING_EXPIRY,
            });
        }
        // The row changed between the write and the read.
        Ok(SpotError::NotPending {
            spot_id: spot.id,
            status: spot.status_name(),
        })
    }

    async fn notify_if_lineup_complete(&self, event_id: DbId, promoter_id: DbId) {
        let spots = match self.store.list_spots_for_event(event_id).await {
            Ok(spots) => spots,
            Err(e) => {
                tracing::warn!(event_id, error = %e, "Lineup completeness check failed");
                return;
            }
        };
        let complete =
            !spots.is_empty() && spots.iter().all(|s| s.confirmation_status_id == CONFIRMED);
        if complete {
            tracing::info!(event_id, spots = spots.len(), "Lineup complete");
            self.notify(
                PlatformEvent::new(NotificationKind::LineupComplete.as_str())
                    .with_source(EVENT_ENTITY, event_id)
                    .with_recipient(promoter_id)
                    .with_payload(serde_json::json!({ "spot_count": spots.len() })),
            );
        }
    }
}
