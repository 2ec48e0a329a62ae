//! Administrative deadline extensions.

use lineup_core::error::SpotError;
use lineup_core::notifications::NotificationKind;
use lineup_core::spot_lifecycle::{state_machine, validate_extension};
use lineup_core::types::{DbId, Timestamp};
use lineup_db::models::deadline_extension::{ExtendDeadline, ExtendOutcome};
use lineup_db::models::spot::Spot;
use lineup_events::PlatformEvent;

use crate::error::EngineError;
use crate::service::SpotService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendDeadlineRequest {
    pub spot_id: DbId,
    pub new_deadline: Timestamp,
    pub reason: Option<String>,
    /// Must be the promoter of the spot's event.
    pub extended_by: DbId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineExtended {
    pub spot: Spot,
    pub previous_deadline: Option<Timestamp>,
}

impl SpotService {
    /// Move a pending spot's confirmation deadline.
    ///
    /// Allowed while the spot is pending, including after the old deadline
    /// lapsed but before the sweep expired it. Resets reminder state and
    /// records an audit row.
    pub async fn extend_deadline(
        &self,
        request: &ExtendDeadlineRequest,
    ) -> Result<DeadlineExtended, EngineError> {
        let now = self.now();

        let spot = self
            .with_retry("find_spot", || self.store.find_spot(request.spot_id))
            .await?
            .ok_or(SpotError::SpotNotFound(request.spot_id))?;
        let event = self
            .with_retry("find_event", || self.store.find_event(spot.event_id))
            .await?
            .ok_or(SpotError::SpotNotFound(request.spot_id))?;
        if event.promoter_id != request.extended_by {
            return Err(SpotError::Unauthorized(format!(
                "User {} does not own event {}",
                request.extended_by, event.id
            ))
            .into());
        }
        if !spot.is_pending() {
            return Err(SpotError::NotPending {
                spot_id: spot.id,
                status: spot.status_name(),
            }
            .into());
        }
        validate_extension(now, request.new_deadline)?;

        let input = ExtendDeadline {
            spot_id: request.spot_id,
            new_deadline: request.new_deadline,
            reason: request.reason.clone(),
            extended_by: request.extended_by,
        };
        let outcome = self
            .with_retry("extend_deadline", || self.store.extend_deadline(&input, now))
            .await?;

        let (spot, previous_deadline) = match outcome {
            ExtendOutcome::Extended {
                spot,
                previous_deadline,
            } => (spot, previous_deadline),
            ExtendOutcome::NotFound => {
                return Err(SpotError::SpotNotFound(request.spot_id).into());
            }
            ExtendOutcome::NotPending(status_id) => {
                return Err(SpotError::NotPending {
                    spot_id: request.spot_id,
                    status: state_machine::status_name(status_id),
                }
                .into());
            }
        };

        tracing::info!(
            spot_id = spot.id,
            extended_by = request.extended_by,
            previous_deadline = ?previous_deadline,
            new_deadline = %request.new_deadline,
            "Confirmation deadline extended"
        );

        if let Some(performer_id) = spot.performer_id {
            self.notify(
                PlatformEvent::for_spot(NotificationKind::DeadlineExtended, spot.id, performer_id)
                    .with_actor(request.extended_by)
                    .with_payload(serde_json::json!({
                        "event_id": spot.event_id,
                        "previous_deadline": previous_deadline,
                        "new_deadline": request.new_deadline,
                        "reason": request.reason,
                    })),
            );
        }

        Ok(DeadlineExtended {
            spot,
            previous_deadline,
        })
    }
}
