//! Binding performers to open spots.

use lineup_core::error::{CoreError, SpotError};
use lineup_core::notifications::NotificationKind;
use lineup_core::spot_lifecycle::{deadline_from, validate_spot_type};
use lineup_core::types::{DbId, Timestamp};
use lineup_db::models::spot::{ClaimOutcome, SpotClaim};
use lineup_events::PlatformEvent;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::service::SpotService;

/// Offer one spot of `spot_type` on `event_id` to `performer_id`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AssignmentRequest {
    pub event_id: DbId,
    pub performer_id: DbId,
    pub spot_type: String,
    /// Confirmation window; the configured default when absent.
    pub deadline_hours: Option<i64>,
}

/// A successful binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub spot_id: DbId,
    pub event_id: DbId,
    pub performer_id: DbId,
    pub spot_type: String,
    pub spot_order: i32,
    pub deadline: Timestamp,
}

/// One item of a bulk assignment. Items never roll each other back.
#[derive(Debug)]
pub struct AssignmentOutcome {
    pub request: AssignmentRequest,
    pub result: Result<Assignment, EngineError>,
}

impl SpotService {
    /// Atomically bind the performer to the lowest-ordered open spot of the
    /// requested type.
    ///
    /// The live-hold check, spot selection and bind are one store operation,
    /// so two concurrent calls for the last open spot yield exactly one
    /// success and one [`SpotError::NoSpotsAvailable`].
    pub async fn assign_spot(
        &self,
        request: &AssignmentRequest,
        assigned_by: DbId,
    ) -> Result<Assignment, EngineError> {
        validate_spot_type(&request.spot_type).map_err(CoreError::Validation)?;
        let now = self.now();
        let hours = request
            .deadline_hours
            .unwrap_or(self.config.default_deadline_hours);
        let deadline = deadline_from(now, hours)?;

        let claim = SpotClaim {
            event_id: request.event_id,
            performer_id: request.performer_id,
            spot_type: request.spot_type.trim().to_string(),
            deadline,
            assigned_at: now,
        };
        let outcome = self
            .with_retry("claim_open_spot", || self.store.claim_open_spot(&claim))
            .await?;

        let spot = match outcome {
            ClaimOutcome::Claimed(spot) => spot,
            ClaimOutcome::AlreadyAssigned => {
                tracing::info!(
                    event_id = request.event_id,
                    performer_id = request.performer_id,
                    "Assignment rejected: performer already holds a spot"
                );
                return Err(SpotError::AlreadyAssigned {
                    event_id: request.event_id,
                    performer_id: request.performer_id,
                }
                .into());
            }
            ClaimOutcome::NoSpotsAvailable => {
                tracing::info!(
                    event_id = request.event_id,
                    spot_type = %claim.spot_type,
                    "Assignment rejected: no open spot"
                );
                return Err(SpotError::NoSpotsAvailable {
                    event_id: request.event_id,
                    spot_type: claim.spot_type,
                }
                .into());
            }
        };

        tracing::info!(
            spot_id = spot.id,
            event_id = spot.event_id,
            performer_id = request.performer_id,
            %deadline,
            "Spot assigned"
        );

        self.notify(
            PlatformEvent::for_spot(NotificationKind::SpotAssigned, spot.id, request.performer_id)
                .with_actor(assigned_by)
                .with_payload(serde_json::json!({
                    "event_id": spot.event_id,
                    "spot_type": spot.spot_type,
                    "spot_order": spot.spot_order,
                    "confirmation_deadline": deadline,
                })),
        );

        Ok(Assignment {
            spot_id: spot.id,
            event_id: spot.event_id,
            performer_id: request.performer_id,
            spot_type: spot.spot_type,
            spot_order: spot.spot_order,
            deadline,
        })
    }

    /// Run each request independently, in order, reporting per item.
    pub async fn assign_multiple_spots(
        &self,
        requests: Vec<AssignmentRequest>,
        assigned_by: DbId,
    ) -> Vec<AssignmentOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        for request in requests {
            let result = self.assign_spot(&request, assigned_by).await;
            if let Err(e) = &result {
                tracing::debug!(
                    event_id = request.event_id,
                    performer_id = request.performer_id,
                    error = %e,
                    "Bulk assignment item failed"
                );
            }
            outcomes.push(AssignmentOutcome { request, result });
        }
        let assigned = outcomes.iter().filter(|o| o.result.is_ok()).count();
        tracing::info!(
            total = outcomes.len(),
            assigned,
            "Bulk assignment finished"
        );
        outcomes
    }

    /// Offer spots to every accepted applicant of the event who holds no
    /// live spot yet, oldest application first.
    pub async fn assign_accepted_applications(
        &self,
        event_id: DbId,
        deadline_hours: Option<i64>,
        assigned_by: DbId,
    ) -> Result<Vec<AssignmentOutcome>, EngineError> {
        let applications = self
            .with_retry("list_unassigned_accepted_applications", || {
                self.store.list_unassigned_accepted_applications(event_id)
            })
            .await?;

        let requests = applications
            .into_iter()
            .map(|application| AssignmentRequest {
                event_id,
                performer_id: application.performer_id,
                spot_type: application.spot_type,
                deadline_hours,
            })
            .collect();

        Ok(self.assign_multiple_spots(requests, assigned_by).await)
    }
}
