//! Handlers for spot assignment, confirmation, and deadline extension.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use lineup_core::types::{DbId, Timestamp};
use lineup_db::models::spot::SpotResponse;
use lineup_engine::assignment::{Assignment, AssignmentOutcome, AssignmentRequest};
use lineup_engine::confirmation::ConfirmRequest;
use lineup_engine::extension::ExtendDeadlineRequest;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AssignSpotBody {
    #[validate(range(min = 1))]
    pub performer_id: DbId,
    #[validate(length(min = 1, max = 64))]
    pub spot_type: String,
    /// Confirmation window in hours; the server default when absent.
    pub deadline_hours: Option<i64>,
}

impl AssignSpotBody {
    fn into_request(self, event_id: DbId) -> AssignmentRequest {
        AssignmentRequest {
            event_id,
            performer_id: self.performer_id,
            spot_type: self.spot_type,
            deadline_hours: self.deadline_hours,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkAssignBody {
    #[validate(length(min = 1, max = 100), nested)]
    pub assignments: Vec<AssignSpotBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AssignApplicationsBody {
    pub deadline_hours: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ConfirmBody {
    pub accepted: bool,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExtendDeadlineBody {
    pub new_deadline: Timestamp,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Per-item result of a batch assignment.
#[derive(Debug, Serialize)]
pub struct BulkAssignmentResult {
    pub assigned: Vec<Assignment>,
    pub failed: Vec<FailedAssignment>,
}

#[derive(Debug, Serialize)]
pub struct FailedAssignment {
    pub performer_id: DbId,
    pub spot_type: String,
    pub code: &'static str,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct DeadlineExtendedResponse {
    pub spot: SpotResponse,
    pub previous_deadline: Option<Timestamp>,
}

impl BulkAssignmentResult {
    fn from_outcomes(outcomes: Vec<AssignmentOutcome>) -> Self {
        let mut assigned = Vec::new();
        let mut failed = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(assignment) => assigned.push(assignment),
                Err(e) => {
                    let code = e
                        .as_spot_error()
                        .map(|s| s.code())
                        .unwrap_or("ASSIGNMENT_FAILED");
                    failed.push(FailedAssignment {
                        performer_id: outcome.request.performer_id,
                        spot_type: outcome.request.spot_type,
                        code,
                        error: e.to_string(),
                    });
                }
            }
        }
        Self { assigned, failed }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/events/{event_id}/spots/assign
pub async fn assign_spot(
    State(state): State<AppState>,
    actor: Actor,
    Path(event_id): Path<DbId>,
    body: Result<Json<AssignSpotBody>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(body) = body?;
    body.validate()?;

    let assignment = state
        .service
        .assign_spot(&body.into_request(event_id), actor.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse::new(assignment))))
}

/// POST /api/v1/events/{event_id}/spots/assign-bulk
///
/// Items are independent; the response lists successes and failures.
pub async fn assign_bulk(
    State(state): State<AppState>,
    actor: Actor,
    Path(event_id): Path<DbId>,
    body: Result<Json<BulkAssignBody>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(body) = body?;
    body.validate()?;

    let requests = body
        .assignments
        .into_iter()
        .map(|item| item.into_request(event_id))
        .collect();
    let outcomes = state
        .service
        .assign_multiple_spots(requests, actor.user_id)
        .await;

    Ok(Json(DataResponse::new(BulkAssignmentResult::from_outcomes(
        outcomes,
    ))))
}

/// POST /api/v1/events/{event_id}/spots/assign-applications
///
/// The body is optional; an empty one uses the default deadline.
pub async fn assign_applications(
    State(state): State<AppState>,
    actor: Actor,
    Path(event_id): Path<DbId>,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let body = if body.is_empty() {
        AssignApplicationsBody::default()
    } else {
        Json::<AssignApplicationsBody>::from_bytes(&body)?.0
    };

    let outcomes = state
        .service
        .assign_accepted_applications(event_id, body.deadline_hours, actor.user_id)
        .await?;

    Ok(Json(DataResponse::new(BulkAssignmentResult::from_outcomes(
        outcomes,
    ))))
}

/// GET /api/v1/events/{event_id}/spots
pub async fn list_event_spots(
    State(state): State<AppState>,
    _actor: Actor,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let store = state.service.store();
    if store.find_event(event_id).await?.is_none() {
        return Err(AppError::NotFound {
            entity: "Event",
            id: event_id,
        });
    }
    let spots: Vec<SpotResponse> = store
        .list_spots_for_event(event_id)
        .await?
        .into_iter()
        .map(SpotResponse::from)
        .collect();

    Ok(Json(DataResponse::new(spots)))
}

/// POST /api/v1/spots/{spot_id}/confirm
///
/// The actor is the performer responding to the offer.
pub async fn confirm_spot(
    State(state): State<AppState>,
    actor: Actor,
    Path(spot_id): Path<DbId>,
    body: Result<Json<ConfirmBody>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(body) = body?;
    body.validate()?;

    let spot = state
        .service
        .confirm(&ConfirmRequest {
            spot_id,
            performer_id: actor.user_id,
            accepted: body.accepted,
            reason: body.reason,
        })
        .await?;

    Ok(Json(DataResponse::new(SpotResponse::from(spot))))
}

/// POST /api/v1/spots/{spot_id}/extend-deadline
///
/// The actor must be the promoter of the spot's event.
pub async fn extend_deadline(
    State(state): State<AppState>,
    actor: Actor,
    Path(spot_id): Path<DbId>,
    body: Result<Json<ExtendDeadlineBody>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(body) = body?;
    body.validate()?;

    let extended = state
        .service
        .extend_deadline(&ExtendDeadlineRequest {
            spot_id,
            new_deadline: body.new_deadline,
            reason: body.reason,
            extended_by: actor.user_id,
        })
        .await?;

    Ok(Json(DataResponse::new(DeadlineExtendedResponse {
        spot: SpotResponse::from(extended.spot),
        previous_deadline: extended.previous_deadline,
    })))
}
