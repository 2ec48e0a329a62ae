//! Manual triggers for the periodic lifecycle jobs.
//!
//! Both are safe to call while the scheduler is running.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/admin/spots/sweep
pub async fn run_sweep(State(state): State<AppState>, actor: Actor) -> AppResult<impl IntoResponse> {
    tracing::info!(actor_id = actor.user_id, "Manual expiry sweep requested");
    let report = state.service.sweep_expired().await?;
    Ok(Json(DataResponse::new(report)))
}

/// POST /api/v1/admin/spots/reminders
pub async fn run_reminders(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<impl IntoResponse> {
    tracing::info!(actor_id = actor.user_id, "Manual reminder run requested");
    let report = state.service.send_due_reminders().await?;
    Ok(Json(DataResponse::new(report)))
}
