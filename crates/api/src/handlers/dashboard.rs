use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard/deadlines
///
/// Deadline urgency for the calling promoter's upcoming events. Clients poll
/// this; every call recomputes from current spot state.
pub async fn deadlines(
    State(state): State<AppState>,
    actor: Actor,
) -> AppResult<impl IntoResponse> {
    let dashboard = state.service.get_dashboard(actor.user_id).await?;
    Ok(Json(DataResponse::new(dashboard)))
}
