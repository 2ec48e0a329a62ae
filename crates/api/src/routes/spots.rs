use axum::routing::{get, post};
use axum::Router;

use crate::handlers::spots;
use crate::state::AppState;

/// Event-scoped spot routes mounted at `/events`.
///
/// ```text
/// GET  /{event_id}/spots                      -> list_event_spots
/// POST /{event_id}/spots/assign               -> assign_spot
/// POST /{event_id}/spots/assign-bulk          -> assign_bulk
/// POST /{event_id}/spots/assign-applications  -> assign_applications
/// ```
pub fn event_router() -> Router<AppState> {
    Router::new()
        .route("/{event_id}/spots", get(spots::list_event_spots))
        .route("/{event_id}/spots/assign", post(spots::assign_spot))
        .route("/{event_id}/spots/assign-bulk", post(spots::assign_bulk))
        .route(
            "/{event_id}/spots/assign-applications",
            post(spots::assign_applications),
        )
}

/// Single-spot routes mounted at `/spots`.
///
/// ```text
/// POST /{spot_id}/confirm          -> confirm_spot
/// POST /{spot_id}/extend-deadline  -> extend_deadline
/// ```
pub fn spot_router() -> Router<AppState> {
    Router::new()
        .route("/{spot_id}/confirm", post(spots::confirm_spot))
        .route("/{spot_id}/extend-deadline", post(spots::extend_deadline))
}
