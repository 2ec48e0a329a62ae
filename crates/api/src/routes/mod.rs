pub mod admin;
pub mod dashboard;
pub mod health;
pub mod spots;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /events/{event_id}/spots                      list spots (GET)
/// /events/{event_id}/spots/assign               assign one performer (POST)
/// /events/{event_id}/spots/assign-bulk          assign a batch (POST)
/// /events/{event_id}/spots/assign-applications  assign accepted applicants (POST)
///
/// /spots/{spot_id}/confirm                      accept or decline (POST, performer)
/// /spots/{spot_id}/extend-deadline              move the deadline (POST, promoter)
///
/// /dashboard/deadlines                          promoter deadline view (GET)
///
/// /admin/spots/sweep                            run the expiry sweep (POST)
/// /admin/spots/reminders                        send due reminders (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/events", spots::event_router())
        .nest("/spots", spots::spot_router())
        .nest("/dashboard", dashboard::router())
        .nest("/admin/spots", admin::router())
}
