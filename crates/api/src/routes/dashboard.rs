use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`.
///
/// ```text
/// GET  /deadlines  -> deadlines
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/deadlines", get(dashboard::deadlines))
}
