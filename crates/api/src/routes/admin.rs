use axum::routing::post;
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Job trigger routes mounted at `/admin/spots`.
///
/// ```text
/// POST /sweep      -> run_sweep
/// POST /reminders  -> run_reminders
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sweep", post(admin::run_sweep))
        .route("/reminders", post(admin::run_reminders))
}
