//! Caller identity extractor.
//!
//! Authentication happens upstream; the gateway forwards the verified user
//! id in [`ACTOR_HEADER`]. Handlers decide what that user may do.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use lineup_core::error::CoreError;
use lineup_core::types::DbId;

use crate::error::AppError;

pub const ACTOR_HEADER: &str = "x-actor-id";

/// The user on whose behalf the request is made.
///
/// ```ignore
/// async fn my_handler(actor: Actor) -> AppResult<Json<()>> {
///     tracing::info!(user_id = actor.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: DbId,
}

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Missing {ACTOR_HEADER} header"
                )))
            })?;

        let user_id = raw
            .trim()
            .parse::<DbId>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(format!(
                    "Invalid {ACTOR_HEADER} header"
                )))
            })?;

        Ok(Actor { user_id })
    }
}
