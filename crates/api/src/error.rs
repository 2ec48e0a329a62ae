use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lineup_core::error::{CoreError, SpotError};
use lineup_core::types::DbId;
use lineup_db::store::StoreError;
use lineup_engine::EngineError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce `{ "error", "code" }` JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// An expected spot lifecycle outcome.
    #[error(transparent)]
    Spot(#[from] SpotError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Spot(e) => AppError::Spot(e),
            EngineError::Core(e) => AppError::Core(e),
            EngineError::Store(e) => AppError::Store(e),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Spot(spot) => (spot_status(spot), spot.code(), spot.to_string()),

            AppError::Core(core) => match core {
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED", msg.clone())
                }
            },

            AppError::Store(err) if err.is_transient() => {
                tracing::warn!(error = %err, "Store unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "STORE_UNAVAILABLE",
                    "Storage is temporarily unavailable, retry shortly".to_string(),
                )
            }
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                internal()
            }

            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND", self.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

fn spot_status(err: &SpotError) -> StatusCode {
    match err {
        SpotError::AlreadyAssigned { .. }
        | SpotError::NoSpotsAvailable { .. }
        | SpotError::NotPending { .. } => StatusCode::CONFLICT,
        SpotError::SpotNotFound(_) => StatusCode::NOT_FOUND,
        SpotError::Unauthorized(_) => StatusCode::FORBIDDEN,
        SpotError::InvalidDeadline(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}
