use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Expected, recoverable outcomes of the spot lifecycle operations.
///
/// Every variant is surfaced to the caller as its own kind so consumers can
/// tell "already assigned" apart from "no spots left".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpotError {
    #[error("Performer {performer_id} already holds a live spot on event {event_id}")]
    AlreadyAssigned { event_id: DbId, performer_id: DbId },

    #[error("No open '{spot_type}' spot available on event {event_id}")]
    NoSpotsAvailable { event_id: DbId, spot_type: String },

    #[error("Spot {0} not found")]
    SpotNotFound(DbId),

    #[error("Spot {spot_id} is not pending confirmation (status: {status})")]
    NotPending { spot_id: DbId, status: &'static str },

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    InvalidDeadline(String),
}

impl SpotError {
    /// Stable machine-readable code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            SpotError::AlreadyAssigned { .. } => "ALREADY_ASSIGNED",
            SpotError::NoSpotsAvailable { .. } => "NO_SPOTS_AVAILABLE",
            SpotError::SpotNotFound(_) => "SPOT_NOT_FOUND",
            SpotError::NotPending { .. } => "NOT_PENDING",
            SpotError::Unauthorized(_) => "UNAUTHORIZED",
            SpotError::InvalidDeadline(_) => "INVALID_DEADLINE",
        }
    }
}
