//! Deadline extension audit model.

use lineup_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::spot::Spot;

/// A row from the `spot_deadline_extensions` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct DeadlineExtension {
    pub id: DbId,
    pub spot_id: DbId,
    pub previous_deadline: Option<Timestamp>,
    pub new_deadline: Timestamp,
    pub reason: Option<String>,
    pub extended_by: DbId,
    pub created_at: Timestamp,
}

/// Input for moving a pending spot's deadline.
#[derive(Debug, Clone)]
pub struct ExtendDeadline {
    pub spot_id: DbId,
    pub new_deadline: Timestamp,
    pub reason: Option<String>,
    pub extended_by: DbId,
}

/// Result of a deadline extension attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtendOutcome {
    Extended {
        spot: Spot,
        previous_deadline: Option<Timestamp>,
    },
    NotFound,
    /// The spot exists but is not pending; carries its current status id.
    NotPending(i16),
}
