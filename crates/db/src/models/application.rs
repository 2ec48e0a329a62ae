//! Performer application model.

use lineup_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `applications` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Application {
    pub id: DbId,
    pub event_id: DbId,
    pub performer_id: DbId,
    pub spot_type: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for recording an application.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateApplication {
    pub event_id: DbId,
    pub performer_id: DbId,
    pub spot_type: String,
    pub status: String,
}
