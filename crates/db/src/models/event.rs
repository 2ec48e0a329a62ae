//! Event entity model.

use lineup_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub promoter_id: DbId,
    pub title: String,
    pub event_date: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an event.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub promoter_id: DbId,
    pub title: String,
    pub event_date: Timestamp,
}
