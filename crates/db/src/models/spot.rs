//! Spot entity model and DTOs.

use lineup_core::spot_lifecycle::state_machine;
use lineup_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `spots` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct Spot {
    pub id: DbId,
    pub event_id: DbId,
    pub spot_type: String,
    pub spot_order: i32,
    pub is_filled: bool,
    pub performer_id: Option<DbId>,
    pub confirmation_status_id: i16,
    pub confirmation_deadline: Option<Timestamp>,
    pub confirmed_at: Option<Timestamp>,
    pub declined_at: Option<Timestamp>,
    pub expired_at: Option<Timestamp>,
    pub last_reminder_hours: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Spot {
    /// Lookup-table name of the current confirmation status.
    pub fn status_name(&self) -> &'static str {
        state_machine::status_name(self.confirmation_status_id)
    }

    pub fn is_pending(&self) -> bool {
        self.confirmation_status_id == state_machine::PENDING
    }

    /// Pending or confirmed: the performer holds this spot.
    pub fn is_live_hold(&self) -> bool {
        state_machine::is_live_hold(self.confirmation_status_id)
    }
}

/// DTO for seeding an unassigned spot into an event's lineup.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSpot {
    pub event_id: DbId,
    pub spot_type: String,
    pub spot_order: i32,
}

/// Keyset position in a deadline-ordered scan.
///
/// Rows sort by `(confirmation_deadline, id)`; a page continues strictly
/// after the cursor, so rows sharing a deadline are never skipped and rows
/// left in place by a failed write are not fetched again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeadlineCursor {
    pub deadline: Timestamp,
    pub id: DbId,
}

impl DeadlineCursor {
    /// Position past every row whose deadline is at or before `at`.
    pub fn past(at: Timestamp) -> Self {
        Self {
            deadline: at,
            id: DbId::MAX,
        }
    }

    /// Position of a fetched row; `None` for rows without a deadline.
    pub fn of(spot: &Spot) -> Option<Self> {
        spot.confirmation_deadline.map(|deadline| Self {
            deadline,
            id: spot.id,
        })
    }

    /// Whether a row at `(deadline, id)` sorts after this cursor.
    pub fn precedes(&self, deadline: Timestamp, id: DbId) -> bool {
        (deadline, id) > (self.deadline, self.id)
    }
}

/// Input for binding a performer to the first open spot of a type.
#[derive(Debug, Clone)]
pub struct SpotClaim {
    pub event_id: DbId,
    pub performer_id: DbId,
    pub spot_type: String,
    pub deadline: Timestamp,
    pub assigned_at: Timestamp,
}

/// Result of an atomic claim attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The performer now holds the returned pending spot.
    Claimed(Spot),
    /// The performer already holds a pending or confirmed spot on the event.
    AlreadyAssigned,
    /// No unfilled spot of the requested type remains.
    NoSpotsAvailable,
}

/// Outcome of a pending-spot resolution by the bound performer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Confirm,
    Decline,
}

/// API-facing view of a spot with the status rendered by name.
#[derive(Debug, Clone, Serialize)]
pub struct SpotResponse {
    pub id: DbId,
    pub event_id: DbId,
    pub spot_type: String,
    pub spot_order: i32,
    pub is_filled: bool,
    pub performer_id: Option<DbId>,
    pub confirmation_status: &'static str,
    pub confirmation_deadline: Option<Timestamp>,
    pub confirmed_at: Option<Timestamp>,
    pub declined_at: Option<Timestamp>,
    pub expired_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl From<Spot> for SpotResponse {
    fn from(spot: Spot) -> Self {
        Self {
            confirmation_status: spot.status_name(),
            id: spot.id,
            event_id: spot.event_id,
            spot_type: spot.spot_type,
            spot_order: spot.spot_order,
            is_filled: spot.is_filled,
            performer_id: spot.performer_id,
            confirmation_deadline: spot.confirmation_deadline,
            confirmed_at: spot.confirmed_at,
            declined_at: spot.declined_at,
            expired_at: spot.expired_at,
            updated_at: spot.updated_at,
        }
    }
}
