//! Spot confirmation constants, validation, and state machine.
//!
//! This module lives in `core` (zero internal deps) so the repository layer,
//! the lifecycle engine, and the API handlers all agree on the same
//! confirmation windows and legal transitions.

use chrono::Duration;

use crate::error::SpotError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Confirmation window constants
// ---------------------------------------------------------------------------

/// Default confirmation window offered to a performer (48 hours).
pub const DEFAULT_DEADLINE_HOURS: i64 = 48;

/// Shortest confirmation window a promoter may set.
pub const MIN_DEADLINE_HOURS: i64 = 1;

/// Longest confirmation window a promoter may set (30 days).
pub const MAX_DEADLINE_HOURS: i64 = 720;

/// How often the expiry sweep runs by default (in seconds).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Maximum number of due spots fetched per sweep batch.
pub const DEFAULT_SWEEP_BATCH_SIZE: i64 = 500;

/// Longest accepted spot type label.
pub const MAX_SPOT_TYPE_LEN: usize = 64;

// ---------------------------------------------------------------------------
// Spot types
// ---------------------------------------------------------------------------

/// Spot type labels used by the lineup builder. Spot types are free-form
/// categorical tags; these are the common ones.
pub mod spot_types {
    pub const HEADLINER: &str = "Headliner";
    pub const FEATURE: &str = "Feature";
    pub const MC: &str = "MC";
    pub const OPEN: &str = "Open";
}

/// Application statuses written by the application flow.
pub mod application_statuses {
    pub const PENDING: &str = "pending";
    pub const ACCEPTED: &str = "accepted";
    pub const REJECTED: &str = "rejected";
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Confirmation status IDs matching `spot_confirmation_statuses` seed data
/// (1-based SMALLSERIAL).
///
/// Duplicated from the `db` crate's `ConfirmationStatus` enum because `core`
/// must have zero internal deps.
pub mod state_machine {
    pub const UNASSIGNED: i16 = 1;
    pub const PENDING: i16 = 2;
    pub const CONFIRMED: i16 = 3;
    pub const DECLINED: i16 = 4;
    pub const EXPIRED: i16 = 5;

    /// Returns the set of valid target status IDs reachable from `from_status`.
    ///
    /// Confirmed is terminal: a confirmed spot stays held permanently.
    pub fn valid_transitions(from_status: i16) -> &'static [i16] {
        match from_status {
            // Unassigned -> Pending
            UNASSIGNED => &[PENDING],
            // Pending -> Confirmed, Declined, Expired
            PENDING => &[CONFIRMED, DECLINED, EXPIRED],
            // Declined / Expired spots return to the open pool.
            DECLINED | EXPIRED => &[PENDING],
            CONFIRMED => &[],
            _ => &[],
        }
    }

    /// Check whether a transition from `from` to `to` is valid.
    pub fn can_transition(from: i16, to: i16) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Whether a spot in this status is open for assignment.
    pub fn is_open(status: i16) -> bool {
        matches!(status, UNASSIGNED | DECLINED | EXPIRED)
    }

    /// Whether a spot in this status counts as a live hold for its performer.
    pub fn is_live_hold(status: i16) -> bool {
        matches!(status, PENDING | CONFIRMED)
    }

    /// Lowercase status name as exposed over the API.
    pub fn status_name(status: i16) -> &'static str {
        match status {
            UNASSIGNED => "unassigned",
            PENDING => "pending",
            CONFIRMED => "confirmed",
            DECLINED => "declined",
            EXPIRED => "expired",
            _ => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Validate the confirmation window requested for a new assignment.
pub fn validate_deadline_hours(hours: i64) -> Result<(), SpotError> {
    if hours < MIN_DEADLINE_HOURS {
        return Err(SpotError::InvalidDeadline(format!(
            "Confirmation window must be at least {MIN_DEADLINE_HOURS} hour(s), got {hours}"
        )));
    }
    if hours > MAX_DEADLINE_HOURS {
        return Err(SpotError::InvalidDeadline(format!(
            "Confirmation window must be at most {MAX_DEADLINE_HOURS} hours, got {hours}"
        )));
    }
    Ok(())
}

/// Compute the confirmation deadline for an offer made at `now`.
pub fn deadline_from(now: Timestamp, hours: i64) -> Result<Timestamp, SpotError> {
    validate_deadline_hours(hours)?;
    Ok(now + Duration::hours(hours))
}

/// Validate an administrative deadline extension.
pub fn validate_extension(now: Timestamp, new_deadline: Timestamp) -> Result<(), SpotError> {
    if new_deadline <= now {
        return Err(SpotError::InvalidDeadline(format!(
            "New deadline {new_deadline} must be in the future"
        )));
    }
    if new_deadline > now + Duration::hours(MAX_DEADLINE_HOURS) {
        return Err(SpotError::InvalidDeadline(format!(
            "New deadline {new_deadline} is more than {MAX_DEADLINE_HOURS} hours away"
        )));
    }
    Ok(())
}

/// Validate a spot type label. Returns `Ok(())` or an error message.
pub fn validate_spot_type(spot_type: &str) -> Result<(), String> {
    let trimmed = spot_type.trim();
    if trimmed.is_empty() {
        return Err("Spot type must not be empty".to_string());
    }
    if trimmed.len() > MAX_SPOT_TYPE_LEN {
        return Err(format!(
            "Spot type must be at most {MAX_SPOT_TYPE_LEN} characters"
        ));
    }
    Ok(())
}
